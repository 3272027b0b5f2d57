use std::io::Write;
use std::process::ExitCode;

use clap::Parser;

use rustainer::cli::{dispatch, Cli, Dispatched};
use rustainer::{exit_code_for_exec_error, exit_code_for_io_error, ExecError};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match dispatch(&cli) {
        Ok(Dispatched::Preview(line)) => {
            println!("{line}");
            ExitCode::SUCCESS
        }
        Ok(Dispatched::Finished(out)) => {
            // Forward the child's streams untouched and mirror its exit code.
            let mut stdout = std::io::stdout();
            let _ = stdout.write_all(out.stdout().as_bytes());
            let _ = stdout.flush();
            let mut stderr = std::io::stderr();
            let _ = stderr.write_all(out.stderr().as_bytes());
            let _ = stderr.flush();
            ExitCode::from(u8::try_from(out.code().rem_euclid(256)).unwrap_or(1))
        }
        Err(err) => {
            eprintln!("rustainer: {err:#}");
            let code = if let Some(exec_err) = err.downcast_ref::<ExecError>() {
                exit_code_for_exec_error(exec_err)
            } else if let Some(io_err) = err.downcast_ref::<std::io::Error>() {
                exit_code_for_io_error(io_err)
            } else {
                1
            };
            ExitCode::from(code)
        }
    }
}
