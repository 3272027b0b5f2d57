//! rustainer: a thin host-side wrapper around the Apptainer CLI.
//!
//! The crate does not reimplement any container semantics. It builds argument
//! vectors with typed per-subcommand option builders, spawns the external
//! runtime binary as a blocking child process, and hands back the captured
//! exit code and output streams. Runtime-reported failures are data, not
//! errors: callers branch on [`CommandOutput::failed`], and only spawn
//! failures and timeouts surface as [`ExecError`].
//!
//! ```no_run
//! use rustainer::{Apptainer, ExecOptions};
//!
//! # fn main() -> anyhow::Result<()> {
//! let runner = Apptainer::with_image("alpine.sif");
//! let mut opts = ExecOptions::new();
//! opts.cleanenv().env("GREETING", "hello");
//! let out = runner.exec(["sh", "-c", "echo $GREETING"], Some(&opts))?;
//! if out.failed() {
//!     eprintln!("runtime reported: {}", out.stderr());
//! }
//! # Ok(())
//! # }
//! ```

pub mod apptainer;
pub mod cli;
pub mod errors;
pub mod exec;
pub mod options;
pub mod runtime;
pub mod util;

pub use apptainer::Apptainer;
pub use errors::{exit_code_for_exec_error, exit_code_for_io_error, ExecError, OptionError};
pub use exec::{flatten_args, Arg, CommandOutput, CommandRequest};
pub use options::{
    BuildOptions, ExecOptions, InspectOptions, OptionSet, PullOptions, RunOptions,
};
pub use runtime::runtime_binary_path;
pub use util::{shell_escape, shell_join};
