//! Blocking command execution with captured output and optional timeouts.
//!
//! Arguments are handed to the OS as a discrete argv, never concatenated into
//! a shell-interpreted string; `preview()` renders the equivalent shell line
//! for dry-run display. Spawn failures and timeouts surface as [`ExecError`];
//! a child that ran and exited non-zero comes back as a normal
//! [`CommandOutput`] for the caller to inspect.

use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::errors::ExecError;
use crate::options::OptionSet;
use crate::util::shell_join;

/// One fragment of a command line: a single token or a nested list.
///
/// Callers assemble invocations incrementally from literals, vectors, and
/// builder output; [`flatten_args`] collapses arbitrary nesting depth into the
/// flat ordered argv.
#[derive(Debug, Clone)]
pub enum Arg {
    Token(String),
    List(Vec<Arg>),
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Token(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Token(s)
    }
}

impl From<Vec<Arg>> for Arg {
    fn from(list: Vec<Arg>) -> Self {
        Arg::List(list)
    }
}

impl From<Vec<String>> for Arg {
    fn from(list: Vec<String>) -> Self {
        Arg::List(list.into_iter().map(Arg::Token).collect())
    }
}

impl From<&[String]> for Arg {
    fn from(list: &[String]) -> Self {
        Arg::List(list.iter().cloned().map(Arg::Token).collect())
    }
}

impl From<&OptionSet> for Arg {
    fn from(set: &OptionSet) -> Self {
        Arg::from(set.tokens())
    }
}

/// Recursively flatten nested fragments into a flat ordered token list.
pub fn flatten_args(args: &[Arg]) -> Vec<String> {
    let mut out = Vec::new();
    flatten_into(args, &mut out);
    out
}

fn flatten_into(args: &[Arg], out: &mut Vec<String>) {
    for arg in args {
        match arg {
            Arg::Token(t) => out.push(t.clone()),
            Arg::List(list) => flatten_into(list, out),
        }
    }
}

/// A single blocking invocation of an external program.
#[derive(Debug, Default)]
pub struct CommandRequest {
    program: String,
    args: Vec<Arg>,
    timeout: Option<Duration>,
}

impl CommandRequest {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Bound the wait; on expiry the child is killed and
    /// [`ExecError::Timeout`] returned. No timeout waits forever.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The flat argv this request would execute, program first.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = vec![self.program.clone()];
        flatten_into(&self.args, &mut argv);
        argv
    }

    /// Shell-safe one-line rendering for dry-run display.
    pub fn preview(&self) -> String {
        shell_join(&self.argv())
    }

    /// Spawn the program, block until exit, and capture both streams.
    ///
    /// Non-zero exits are ordinary outputs; only spawn failures, wait/read
    /// failures, and timeouts are errors.
    pub fn run(self) -> Result<CommandOutput, ExecError> {
        let argv = self.argv();

        let mut cmd = Command::new(&self.program);
        cmd.args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        match self.timeout {
            None => {
                let child = cmd.spawn().map_err(|e| ExecError::Spawn {
                    program: self.program.clone(),
                    source: e,
                })?;
                let out = child.wait_with_output().map_err(ExecError::Wait)?;
                Ok(CommandOutput::new(
                    argv,
                    String::from_utf8_lossy(&out.stdout).into_owned(),
                    String::from_utf8_lossy(&out.stderr).into_owned(),
                    exit_code(&out.status),
                ))
            }
            Some(timeout) => {
                let mut child = cmd.spawn().map_err(|e| ExecError::Spawn {
                    program: self.program.clone(),
                    source: e,
                })?;
                // Drain both pipes while waiting: a child writing more than
                // the OS pipe buffer would otherwise block forever and turn a
                // slow-but-successful run into a spurious timeout.
                let stdout_reader = spawn_reader(child.stdout.take());
                let stderr_reader = spawn_reader(child.stderr.take());

                let status = match child.wait_timeout(timeout).map_err(ExecError::Wait)? {
                    Some(status) => status,
                    None => {
                        let _ = child.kill();
                        let _ = child.wait();
                        // Killing the child closes the pipes; reap the readers.
                        let _ = stdout_reader.join();
                        let _ = stderr_reader.join();
                        return Err(ExecError::Timeout {
                            program: self.program,
                            timeout,
                        });
                    }
                };

                let stdout = join_reader(stdout_reader)?;
                let stderr = join_reader(stderr_reader)?;
                Ok(CommandOutput::new(argv, stdout, stderr, exit_code(&status)))
            }
        }
    }
}

fn spawn_reader<R>(stream: Option<R>) -> thread::JoinHandle<io::Result<String>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut reader) = stream {
            reader.read_to_string(&mut buf)?;
        }
        Ok(buf)
    })
}

fn join_reader(handle: thread::JoinHandle<io::Result<String>>) -> Result<String, ExecError> {
    match handle.join() {
        Ok(result) => result.map_err(ExecError::Wait),
        Err(_) => Err(ExecError::Wait(io::Error::new(
            io::ErrorKind::Other,
            "output reader thread panicked",
        ))),
    }
}

// Signal termination has no exit code; report -1 so failed() still holds.
fn exit_code(status: &std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

/// Captured outcome of one invocation: original argv, both streams, and the
/// exit code. Immutable after construction.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    argv: Vec<String>,
    stdout: String,
    stderr: String,
    code: i32,
}

impl CommandOutput {
    fn new(argv: Vec<String>, stdout: String, stderr: String, code: i32) -> Self {
        Self {
            argv,
            stdout,
            stderr,
            code,
        }
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn succeeded(&self) -> bool {
        self.code == 0
    }

    pub fn failed(&self) -> bool {
        self.code != 0
    }

    /// The executed command line, shell-quoted for display.
    pub fn preview(&self) -> String {
        shell_join(&self.argv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_three_level_nesting() {
        let args = vec![
            Arg::from("a"),
            Arg::List(vec![
                Arg::from("b"),
                Arg::List(vec![Arg::from("c"), Arg::from("d")]),
            ]),
            Arg::from("e"),
        ];
        assert_eq!(flatten_args(&args), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_flatten_empty_lists_vanish() {
        let args = vec![Arg::List(vec![]), Arg::from("x"), Arg::List(vec![])];
        assert_eq!(flatten_args(&args), ["x"]);
    }

    #[test]
    fn test_argv_starts_with_program() {
        let req = CommandRequest::new("echo").arg("hello").arg("world");
        assert_eq!(req.argv(), ["echo", "hello", "world"]);
    }

    #[test]
    fn test_preview_quotes_tokens() {
        let req = CommandRequest::new("echo").arg("a b");
        assert_eq!(req.preview(), "echo 'a b'");
    }
}
