//! High-level façade: one method per Apptainer subcommand.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};

use crate::exec::{Arg, CommandOutput, CommandRequest};
use crate::options::{BuildOptions, ExecOptions, InspectOptions, PullOptions, RunOptions};
use crate::runtime::runtime_binary_path;

/// Handle on one container image, dispatching to the external runtime binary.
///
/// Carries an optional default image path (used by `exec`, `run`, `inspect`,
/// and as the `pull` fallback target), an optional binary override, and an
/// optional per-invocation timeout. Every call materializes a fresh empty
/// option set when the caller passes `None`; no default instance is shared
/// across invocations.
#[derive(Debug, Clone, Default)]
pub struct Apptainer {
    image_path: Option<PathBuf>,
    binary: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl Apptainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: Some(image_path.into()),
            ..Self::default()
        }
    }

    /// Override the runtime binary instead of discovering it on PATH.
    pub fn binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = Some(binary.into());
        self
    }

    /// Bound every invocation; an expired child is killed and reported as a
    /// timeout error.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn image_path(&self) -> Option<&Path> {
        self.image_path.as_deref()
    }

    /// `apptainer exec [opts] <image> <command...>`
    pub fn exec<I, S>(&self, command: I, options: Option<&ExecOptions>) -> Result<CommandOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(self.exec_request(command, options)?.run()?)
    }

    /// Render the `exec` command line without executing it.
    pub fn preview_exec<I, S>(&self, command: I, options: Option<&ExecOptions>) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(self.exec_request(command, options)?.preview())
    }

    /// `apptainer run [opts] <image> <command...>`
    pub fn run<I, S>(&self, command: I, options: Option<&RunOptions>) -> Result<CommandOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(self.run_request(command, options)?.run()?)
    }

    pub fn preview_run<I, S>(&self, command: I, options: Option<&RunOptions>) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(self.run_request(command, options)?.preview())
    }

    /// `apptainer pull [opts] <save_path> <image_uri>`
    ///
    /// `save_path` falls back to the instance image path.
    pub fn pull(
        &self,
        image_uri: &str,
        save_path: Option<&Path>,
        options: Option<&PullOptions>,
    ) -> Result<CommandOutput> {
        Ok(self.pull_request(image_uri, save_path, options)?.run()?)
    }

    pub fn preview_pull(
        &self,
        image_uri: &str,
        save_path: Option<&Path>,
        options: Option<&PullOptions>,
    ) -> Result<String> {
        Ok(self.pull_request(image_uri, save_path, options)?.preview())
    }

    /// `apptainer build [opts] <image_path> <definition_file>`
    pub fn build(
        &self,
        definition_file: &Path,
        image_path: &Path,
        options: Option<&BuildOptions>,
    ) -> Result<CommandOutput> {
        Ok(self
            .build_request(definition_file, image_path, options)?
            .run()?)
    }

    pub fn preview_build(
        &self,
        definition_file: &Path,
        image_path: &Path,
        options: Option<&BuildOptions>,
    ) -> Result<String> {
        Ok(self
            .build_request(definition_file, image_path, options)?
            .preview())
    }

    /// `apptainer inspect [opts] <image>`
    pub fn inspect(&self, options: Option<&InspectOptions>) -> Result<CommandOutput> {
        Ok(self.inspect_request(options)?.run()?)
    }

    pub fn preview_inspect(&self, options: Option<&InspectOptions>) -> Result<String> {
        Ok(self.inspect_request(options)?.preview())
    }

    fn exec_request<I, S>(
        &self,
        command: I,
        options: Option<&ExecOptions>,
    ) -> Result<CommandRequest>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fresh = ExecOptions::new();
        let opts = options.unwrap_or(&fresh);
        let image = self.required_image("exec")?;
        Ok(self
            .request()?
            .arg("exec")
            .arg(Arg::from(opts.tokens()))
            .arg(image)
            .args(command.into_iter().map(|c| Arg::Token(c.into()))))
    }

    fn run_request<I, S>(&self, command: I, options: Option<&RunOptions>) -> Result<CommandRequest>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fresh = RunOptions::new();
        let opts = options.unwrap_or(&fresh);
        let image = self.required_image("run")?;
        Ok(self
            .request()?
            .arg("run")
            .arg(Arg::from(opts.tokens()))
            .arg(image)
            .args(command.into_iter().map(|c| Arg::Token(c.into()))))
    }

    fn pull_request(
        &self,
        image_uri: &str,
        save_path: Option<&Path>,
        options: Option<&PullOptions>,
    ) -> Result<CommandRequest> {
        let fresh = PullOptions::new();
        let opts = options.unwrap_or(&fresh);
        let save_path = match save_path {
            Some(p) => path_token(p),
            None => self.required_image("pull")?,
        };
        Ok(self
            .request()?
            .arg("pull")
            .arg(Arg::from(opts.tokens()))
            .arg(save_path)
            .arg(image_uri))
    }

    fn build_request(
        &self,
        definition_file: &Path,
        image_path: &Path,
        options: Option<&BuildOptions>,
    ) -> Result<CommandRequest> {
        let fresh = BuildOptions::new();
        let opts = options.unwrap_or(&fresh);
        Ok(self
            .request()?
            .arg("build")
            .arg(Arg::from(opts.tokens()))
            .arg(path_token(image_path))
            .arg(path_token(definition_file)))
    }

    fn inspect_request(&self, options: Option<&InspectOptions>) -> Result<CommandRequest> {
        let fresh = InspectOptions::new();
        let opts = options.unwrap_or(&fresh);
        let image = self.required_image("inspect")?;
        Ok(self
            .request()?
            .arg("inspect")
            .arg(Arg::from(opts.tokens()))
            .arg(image))
    }

    fn request(&self) -> Result<CommandRequest> {
        let program = match &self.binary {
            Some(p) => p.clone(),
            None => runtime_binary_path()?,
        };
        let mut req = CommandRequest::new(path_token(&program));
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        Ok(req)
    }

    fn required_image(&self, subcommand: &str) -> Result<String> {
        match &self.image_path {
            Some(p) => Ok(path_token(p)),
            None => bail!("{subcommand} requires an image path, but none was configured"),
        }
    }
}

fn path_token(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> Apptainer {
        Apptainer::with_image("/tmp/alpine.sif").binary("/usr/bin/apptainer")
    }

    #[test]
    fn test_exec_argv_shape() {
        let mut opts = ExecOptions::new();
        opts.pwd("/work").env("A", "1");
        let req = handle().exec_request(["ls", "/"], Some(&opts)).unwrap();
        assert_eq!(
            req.argv(),
            [
                "/usr/bin/apptainer",
                "exec",
                "--pwd",
                "/work",
                "--env",
                "A=1",
                "/tmp/alpine.sif",
                "ls",
                "/"
            ]
        );
    }

    #[test]
    fn test_none_options_materialize_empty_set() {
        let req = handle().exec_request(["true"], None).unwrap();
        assert_eq!(
            req.argv(),
            ["/usr/bin/apptainer", "exec", "/tmp/alpine.sif", "true"]
        );
    }

    #[test]
    fn test_pull_save_path_fallback() {
        let req = handle()
            .pull_request("docker://alpine:latest", None, None)
            .unwrap();
        assert_eq!(
            req.argv(),
            [
                "/usr/bin/apptainer",
                "pull",
                "/tmp/alpine.sif",
                "docker://alpine:latest"
            ]
        );
    }

    #[test]
    fn test_build_positional_order() {
        let req = handle()
            .build_request(Path::new("alpine.def"), Path::new("alpine.sif"), None)
            .unwrap();
        assert_eq!(
            req.argv(),
            ["/usr/bin/apptainer", "build", "alpine.sif", "alpine.def"]
        );
    }

    #[test]
    fn test_missing_image_fails_fast() {
        let bare = Apptainer::new().binary("/usr/bin/apptainer");
        let err = bare.inspect_request(None).unwrap_err();
        assert!(err.to_string().contains("requires an image path"));
    }
}
