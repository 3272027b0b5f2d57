//! Flag builder for `apptainer exec`.

use std::fmt;

use crate::errors::OptionError;

use super::{checked_blkio_weight, OptionSet, CPU_SHARES_DEFAULT};

/// Typed flag surface for the `exec` subcommand.
///
/// Methods append tokens in call order; nothing is deduplicated or validated
/// beyond the documented range checks. Flags without a named method can be
/// injected through [`ExecOptions::add`].
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    set: OptionSet,
}

impl ExecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind-mount a host path, `src[:dest[:opts]]`.
    pub fn bind(&mut self, spec: &str) -> &mut Self {
        self.set.push_flag_value("--bind", spec);
        self
    }

    /// Set an environment variable inside the container.
    ///
    /// The value travels verbatim in its own argv token, so spaces and shell
    /// metacharacters are safe without quoting. The dry-run preview quotes at
    /// render time.
    pub fn env(&mut self, key: &str, value: &str) -> &mut Self {
        self.set.push_flag_value("--env", format!("{key}={value}"));
        self
    }

    /// Set an environment variable from a caller-formatted `KEY=VALUE` token,
    /// inserted with no treatment at all.
    pub fn env_raw(&mut self, assignment: &str) -> &mut Self {
        self.set.push_flag_value("--env", assignment);
        self
    }

    /// Override the in-container home directory.
    pub fn home(&mut self, spec: &str) -> &mut Self {
        self.set.push_flag_value("--home", spec);
        self
    }

    /// Initial working directory inside the container.
    pub fn pwd(&mut self, dir: &str) -> &mut Self {
        self.set.push_flag_value("--pwd", dir);
        self
    }

    /// Use minimal /dev and empty other directories instead of sharing host
    /// filesystems.
    pub fn contain(&mut self) -> &mut Self {
        self.set.push_flag("--contain");
        self
    }

    /// Clean the environment before running the container.
    pub fn cleanenv(&mut self) -> &mut Self {
        self.set.push_flag("--cleanenv");
        self
    }

    pub fn no_home(&mut self) -> &mut Self {
        self.set.push_flag("--no-home");
        self
    }

    /// Enable NVIDIA GPU support.
    pub fn nv(&mut self) -> &mut Self {
        self.set.push_flag("--nv");
        self
    }

    /// Enable AMD ROCm GPU support.
    pub fn rocm(&mut self) -> &mut Self {
        self.set.push_flag("--rocm");
        self
    }

    pub fn fakeroot(&mut self) -> &mut Self {
        self.set.push_flag("--fakeroot");
        self
    }

    /// Mount the image writable (sandbox or writable SIF).
    pub fn writable(&mut self) -> &mut Self {
        self.set.push_flag("--writable");
        self
    }

    /// Relative CPU share weight; `None` passes the runtime's default marker
    /// (-1).
    pub fn cpu_shares(&mut self, shares: Option<i64>) -> &mut Self {
        let value = shares.unwrap_or(CPU_SHARES_DEFAULT);
        self.set.push_flag_value("--cpu-shares", value);
        self
    }

    /// Number of CPUs available to the container, e.g. `"1.5"`.
    pub fn cpus(&mut self, cpus: &str) -> &mut Self {
        self.set.push_flag_value("--cpus", cpus);
        self
    }

    /// Memory limit, e.g. `"512m"`.
    pub fn memory(&mut self, limit: &str) -> &mut Self {
        self.set.push_flag_value("--memory", limit);
        self
    }

    /// Block IO relative weight: 0 (disable) or 10-1000. Rejected values fail
    /// fast before any process is spawned.
    pub fn blkio_weight(&mut self, weight: u32) -> Result<&mut Self, OptionError> {
        let weight = checked_blkio_weight(weight)?;
        self.set.push_flag_value("--blkio-weight", weight);
        Ok(self)
    }

    /// Escape hatch for flags without a named method.
    pub fn add(&mut self, token: impl Into<String>) -> &mut Self {
        self.set.add(token);
        self
    }

    pub fn add_all<I, S>(&mut self, tokens: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set.add_all(tokens);
        self
    }

    pub fn remove(&mut self, token: &str) -> Result<(), OptionError> {
        self.set.remove(token)
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        self.set.tokens()
    }

    pub fn as_set(&self) -> &OptionSet {
        &self.set
    }
}

impl fmt::Display for ExecOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.set.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_flags_render_in_call_order() {
        let mut opts = ExecOptions::new();
        opts.pwd("/home").env("A", "1").env("A", "2");
        assert_eq!(opts.to_string(), "--pwd /home --env A=1 --env A=2");
    }

    #[test]
    fn test_blkio_weight_range() {
        let mut opts = ExecOptions::new();
        assert!(opts.blkio_weight(9).is_err());
        assert!(opts.blkio_weight(1001).is_err());
        assert!(opts.is_empty());
        opts.blkio_weight(10).unwrap();
        assert_eq!(opts.to_string(), "--blkio-weight 10");
    }

    #[test]
    fn test_cpu_shares_default_marker() {
        let mut opts = ExecOptions::new();
        opts.cpu_shares(None);
        assert_eq!(opts.to_string(), "--cpu-shares -1");
        let mut explicit = ExecOptions::new();
        explicit.cpu_shares(Some(512));
        assert_eq!(explicit.to_string(), "--cpu-shares 512");
    }

    #[test]
    fn test_env_value_kept_verbatim_in_token() {
        let mut opts = ExecOptions::new();
        opts.env("MSG", "hello world");
        assert_eq!(opts.tokens(), ["--env", "MSG=hello world"]);
        // Preview quotes the token that needs it.
        assert_eq!(opts.as_set().preview(), "--env 'MSG=hello world'");
    }
}
