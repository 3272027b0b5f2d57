//! Flag builder for `apptainer run`.
//!
//! `run` takes the same action flags as `exec`; the builder is kept as its own
//! type so each subcommand exposes exactly its own grammar.

use std::fmt;

use crate::errors::OptionError;

use super::{checked_blkio_weight, OptionSet, CPU_SHARES_DEFAULT};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    set: OptionSet,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, spec: &str) -> &mut Self {
        self.set.push_flag_value("--bind", spec);
        self
    }

    /// Set an environment variable; the value rides verbatim in its own argv
    /// token.
    pub fn env(&mut self, key: &str, value: &str) -> &mut Self {
        self.set.push_flag_value("--env", format!("{key}={value}"));
        self
    }

    /// Caller-formatted `KEY=VALUE` assignment, inserted untouched.
    pub fn env_raw(&mut self, assignment: &str) -> &mut Self {
        self.set.push_flag_value("--env", assignment);
        self
    }

    pub fn home(&mut self, spec: &str) -> &mut Self {
        self.set.push_flag_value("--home", spec);
        self
    }

    pub fn pwd(&mut self, dir: &str) -> &mut Self {
        self.set.push_flag_value("--pwd", dir);
        self
    }

    pub fn contain(&mut self) -> &mut Self {
        self.set.push_flag("--contain");
        self
    }

    pub fn cleanenv(&mut self) -> &mut Self {
        self.set.push_flag("--cleanenv");
        self
    }

    pub fn no_home(&mut self) -> &mut Self {
        self.set.push_flag("--no-home");
        self
    }

    pub fn nv(&mut self) -> &mut Self {
        self.set.push_flag("--nv");
        self
    }

    pub fn rocm(&mut self) -> &mut Self {
        self.set.push_flag("--rocm");
        self
    }

    pub fn fakeroot(&mut self) -> &mut Self {
        self.set.push_flag("--fakeroot");
        self
    }

    pub fn writable(&mut self) -> &mut Self {
        self.set.push_flag("--writable");
        self
    }

    pub fn cpu_shares(&mut self, shares: Option<i64>) -> &mut Self {
        let value = shares.unwrap_or(CPU_SHARES_DEFAULT);
        self.set.push_flag_value("--cpu-shares", value);
        self
    }

    pub fn cpus(&mut self, cpus: &str) -> &mut Self {
        self.set.push_flag_value("--cpus", cpus);
        self
    }

    pub fn memory(&mut self, limit: &str) -> &mut Self {
        self.set.push_flag_value("--memory", limit);
        self
    }

    /// 0 (disable) or 10-1000; anything else fails fast.
    pub fn blkio_weight(&mut self, weight: u32) -> Result<&mut Self, OptionError> {
        let weight = checked_blkio_weight(weight)?;
        self.set.push_flag_value("--blkio-weight", weight);
        Ok(self)
    }

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

impl fmt::Display for RunOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.set.fmt(f)
    }
}
