//! Flag builder for `apptainer pull`.

use std::fmt;

use crate::errors::OptionError;

use super::OptionSet;

#[derive(Debug, Clone, Default)]
pub struct PullOptions {
    set: OptionSet,
}

impl PullOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite an existing image file.
    pub fn force(&mut self) -> &mut Self {
        self.set.push_flag("--force");
        self
    }

    /// Download directory for the pulled image.
    pub fn dir(&mut self, dir: &str) -> &mut Self {
        self.set.push_flag_value("--dir", dir);
        self
    }

    /// Architecture to pull, e.g. `"arm64"`.
    pub fn arch(&mut self, arch: &str) -> &mut Self {
        self.set.push_flag_value("--arch", arch);
        self
    }

    pub fn disable_cache(&mut self) -> &mut Self {
        self.set.push_flag("--disable-cache");
        self
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

impl fmt::Display for PullOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.set.fmt(f)
    }
}
