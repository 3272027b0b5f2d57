//! Flag builder for `apptainer build`.

use std::fmt;

use crate::errors::OptionError;

use super::OptionSet;

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    set: OptionSet,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the target image if it exists.
    pub fn force(&mut self) -> &mut Self {
        self.set.push_flag("--force");
        self
    }

    /// Build with an unprivileged user namespace.
    pub fn fakeroot(&mut self) -> &mut Self {
        self.set.push_flag("--fakeroot");
        self
    }

    /// Produce a writable sandbox directory instead of a SIF file.
    pub fn sandbox(&mut self) -> &mut Self {
        self.set.push_flag("--sandbox");
        self
    }

    /// Skip the %test section after the build.
    pub fn notest(&mut self) -> &mut Self {
        self.set.push_flag("--notest");
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

impl fmt::Display for BuildOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.set.fmt(f)
    }
}
