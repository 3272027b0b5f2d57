//! Flag builder for `apptainer inspect`.

use std::fmt;

use crate::errors::OptionError;

use super::OptionSet;

#[derive(Debug, Clone, Default)]
pub struct InspectOptions {
    set: OptionSet,
}

impl InspectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show all available metadata.
    pub fn all(&mut self) -> &mut Self {
        self.set.push_flag("--all");
        self
    }

    /// Show the definition file the image was built from.
    pub fn deffile(&mut self) -> &mut Self {
        self.set.push_flag("--deffile");
        self
    }

    pub fn runscript(&mut self) -> &mut Self {
        self.set.push_flag("--runscript");
        self
    }

    pub fn labels(&mut self) -> &mut Self {
        self.set.push_flag("--labels");
        self
    }

    pub fn environment(&mut self) -> &mut Self {
        self.set.push_flag("--environment");
        self
    }

    /// Emit metadata as JSON.
    pub fn json(&mut self) -> &mut Self {
        self.set.push_flag("--json");
        self
    }

    pub fn helpfile(&mut self) -> &mut Self {
        self.set.push_flag("--helpfile");
        self
    }

    pub fn test(&mut self) -> &mut Self {
        self.set.push_flag("--test");
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

impl fmt::Display for InspectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.set.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_flags() {
        let mut opts = InspectOptions::new();
        opts.all().json();
        assert_eq!(opts.to_string(), "--all --json");
    }
}
