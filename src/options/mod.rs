#![allow(clippy::module_name_repetitions)]
//! Typed option builders for the Apptainer subcommands.
//!
//! Every builder wraps an [`OptionSet`], an ordered accumulator of argv
//! tokens. Named flag methods append pre-formatted tokens in call order; the
//! generic [`OptionSet::add`] primitive remains available for flags the typed
//! surface does not cover. Serialization never mutates, so a builder may be
//! reused across invocations — though concurrent callers should each hold
//! their own instance.

use std::fmt;

use crate::errors::OptionError;
use crate::util::shell_join;

mod build;
mod exec;
mod inspect;
mod pull;
mod run;

pub use build::BuildOptions;
pub use exec::ExecOptions;
pub use inspect::InspectOptions;
pub use pull::PullOptions;
pub use run::RunOptions;

/// Valid inclusive range for `--blkio-weight`, plus 0 meaning "disable".
pub(crate) const BLKIO_WEIGHT_MIN: u32 = 10;
pub(crate) const BLKIO_WEIGHT_MAX: u32 = 1000;

/// Marker the runtime interprets as "use the default share count".
pub(crate) const CPU_SHARES_DEFAULT: i64 = -1;

/// Ordered sequence of pre-formatted flag tokens.
///
/// Tokens are kept exactly as inserted: no deduplication, no conflict
/// detection, no reordering. `Display` renders the space-joined concatenation
/// in insertion order and may be called any number of times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    tokens: Vec<String>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one pre-formatted token. No constraints on content.
    pub fn add(&mut self, token: impl Into<String>) {
        self.tokens.push(token.into());
    }

    /// Append a sequence of tokens in order.
    pub fn add_all<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens.extend(tokens.into_iter().map(Into::into));
    }

    /// Remove the first token equal to `token`.
    ///
    /// Fails without mutating when no exact match exists.
    pub fn remove(&mut self, token: &str) -> Result<(), OptionError> {
        match self.tokens.iter().position(|t| t == token) {
            Some(idx) => {
                self.tokens.remove(idx);
                Ok(())
            }
            None => Err(OptionError::TokenNotFound(token.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Tokens in insertion order, ready to extend an argv.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Shell-quoted rendering for previews and logs.
    pub fn preview(&self) -> String {
        shell_join(&self.tokens)
    }

    pub(crate) fn push_flag(&mut self, name: &str) {
        self.add(name);
    }

    pub(crate) fn push_flag_value(&mut self, name: &str, value: impl fmt::Display) {
        self.add(name);
        self.add(value.to_string());
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

/// Range check shared by the exec and run builders.
pub(crate) fn checked_blkio_weight(weight: u32) -> Result<u32, OptionError> {
    // 0 disables blkio weighting; the runtime documents it alongside 10-1000.
    if weight == 0 || (BLKIO_WEIGHT_MIN..=BLKIO_WEIGHT_MAX).contains(&weight) {
        Ok(weight)
    } else {
        Err(OptionError::InvalidValue {
            flag: "--blkio-weight",
            value: weight.to_string(),
            reason: "must be 0 (disable) or within 10-1000",
        })
    }
}
