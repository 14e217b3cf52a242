//! Configuration builders controlling tokenizer training and corpus ingestion.

use crate::error::{Result, WbpeError};
use serde::{Deserialize, Serialize};

/// ASCII punctuation characters, mirroring Python's `string.punctuation`.
pub const ASCII_PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Default end-of-word marker appended to every training word.
pub const DEFAULT_MARKER: char = '_';

/// How designated punctuation characters are treated during preprocessing
/// and encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PunctuationPolicy {
    /// Punctuation acts as a word boundary and is dropped from the output.
    #[default]
    Strip,
    /// Each punctuation character becomes its own single-character token.
    Isolate,
}

/// Configuration for word-level BPE training and encoding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenizerConfig {
    /// Policy applied to characters in [`TokenizerConfig::punctuation`].
    pub punctuation_policy: PunctuationPolicy,
    /// The set of characters treated as punctuation.
    pub punctuation: String,
    /// Reserved end-of-word marker appended to every training word.
    pub marker: char,
    /// Minimum aggregate pair frequency required before a merge is learned.
    pub min_frequency: u64,
    /// Enables per-iteration logging through the `log` facade.
    pub show_progress: bool,
}

impl TokenizerConfig {
    /// Returns a builder initialised with [`TokenizerConfig::default`].
    #[must_use]
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::default()
    }

    /// Validates the invariants required for training and encoding.
    ///
    /// The marker must be a character that can never survive inside a
    /// preprocessed word: non-whitespace, non-alphanumeric, and a member of
    /// the configured punctuation set.
    pub fn validate(&self) -> Result<()> {
        if self.marker.is_whitespace() {
            return Err(WbpeError::InvalidConfig(
                "end-of-word marker must not be a whitespace character".into(),
            ));
        }
        if self.marker.is_alphanumeric() {
            return Err(WbpeError::InvalidConfig(format!(
                "end-of-word marker {:?} is alphanumeric and could collide with corpus text",
                self.marker
            )));
        }
        if !self.punctuation.contains(self.marker) {
            return Err(WbpeError::InvalidConfig(format!(
                "end-of-word marker {:?} must be part of the punctuation set so it is \
                 always removed from corpus words",
                self.marker
            )));
        }
        if let Some(ws) = self.punctuation.chars().find(|c| c.is_whitespace()) {
            return Err(WbpeError::InvalidConfig(format!(
                "punctuation set must not contain whitespace (found {ws:?})"
            )));
        }
        if self.min_frequency == 0 {
            return Err(WbpeError::InvalidConfig(
                "min_frequency must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Returns `true` when `c` belongs to the configured punctuation set.
    #[inline]
    #[must_use]
    pub fn is_punctuation(&self, c: char) -> bool {
        self.punctuation.contains(c)
    }

    /// Returns the marker as an owned symbol string.
    #[must_use]
    pub fn marker_symbol(&self) -> String {
        self.marker.to_string()
    }
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            punctuation_policy: PunctuationPolicy::Strip,
            punctuation: ASCII_PUNCTUATION.to_string(),
            marker: DEFAULT_MARKER,
            min_frequency: 1,
            show_progress: true,
        }
    }
}

/// Builder for [`TokenizerConfig`].
#[derive(Debug, Default, Clone)]
pub struct TokenizerBuilder {
    cfg: TokenizerConfig,
}

impl TokenizerBuilder {
    /// Creates a builder with [`TokenizerConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the punctuation policy.
    #[must_use]
    pub fn punctuation_policy(mut self, policy: PunctuationPolicy) -> Self {
        self.cfg.punctuation_policy = policy;
        self
    }

    /// Overrides the set of characters treated as punctuation.
    #[must_use]
    pub fn punctuation<S: Into<String>>(mut self, chars: S) -> Self {
        self.cfg.punctuation = chars.into();
        self
    }

    /// Sets the end-of-word marker character.
    #[must_use]
    pub fn marker(mut self, marker: char) -> Self {
        self.cfg.marker = marker;
        self
    }

    /// Sets the minimum merge frequency.
    #[must_use]
    pub fn min_frequency(mut self, value: u64) -> Self {
        self.cfg.min_frequency = value;
        self
    }

    /// Enables or disables per-iteration logging.
    #[must_use]
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.cfg.show_progress = enabled;
        self
    }

    /// Finalises the builder, returning a validated [`TokenizerConfig`].
    pub fn build(self) -> Result<TokenizerConfig> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}

/// Configuration controlling how text corpora are read from disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestConfig {
    /// Enables recursive directory traversal.
    pub recursive: bool,
    /// Follows symlinks encountered during traversal.
    pub follow_symlinks: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            follow_symlinks: false,
        }
    }
}

impl IngestConfig {
    /// Returns a builder initialised with [`IngestConfig::default`].
    #[must_use]
    pub fn builder() -> IngestBuilder {
        IngestBuilder::default()
    }
}

/// Builder for [`IngestConfig`].
#[derive(Debug, Default, Clone)]
pub struct IngestBuilder {
    cfg: IngestConfig,
}

impl IngestBuilder {
    /// Creates a new builder with [`IngestConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables recursive directory traversal.
    #[must_use]
    pub fn recursive(mut self, enabled: bool) -> Self {
        self.cfg.recursive = enabled;
        self
    }

    /// Enables or disables following of symlinks when traversing directories.
    #[must_use]
    pub fn follow_symlinks(mut self, enabled: bool) -> Self {
        self.cfg.follow_symlinks = enabled;
        self
    }

    /// Finalises the builder, returning the [`IngestConfig`].
    pub fn build(self) -> IngestConfig {
        self.cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        TokenizerConfig::default().validate().expect("valid config");
    }

    #[test]
    fn validate_rejects_whitespace_marker() {
        let err = TokenizerConfig::builder()
            .marker(' ')
            .build()
            .expect_err("whitespace marker must be rejected");
        assert!(matches!(
            err,
            WbpeError::InvalidConfig(message) if message.contains("whitespace")
        ));
    }

    #[test]
    fn validate_rejects_alphanumeric_marker() {
        let err = TokenizerConfig::builder()
            .punctuation(format!("{ASCII_PUNCTUATION}x"))
            .marker('x')
            .build()
            .expect_err("alphanumeric marker must be rejected");
        assert!(matches!(err, WbpeError::InvalidConfig(_)));
    }

    #[test]
    fn validate_rejects_marker_outside_punctuation_set() {
        let err = TokenizerConfig::builder()
            .punctuation("!?.")
            .marker('_')
            .build()
            .expect_err("marker must belong to the punctuation set");
        assert!(matches!(
            err,
            WbpeError::InvalidConfig(message) if message.contains("punctuation set")
        ));
    }

    #[test]
    fn validate_rejects_zero_min_frequency() {
        let err = TokenizerConfig::builder()
            .min_frequency(0)
            .build()
            .expect_err("zero min_frequency must be rejected");
        assert!(matches!(
            err,
            WbpeError::InvalidConfig(message) if message.contains("min_frequency")
        ));
    }

    #[test]
    fn ingest_builder_overrides_defaults() {
        let cfg = IngestConfig::builder()
            .recursive(false)
            .follow_symlinks(true)
            .build();
        assert!(!cfg.recursive);
        assert!(cfg.follow_symlinks);
    }
}
