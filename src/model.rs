//! The trained model artifact.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::TokenizerConfig;
use crate::encoder;
use crate::error::Result;
use crate::serialization;

/// Merge pair encoded as `(left, right)` symbols.
pub type Pair = (String, String);

/// Trained BPE model containing the learned vocabulary and ordered merges.
///
/// The model is an explicit, immutable artifact: training returns it once
/// and nothing mutates it afterwards, so any number of texts can be encoded
/// against one model concurrently.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BpeModel {
    word_vocab: Vec<(String, u64)>,
    token_vocab: BTreeSet<String>,
    merges: Vec<Pair>,
    config: TokenizerConfig,
}

impl BpeModel {
    /// Constructs a model from the supplied vocabularies, merges, and
    /// configuration.
    pub fn new(
        word_vocab: Vec<(String, u64)>,
        token_vocab: BTreeSet<String>,
        merges: Vec<Pair>,
        config: TokenizerConfig,
    ) -> Self {
        Self {
            word_vocab,
            token_vocab,
            merges,
            config,
        }
    }

    /// Final word-frequency table in merged-symbol canonical form
    /// (symbols joined with single spaces), in first-seen corpus order.
    #[must_use]
    pub fn word_vocab(&self) -> &[(String, u64)] {
        &self.word_vocab
    }

    /// The token vocabulary: initial alphabet plus every merged symbol.
    #[must_use]
    pub fn token_vocab(&self) -> &BTreeSet<String> {
        &self.token_vocab
    }

    /// The ordered merge list; order is the priority order replayed during
    /// encoding.
    #[must_use]
    pub fn merges(&self) -> &[Pair] {
        &self.merges
    }

    /// The configuration the model was trained with.
    #[must_use]
    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Number of distinct tokens in the vocabulary.
    #[must_use]
    pub fn vocab_size(&self) -> usize {
        self.token_vocab.len()
    }

    /// Segments `text` into subword tokens using the model's merge list.
    #[must_use]
    pub fn encode(&self, text: &str) -> Vec<String> {
        encoder::encode(text, &self.merges, &self.config)
    }

    /// Serialises the model to a JSON string.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        serialization::model_json(self, pretty)
    }

    /// Persists the model as JSON at `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        serialization::save_model(self, path, false)
    }

    /// Loads a model previously written by [`BpeModel::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        serialization::load_model(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_model() -> BpeModel {
        let cfg = TokenizerConfig::builder()
            .show_progress(false)
            .build()
            .expect("valid config");
        let token_vocab: BTreeSet<String> =
            ["l", "o", "w", "lo", "low"].iter().map(|s| s.to_string()).collect();
        BpeModel::new(
            vec![("low _".to_string(), 5)],
            token_vocab,
            vec![
                ("l".to_string(), "o".to_string()),
                ("lo".to_string(), "w".to_string()),
            ],
            cfg,
        )
    }

    #[test]
    fn accessors_expose_training_artifacts() {
        let model = sample_model();
        assert_eq!(model.vocab_size(), 5);
        assert_eq!(model.merges().len(), 2);
        assert_eq!(model.word_vocab()[0].1, 5);
    }

    #[test]
    fn json_round_trip_preserves_model() {
        let model = sample_model();
        let json = model.to_json(true).expect("serialise");
        let restored: BpeModel = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(restored, model);
    }
}
