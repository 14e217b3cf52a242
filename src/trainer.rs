//! Core training loop: pair statistics, best-pair selection, merge
//! application, and artifact assembly.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::time::Instant;

use log::info;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::config::{IngestConfig, TokenizerBuilder, TokenizerConfig};
use crate::corpus::load_text_corpus;
use crate::error::Result;
use crate::metrics::{sample_rss_kb, IterationMetrics, StopReason, TrainingMetrics};
use crate::model::{BpeModel, Pair};
use crate::pairs::pair_counts;
use crate::preprocess::{preprocess, Preprocessed};
use crate::word::WordTable;

/// High-level façade configuring and executing BPE training runs.
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    cfg: TokenizerConfig,
}

/// Artifacts returned after a training session completes.
#[must_use]
#[derive(Debug, Clone)]
pub struct TrainerArtifacts {
    /// Trained BPE model.
    pub model: BpeModel,
    /// Detailed metrics captured during training.
    pub metrics: TrainingMetrics,
}

impl Trainer {
    /// Creates a new trainer for the supplied configuration.
    #[must_use]
    pub fn new(cfg: TokenizerConfig) -> Self {
        Self { cfg }
    }

    /// Returns a [`TokenizerBuilder`] with default settings.
    #[must_use]
    pub fn builder() -> TokenizerBuilder {
        TokenizerConfig::builder()
    }

    /// Returns an immutable reference to the underlying configuration.
    #[must_use]
    pub fn config(&self) -> &TokenizerConfig {
        &self.cfg
    }

    /// Trains a model by loading text files from disk according to
    /// [`IngestConfig`].
    pub fn train_from_paths<P: AsRef<Path>>(
        &self,
        inputs: &[P],
        ingest: &IngestConfig,
        max_merges: usize,
    ) -> Result<TrainerArtifacts> {
        let text = load_text_corpus(inputs, ingest)?;
        self.train(&text, max_merges)
    }

    /// Trains a model from in-memory text, learning at most `max_merges`
    /// merges.
    ///
    /// A zero budget and an empty corpus are both valid and yield a model
    /// with an empty merge list. Two runs over identical input and budget
    /// produce identical merge lists: ties on frequency are broken by the
    /// lexicographically smallest `(left, right)` pair, independent of map
    /// iteration order and thread count.
    pub fn train(&self, text: &str, max_merges: usize) -> Result<TrainerArtifacts> {
        self.cfg.validate()?;

        let Preprocessed { mut table, alphabet } = preprocess(text, &self.cfg);
        let mut token_vocab: BTreeSet<String> = alphabet;
        let mut merges: Vec<Pair> = Vec::with_capacity(max_merges.min(4096));
        let mut metrics = TrainingMetrics::new(max_merges.min(4096));
        let training_start = Instant::now();

        for iteration in 1..=max_merges {
            let iteration_start = Instant::now();
            let counts = pair_counts(&table);
            let distinct_pairs = counts.len();

            let Some((pair, frequency)) = select_best_pair(&counts, self.cfg.min_frequency)
            else {
                metrics.stop_reason = StopReason::Saturated;
                break;
            };

            let (left, right) = pair;
            let merges_applied = apply_merge(&mut table, &left, &right);

            let mut merged_symbol = String::with_capacity(left.len() + right.len());
            merged_symbol.push_str(&left);
            merged_symbol.push_str(&right);
            token_vocab.insert(merged_symbol);

            if self.cfg.show_progress {
                info!(
                    "iter {:>5} pair {:?}+{:?} freq {:>7} merges {:>7} distinct_pairs {:>7} vocab {:>6}",
                    iteration,
                    left,
                    right,
                    frequency,
                    merges_applied,
                    distinct_pairs,
                    token_vocab.len()
                );
            }

            metrics.iterations.push(IterationMetrics {
                iteration,
                pair: (left.clone(), right.clone()),
                frequency,
                merges_applied,
                distinct_pairs,
                elapsed_iteration: iteration_start.elapsed(),
                elapsed_total: training_start.elapsed(),
                rss_kb: sample_rss_kb(),
            });
            merges.push((left, right));
        }

        metrics.total_duration = training_start.elapsed();

        if self.cfg.show_progress {
            info!(
                "completed {} merges in {:.2?}; vocab size {}",
                merges.len(),
                metrics.total_duration,
                token_vocab.len()
            );
        }

        let model = BpeModel::new(table.rendered(), token_vocab, merges, self.cfg.clone());
        Ok(TrainerArtifacts { model, metrics })
    }
}

/// Trains with [`TokenizerConfig::default`]; the crate-level entry point.
pub fn train(text: &str, max_merges: usize) -> Result<TrainerArtifacts> {
    Trainer::default().train(text, max_merges)
}

/// Selects the pair with strictly maximal aggregate frequency, breaking
/// ties toward the lexicographically smallest `(left, right)` tuple.
fn select_best_pair(counts: &FxHashMap<Pair, u64>, min_frequency: u64) -> Option<(Pair, u64)> {
    counts
        .iter()
        .filter(|(_, &count)| count >= min_frequency)
        .max_by(|(pair_a, count_a), (pair_b, count_b)| {
            count_a.cmp(count_b).then_with(|| pair_b.cmp(pair_a))
        })
        .map(|(pair, &count)| (pair.clone(), count))
}

/// Replaces every `left, right` adjacency throughout the table, returning
/// the count-weighted number of occurrences replaced. Each word is mutated
/// by exactly one worker; the reduction is a plain sum.
fn apply_merge(table: &mut WordTable, left: &str, right: &str) -> u64 {
    table
        .words_mut()
        .par_iter_mut()
        .map(|word| {
            let occurrences = word.merge(left, right) as u64;
            occurrences * word.count()
        })
        .sum()
}

impl fmt::Display for TrainerArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "BPE model with vocab size {} ({} merges)",
            self.model.vocab_size(),
            self.model.merges().len()
        )?;
        writeln!(f, "Stop reason: {:?}", self.metrics.stop_reason)?;
        writeln!(f, "Total duration: {:?}", self.metrics.total_duration)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &str = "low low low low low lowest lowest newer newer newer newer \
                          newer newer wider wider wider new new";

    fn trainer() -> Trainer {
        let cfg = TokenizerConfig::builder()
            .show_progress(false)
            .build()
            .unwrap();
        Trainer::new(cfg)
    }

    fn pair(left: &str, right: &str) -> Pair {
        (left.to_string(), right.to_string())
    }

    #[test]
    fn canonical_corpus_learns_expected_merges() {
        let artifacts = trainer().train(CORPUS, 3).unwrap();
        // (e, r) and (r, _) tie at 9; "er" < "r_" lexicographically. After
        // two merges (e, w) and (n, e) tie at 8; ("e", "w") < ("n", "e").
        assert_eq!(
            artifacts.model.merges(),
            &[pair("e", "r"), pair("er", "_"), pair("e", "w")]
        );
        assert!(artifacts.model.token_vocab().contains("er"));
        assert!(artifacts.model.token_vocab().contains("er_"));
        assert!(artifacts.model.token_vocab().contains("ew"));
        assert_eq!(artifacts.metrics.stop_reason, StopReason::BudgetExhausted);
    }

    #[test]
    fn canonical_corpus_word_frequencies() {
        let artifacts = trainer().train(CORPUS, 0).unwrap();
        assert_eq!(
            artifacts.model.word_vocab(),
            &[
                ("l o w _".to_string(), 5),
                ("l o w e s t _".to_string(), 2),
                ("n e w e r _".to_string(), 6),
                ("w i d e r _".to_string(), 3),
                ("n e w _".to_string(), 2),
            ]
        );
    }

    #[test]
    fn merge_list_never_exceeds_budget() {
        for budget in [0, 1, 2, 5, 50] {
            let artifacts = trainer().train(CORPUS, budget).unwrap();
            assert!(artifacts.model.merges().len() <= budget);
            assert!(artifacts.metrics.iterations.len() <= budget);
        }
    }

    #[test]
    fn zero_budget_yields_zero_merges() {
        let artifacts = trainer().train(CORPUS, 0).unwrap();
        assert!(artifacts.model.merges().is_empty());
        assert_eq!(artifacts.metrics.stop_reason, StopReason::BudgetExhausted);
    }

    #[test]
    fn training_saturates_when_no_pairs_remain() {
        let artifacts = trainer().train("ab ab", 100).unwrap();
        // a b _ collapses after two merges; the third iteration finds no
        // pairs.
        assert_eq!(artifacts.metrics.stop_reason, StopReason::Saturated);
        assert!(artifacts.model.merges().len() < 100);
        assert_eq!(artifacts.model.word_vocab(), &[("ab_".to_string(), 2)]);
    }

    #[test]
    fn whitespace_only_corpus_yields_empty_artifacts() {
        let artifacts = trainer().train(" \t \n ", 10).unwrap();
        assert!(artifacts.model.word_vocab().is_empty());
        assert!(artifacts.model.token_vocab().is_empty());
        assert!(artifacts.model.merges().is_empty());
        assert_eq!(artifacts.metrics.stop_reason, StopReason::Saturated);
    }

    #[test]
    fn training_is_deterministic() {
        let first = trainer().train(CORPUS, 10).unwrap();
        let second = trainer().train(CORPUS, 10).unwrap();
        assert_eq!(first.model.merges(), second.model.merges());
        assert_eq!(first.model.token_vocab(), second.model.token_vocab());
        assert_eq!(first.model.word_vocab(), second.model.word_vocab());
    }

    #[test]
    fn token_vocabulary_grows_monotonically() {
        let mut previous: Option<std::collections::BTreeSet<String>> = None;
        for budget in 0..6 {
            let vocab = trainer().train(CORPUS, budget).unwrap().model.token_vocab().clone();
            if let Some(prev) = previous {
                assert!(prev.is_subset(&vocab));
            }
            previous = Some(vocab);
        }
    }

    #[test]
    fn symbol_mass_decreases_by_merges_applied() {
        let cfg = TokenizerConfig::builder().show_progress(false).build().unwrap();
        let initial_mass = preprocess(CORPUS, &cfg).table.symbol_mass();

        let artifacts = trainer().train(CORPUS, 3).unwrap();
        let final_mass: u64 = artifacts
            .model
            .word_vocab()
            .iter()
            .map(|(word, count)| word.split(' ').count() as u64 * count)
            .sum();
        let removed: u64 = artifacts
            .metrics
            .iterations
            .iter()
            .map(|iter| iter.merges_applied)
            .sum();

        assert_eq!(initial_mass - final_mass, removed);
        // Absent overlapping self-pair runs, each iteration removes exactly
        // the selected pair's frequency.
        for iter in &artifacts.metrics.iterations {
            assert_eq!(iter.merges_applied, iter.frequency);
        }
    }

    #[test]
    fn min_frequency_floor_filters_rare_pairs() {
        let cfg = TokenizerConfig::builder()
            .min_frequency(4)
            .show_progress(false)
            .build()
            .unwrap();
        let artifacts = Trainer::new(cfg).train(CORPUS, 100).unwrap();
        assert_eq!(artifacts.metrics.stop_reason, StopReason::Saturated);
        for iter in &artifacts.metrics.iterations {
            assert!(iter.frequency >= 4);
        }
    }

    #[test]
    fn crate_level_train_uses_default_config() {
        let artifacts = train(CORPUS, 2).unwrap();
        assert_eq!(artifacts.model.merges().len(), 2);
    }
}
