//! Evaluation collaborator: comparing a token sequence against a reference
//! tokenizer's output.
//!
//! This sits outside the training/encoding core; it only consumes the
//! ordered token sequences both sides expose.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

/// Agreement statistics between a reference and a candidate token sequence.
///
/// Precision, recall, and F1 are computed over token multisets and are
/// therefore length-sensitive; Jaccard is computed over distinct token
/// sets; coverage is the fraction of distinct reference tokens that appear
/// anywhere in the candidate sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenComparison {
    /// Matched candidate occurrences over total candidate occurrences.
    pub precision: f64,
    /// Matched reference occurrences over total reference occurrences.
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub f1: f64,
    /// Distinct-token intersection over union.
    pub jaccard: f64,
    /// Fraction of distinct reference tokens present in the candidate.
    pub coverage: f64,
}

impl TokenComparison {
    /// Compares `candidate` against `reference`.
    ///
    /// Two empty sequences agree perfectly; a single empty side scores zero
    /// on every occurrence-based statistic.
    #[must_use]
    pub fn compare(reference: &[String], candidate: &[String]) -> Self {
        if reference.is_empty() && candidate.is_empty() {
            return Self {
                precision: 1.0,
                recall: 1.0,
                f1: 1.0,
                jaccard: 1.0,
                coverage: 1.0,
            };
        }

        let mut reference_counts: AHashMap<&str, u64> = AHashMap::new();
        for token in reference {
            *reference_counts.entry(token.as_str()).or_insert(0) += 1;
        }
        let mut candidate_counts: AHashMap<&str, u64> = AHashMap::new();
        for token in candidate {
            *candidate_counts.entry(token.as_str()).or_insert(0) += 1;
        }

        let overlap: u64 = candidate_counts
            .iter()
            .map(|(token, &count)| count.min(reference_counts.get(token).copied().unwrap_or(0)))
            .sum();

        let precision = ratio(overlap, candidate.len() as u64);
        let recall = ratio(overlap, reference.len() as u64);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        let reference_set: AHashSet<&str> = reference_counts.keys().copied().collect();
        let candidate_set: AHashSet<&str> = candidate_counts.keys().copied().collect();
        let intersection = reference_set.intersection(&candidate_set).count() as u64;
        let union = reference_set.union(&candidate_set).count() as u64;
        let jaccard = ratio(intersection, union);
        let coverage = ratio(intersection, reference_set.len() as u64);

        Self {
            precision,
            recall,
            f1,
            jaccard,
            coverage,
        }
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
