//! Pair Statistics Engine: corpus-wide adjacent-symbol pair frequencies.

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::model::Pair;
use crate::word::WordTable;

/// Aggregate frequency of every adjacent symbol pair in the table.
///
/// Every window of two symbols (stride 1, no wraparound) contributes the
/// word's occurrence count to that pair's total; pairs spanning the
/// end-of-word marker are counted like any other. Sums are exact. The
/// per-word scan is data-parallel and the reduction is a commutative sum,
/// so thread count never changes the result.
#[must_use]
pub fn pair_counts(table: &WordTable) -> FxHashMap<Pair, u64> {
    table
        .words()
        .par_iter()
        .map(|word| {
            let mut local: FxHashMap<Pair, u64> = FxHashMap::default();
            if word.has_pairs() {
                word.for_each_pair(|left, right| {
                    *local
                        .entry((left.to_string(), right.to_string()))
                        .or_insert(0) += word.count();
                });
            }
            local
        })
        .reduce(FxHashMap::default, |mut acc, local| {
            for (pair, count) in local {
                *acc.entry(pair).or_insert(0) += count;
            }
            acc
        })
}
