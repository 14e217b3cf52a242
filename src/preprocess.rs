//! Preprocessing: raw text to word-frequency table and initial alphabet.
//!
//! The same chunker feeds both training and encoding so that word
//! boundaries agree between the two; see [`crate::encoder`].

use std::collections::BTreeSet;

use ahash::AHashMap;

use crate::config::{PunctuationPolicy, TokenizerConfig};
use crate::word::{Word, WordTable};

/// A segment of input text produced by the chunker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Chunk<'a> {
    /// Maximal run of non-whitespace, non-punctuation characters.
    Word(&'a str),
    /// A single designated punctuation character.
    Punct(char),
}

/// Splits `text` into word and punctuation chunks. Whitespace separates
/// chunks and is never emitted.
pub(crate) fn chunks<'a>(text: &'a str, cfg: &TokenizerConfig) -> Vec<Chunk<'a>> {
    let mut out = Vec::new();
    let mut word_start: Option<usize> = None;

    for (idx, c) in text.char_indices() {
        if c.is_whitespace() || cfg.is_punctuation(c) {
            if let Some(start) = word_start.take() {
                out.push(Chunk::Word(&text[start..idx]));
            }
            if cfg.is_punctuation(c) {
                out.push(Chunk::Punct(c));
            }
        } else if word_start.is_none() {
            word_start = Some(idx);
        }
    }
    if let Some(start) = word_start {
        out.push(Chunk::Word(&text[start..]));
    }
    out
}

/// Output of [`preprocess`]: the word-frequency table plus the initial
/// per-character token vocabulary.
#[derive(Debug, Clone, Default)]
pub struct Preprocessed {
    /// Distinct words in first-seen order, marker appended, exact counts.
    pub table: WordTable,
    /// Distinct characters appearing in any word, pre-marker.
    pub alphabet: BTreeSet<String>,
}

/// Normalises raw text into a [`WordTable`] and the initial alphabet.
///
/// Words are whitespace-delimited runs with punctuation removed according
/// to the configured policy; every word receives the end-of-word marker as
/// its final symbol before counting. Under [`PunctuationPolicy::Isolate`]
/// each punctuation character is counted as its own single-symbol word
/// (no marker; it passes through encoding unchanged, so no marker-bearing
/// merge could ever apply to it). Empty input yields an empty table and an
/// empty alphabet.
#[must_use]
pub fn preprocess(text: &str, cfg: &TokenizerConfig) -> Preprocessed {
    let mut slots: AHashMap<String, usize> = AHashMap::new();
    let mut counted: Vec<(String, u64, bool)> = Vec::new();
    let mut alphabet = BTreeSet::new();

    let mut bump = |key: String, is_word: bool, counted: &mut Vec<(String, u64, bool)>| {
        if let Some(&slot) = slots.get(&key) {
            counted[slot].1 += 1;
        } else {
            slots.insert(key.clone(), counted.len());
            counted.push((key, 1, is_word));
        }
    };

    for chunk in chunks(text, cfg) {
        match chunk {
            Chunk::Word(word) => {
                for c in word.chars() {
                    alphabet.insert(c.to_string());
                }
                bump(word.to_string(), true, &mut counted);
            }
            Chunk::Punct(c) => {
                if cfg.punctuation_policy == PunctuationPolicy::Isolate {
                    alphabet.insert(c.to_string());
                    bump(c.to_string(), false, &mut counted);
                }
            }
        }
    }

    let words = counted
        .into_iter()
        .map(|(text, count, is_word)| {
            let mut symbols: Vec<String> = text.chars().map(|c| c.to_string()).collect();
            if is_word {
                symbols.push(cfg.marker_symbol());
            }
            Word::new(symbols, count)
        })
        .collect();

    Preprocessed {
        table: WordTable::new(words),
        alphabet,
    }
}
