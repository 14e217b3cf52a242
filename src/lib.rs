//! Word-level byte pair encoding (BPE) training library and CLI.
//!
//! The crate exposes both a library API and a `wbpe` command line interface
//! for learning subword vocabularies from text corpora and applying them to
//! unseen text. Typical usage trains a [`BpeModel`], persists it as JSON,
//! and later encodes text against the stored merge list.
//!
//! ```no_run
//! use wbpe::{Trainer, TokenizerConfig};
//!
//! # fn main() -> wbpe::Result<()> {
//! let cfg = TokenizerConfig::builder()
//!     .min_frequency(2)
//!     .show_progress(false)
//!     .build()?;
//! let artifacts = Trainer::new(cfg).train("low lower lowest", 100)?;
//! let tokens = artifacts.model.encode("slower");
//! artifacts.model.save("model.json")?;
//! # Ok(())
//! # }
//! ```
//!
//! The CLI is enabled by default through the `cli` feature. Users targeting
//! the library portion only can disable default features to avoid the CLI
//! dependencies: `wbpe = { version = "...", default-features = false }`.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    clippy::all,
    rust_2018_idioms,
    future_incompatible,
    unused_lifetimes,
    unreachable_pub
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::doc_markdown,
    clippy::cast_precision_loss
)]

pub mod config;
pub mod corpus;
pub mod encoder;
pub mod error;
pub mod eval;
pub mod metrics;
pub mod model;
pub mod pairs;
pub mod preprocess;
pub mod serialization;
pub mod trainer;
pub mod word;

pub use config::{IngestConfig, PunctuationPolicy, TokenizerBuilder, TokenizerConfig};
pub use encoder::{decode, encode};
pub use error::{Result, WbpeError};
pub use eval::TokenComparison;
pub use metrics::{IterationMetrics, StopReason, TrainingMetrics};
pub use model::{BpeModel, Pair};
pub use trainer::{train, Trainer, TrainerArtifacts};
