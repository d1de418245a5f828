//! # IGT Gloss Trainer
//!
//! Corpus-level runs on top of `igt-gloss-core`: prescreening a raw corpus,
//! normalizing its boundaries, training and applying the glossing pipeline,
//! and scoring predictions.

pub mod data;
pub mod trainer;

pub use data::{RunConfig, load_corpus, save_corpus};
pub use trainer::{GlossRun, Normalized, Prescreen, Trainer};
