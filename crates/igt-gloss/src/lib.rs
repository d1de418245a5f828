//! # IGT Gloss
//!
//! Normalization, automatic glossing and evaluation for interlinear glossed
//! text. This crate bundles [`igt_gloss_core`] with the corpus runs from
//! [`igt_gloss_trainer`].
//!
//! ```rust
//! use igt_gloss::{Example, GlossingPipeline, PipelineConfig};
//!
//! let train = vec![
//!     Example::new(["ti sqáycwa", "ti=sqáycw=a", "DET=man=EXIS", "the man"]),
//!     Example::new(["wá7 lhkan", "wá7 lhkan", "be FSGS", "I am"]),
//! ];
//! let mut pipeline = GlossingPipeline::new(PipelineConfig::default());
//! pipeline.train(&train).unwrap();
//! let predictions = pipeline.predict(&train).unwrap();
//! assert_eq!(predictions.len(), 2);
//! ```

pub use igt_gloss_core::*;
pub use igt_gloss_trainer::{RunConfig, Trainer, load_corpus, save_corpus};
