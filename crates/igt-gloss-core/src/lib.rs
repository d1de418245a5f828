//! # IGT Gloss Core
//!
//! Boundary normalization, alignment checking and automatic glossing for
//! interlinear glossed text (IGT): a transcription line, a morpheme
//! segmentation line, a gloss line and a translation per example.
//!
//! ## Quick Start
//!
//! ```rust
//! use igt_gloss_core::normalize::CliticPromoter;
//! use igt_gloss_core::tokenizer::Tokenizer;
//!
//! let promoter = CliticPromoter::default();
//! let promoted = promoter.promote_line("Wá7 lhkan", "wá7=lhkan", "IPFV=FSGS");
//! assert_eq!(promoted.segmentation, "wá7 lhkan");
//! assert_eq!(promoted.gloss, "IPFV FSGS");
//!
//! let tokenizer = Tokenizer::new();
//! assert_eq!(tokenizer.segment_word("ti=sqáycw=a"), vec!["ti", "sqáycw", "a"]);
//! ```
pub mod boundary;
pub mod corpus;
pub mod error;
pub mod eval;
pub mod gloss;
pub mod normalize;
pub mod tokenizer;
pub mod validate;

// Re-export primary API
pub use boundary::Boundary;
pub use corpus::{Example, LineLayout};
pub use error::{IgtError, Result};
pub use eval::{EvaluationReport, Evaluator, Score, TrainingReference};
pub use gloss::{
    GlossingPipeline, MorphemeFeatures, PerceptronConfig, PerceptronTagger, PipelineConfig,
    Prediction, SequenceTagger, StemDictionary,
};
pub use normalize::{
    ClassifierConfig, CliticPromoter, CliticTables, PromotionStats, ReduplicationClassifier,
};
pub use tokenizer::Tokenizer;
pub use validate::{AlignmentFilter, ValidationReport, Validator};
