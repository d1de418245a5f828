//! Boundary normalization passes: clitic promotion and reduplication
//! classification. Both only rewrite segmentation and gloss lines.

pub mod clitics;
pub mod redup;

pub use clitics::{CliticPromoter, CliticTables, PromotedLines, PromotionStats, same_clitic};
pub use redup::{
    ClassifierConfig, ClassifierStats, INFIXING_REDUPLICANT, InfixPair, POST_REDUPLICANTS,
    PRE_REDUPLICANTS, ReduplicationClassifier,
};
