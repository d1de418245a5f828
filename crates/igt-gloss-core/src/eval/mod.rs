//! # Evaluation
//!
//! Glossing metrics over gold and predicted corpora. Every metric returns a
//! [`Score`], where `None` means there was nothing to score.

pub mod accuracy;
pub mod boundary;
pub mod oov;
pub mod report;

pub use accuracy::{
    bag_of_words_accuracy, check_alignment, in_vocab_stem_accuracy, morpheme_accuracy,
    stem_gram_accuracy_by_gold, stem_gram_accuracy_by_prediction, whole_word_accuracy,
    word_accuracy,
};
pub use boundary::{BoundaryCounts, BoundaryMatch, boundary_counts, line_boundary_counts};
pub use oov::{OovScores, oov_scores};
pub use report::{EvaluationReport, Evaluator, TrainingReference};

/// A percentage in `0..=100`, or `None` when the denominator was zero.
pub type Score = Option<f64>;

/// A ratio as a percentage rounded to two decimals.
///
/// # Examples
/// ```
/// use igt_gloss_core::eval::as_percent;
///
/// assert_eq!(as_percent(2.0 / 3.0), 66.67);
/// ```
pub fn as_percent(ratio: f64) -> f64 {
    (ratio * 10_000.0).round() / 100.0
}

pub(crate) fn percent(correct: usize, total: usize) -> Score {
    (total > 0).then(|| as_percent(correct as f64 / total as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_sentinel() {
        assert_eq!(percent(0, 0), None);
        assert_eq!(percent(0, 4), Some(0.0));
        assert_eq!(percent(1, 8), Some(12.5));
    }
}
