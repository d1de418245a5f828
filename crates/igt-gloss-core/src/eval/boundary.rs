//! Boundary precision, recall and F1.
//!
//! Gold and predicted strings are walked with two cursors. A boundary on
//! either side moves only that side's cursor, so a missed or extra boundary
//! does not throw off the comparison of everything after it.

use std::ops::AddAssign;

use serde::Serialize;

use super::accuracy::check_alignment;
use crate::boundary::Boundary;
use crate::error::Result;

/// Whether boundary types must agree for a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryMatch {
    /// Any boundary matches any boundary.
    #[default]
    Untyped,
    /// `-` only matches `-`, `=` only matches `=`, and so on.
    Typed,
}

/// True positive, false positive and false negative boundary counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoundaryCounts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl AddAssign for BoundaryCounts {
    fn add_assign(&mut self, other: Self) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
    }
}

impl BoundaryCounts {
    /// `tp / (tp + fp)`, as a ratio.
    pub fn precision(&self) -> Option<f64> {
        let denominator = self.true_positives + self.false_positives;
        (denominator > 0).then(|| self.true_positives as f64 / denominator as f64)
    }

    /// `tp / (tp + fn)`, as a ratio.
    pub fn recall(&self) -> Option<f64> {
        let denominator = self.true_positives + self.false_negatives;
        (denominator > 0).then(|| self.true_positives as f64 / denominator as f64)
    }

    /// Harmonic mean of precision and recall, as a ratio.
    ///
    /// `None` unless both are defined and at least one is non-zero.
    pub fn f1(&self) -> Option<f64> {
        let (p, r) = (self.precision()?, self.recall()?);
        if p + r <= 0.0 {
            return None;
        }
        let tp = self.true_positives as f64;
        Some(2.0 * tp / (2.0 * tp + self.false_positives as f64 + self.false_negatives as f64))
    }
}

/// Walk one gold and one predicted string.
///
/// # Examples
/// ```
/// use igt_gloss_core::eval::{BoundaryMatch, boundary_counts};
///
/// let counts = boundary_counts("kʷukʷ-s-cút-s", "kʷukʷs-cút-s", BoundaryMatch::Untyped);
/// assert_eq!(counts.false_negatives, 1);
/// assert_eq!(counts.true_positives, 2);
/// ```
pub fn boundary_counts(gold: &str, predicted: &str, matching: BoundaryMatch) -> BoundaryCounts {
    let gold: Vec<char> = gold.chars().collect();
    let predicted: Vec<char> = predicted.chars().collect();
    let mut counts = BoundaryCounts::default();
    let (mut g, mut p) = (0, 0);

    while g < gold.len() || p < predicted.len() {
        let gold_boundary = gold.get(g).copied().and_then(Boundary::from_char);
        let pred_boundary = predicted.get(p).copied().and_then(Boundary::from_char);

        match (gold_boundary, pred_boundary) {
            (Some(a), Some(b)) => {
                if matching == BoundaryMatch::Typed && a != b {
                    counts.false_positives += 1;
                    counts.false_negatives += 1;
                } else {
                    counts.true_positives += 1;
                }
                g += 1;
                p += 1;
            }
            (Some(_), None) => {
                counts.false_negatives += 1;
                g += 1;
            }
            (None, Some(_)) => {
                counts.false_positives += 1;
                p += 1;
            }
            (None, None) => {
                g += 1;
                p += 1;
            }
        }
    }

    counts
}

/// Sum [`boundary_counts`] over word-aligned sentences.
pub fn line_boundary_counts(
    gold: &[Vec<String>],
    predicted: &[Vec<String>],
    matching: BoundaryMatch,
) -> Result<BoundaryCounts> {
    check_alignment(gold, predicted)?;
    let mut counts = BoundaryCounts::default();
    for (g, p) in gold.iter().zip(predicted) {
        for (gw, pw) in g.iter().zip(p) {
            counts += boundary_counts(gw, pw, matching);
        }
    }
    Ok(counts)
}
