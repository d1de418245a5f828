//! Out-of-vocabulary word scores.

use std::collections::BTreeSet;

use serde::Serialize;

use super::accuracy::check_alignment;
use super::{Score, percent};
use crate::error::Result;

/// How many gold words were unseen in training, and how well they were glossed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OovScores {
    pub count: usize,
    /// OOV words as a percentage of all gold words.
    pub proportion: Score,
    /// Exact-match accuracy on the OOV words alone.
    pub accuracy: Score,
}

/// Score gold gloss words missing from the training vocabulary.
pub fn oov_scores(
    gold: &[Vec<String>],
    predicted: &[Vec<String>],
    vocabulary: &BTreeSet<String>,
) -> Result<OovScores> {
    check_alignment(gold, predicted)?;
    let (mut total, mut oov, mut oov_correct) = (0, 0, 0);
    for (g, p) in gold.iter().zip(predicted) {
        for (gw, pw) in g.iter().zip(p) {
            total += 1;
            if vocabulary.contains(gw) {
                continue;
            }
            oov += 1;
            oov_correct += usize::from(gw == pw);
        }
    }
    Ok(OovScores {
        count: oov,
        proportion: percent(oov, total),
        accuracy: percent(oov_correct, oov),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn counts_unseen_words() {
        let vocabulary: BTreeSet<String> = ["DET=man=EXIS".to_string()].into();
        let gold = vec![words(&["DET=man=EXIS", "be-FSGS", "DET=woman"])];
        let pred = vec![words(&["DET=man=EXIS", "be-FSGS", "DET=STEM"])];
        let scores = oov_scores(&gold, &pred, &vocabulary).unwrap();
        assert_eq!(scores.count, 2);
        assert_eq!(scores.proportion, Some(66.67));
        assert_eq!(scores.accuracy, Some(50.0));
    }

    #[test]
    fn no_oov_words() {
        let vocabulary: BTreeSet<String> = ["be".to_string()].into();
        let gold = vec![words(&["be"])];
        let scores = oov_scores(&gold, &gold, &vocabulary).unwrap();
        assert_eq!(scores.count, 0);
        assert_eq!(scores.proportion, Some(0.0));
        assert_eq!(scores.accuracy, None);
    }
}
