//! # Viterbi Decoding
//!
//! Finds the highest-scoring label sequence given per-position emission
//! scores and a label transition matrix.

use crate::error::{IgtError, Result};

/// Viterbi decoder over a fixed label set.
#[derive(Debug, Clone)]
pub struct ViterbiDecoder {
    num_labels: usize,
}

/// Path score and backpointer for one cell of the DP table.
#[derive(Debug, Clone, Copy)]
struct PathState {
    score: f64,
    prev_label: Option<usize>,
}

impl ViterbiDecoder {
    /// Create a decoder for `num_labels` labels.
    pub fn new(num_labels: usize) -> Self {
        Self { num_labels }
    }

    /// Decode the best label sequence.
    ///
    /// # Arguments
    /// * `emission_scores` - `[seq_len][num_labels]` emission scores
    /// * `transition_matrix` - `[num_labels][num_labels]` scores, indexed `[prev][curr]`
    ///
    /// # Errors
    /// Returns [`IgtError::LengthMismatch`] if a row has the wrong width.
    pub fn decode(
        &self,
        emission_scores: &[Vec<f64>],
        transition_matrix: &[Vec<f64>],
    ) -> Result<Vec<usize>> {
        let seq_len = emission_scores.len();
        if seq_len == 0 || self.num_labels == 0 {
            return Ok(Vec::new());
        }

        if let Some(row) = emission_scores.iter().find(|r| r.len() != self.num_labels) {
            return Err(IgtError::length_mismatch(
                "emission score width",
                self.num_labels,
                row.len(),
            ));
        }
        if transition_matrix.len() != self.num_labels
            || transition_matrix.iter().any(|r| r.len() != self.num_labels)
        {
            return Err(IgtError::length_mismatch(
                "transition matrix size",
                self.num_labels,
                transition_matrix.len(),
            ));
        }

        let mut dp: Vec<Vec<PathState>> = vec![
            vec![
                PathState {
                    score: f64::NEG_INFINITY,
                    prev_label: None
                };
                self.num_labels
            ];
            seq_len
        ];

        for label in 0..self.num_labels {
            dp[0][label].score = emission_scores[0][label];
        }

        // Forward pass
        for pos in 1..seq_len {
            for curr in 0..self.num_labels {
                let mut best_score = f64::NEG_INFINITY;
                let mut best_prev = None;

                for prev in 0..self.num_labels {
                    let score = dp[pos - 1][prev].score + transition_matrix[prev][curr];
                    if score > best_score {
                        best_score = score;
                        best_prev = Some(prev);
                    }
                }

                dp[pos][curr].score = best_score + emission_scores[pos][curr];
                dp[pos][curr].prev_label = best_prev;
            }
        }

        // Best final label; ties go to the lowest index
        let mut best_final = 0;
        let mut best_final_score = f64::NEG_INFINITY;
        for label in 0..self.num_labels {
            if dp[seq_len - 1][label].score > best_final_score {
                best_final_score = dp[seq_len - 1][label].score;
                best_final = label;
            }
        }

        // Backtrack
        let mut path = Vec::with_capacity(seq_len);
        path.push(best_final);
        let mut curr = best_final;
        for pos in (1..seq_len).rev() {
            curr = dp[pos][curr].prev_label.unwrap_or(0);
            path.push(curr);
        }

        path.reverse();
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viterbi_follows_emissions() {
        let decoder = ViterbiDecoder::new(3);
        let transition = vec![vec![0.0; 3]; 3];
        let emissions = vec![vec![1.0, 0.0, 0.0], vec![0.0, 0.0, 1.0], vec![0.0, 1.0, 0.0]];

        let path = decoder.decode(&emissions, &transition).unwrap();
        assert_eq!(path, vec![0, 2, 1]);
    }

    #[test]
    fn test_viterbi_transition_overrides_weak_emission() {
        let decoder = ViterbiDecoder::new(2);
        // 0 -> 1 is heavily penalized
        let transition = vec![vec![0.0, -10.0], vec![0.0, 0.0]];
        let emissions = vec![vec![5.0, 0.0], vec![0.0, 1.0]];

        let path = decoder.decode(&emissions, &transition).unwrap();
        assert_eq!(path, vec![0, 0]);
    }

    #[test]
    fn test_viterbi_empty() {
        let decoder = ViterbiDecoder::new(2);
        let path = decoder.decode(&[], &[vec![0.0; 2], vec![0.0; 2]]).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn test_viterbi_dimension_mismatch() {
        let decoder = ViterbiDecoder::new(2);
        let err = decoder
            .decode(&[vec![1.0, 2.0, 3.0]], &[vec![0.0; 2], vec![0.0; 2]])
            .unwrap_err();
        assert!(matches!(err, IgtError::LengthMismatch { .. }));
    }
}
