//! Sequence tagger seam and the averaged perceptron that fills it by default.

use std::collections::HashMap;
use std::path::Path;

use oorandom::Rand32;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::features::MorphemeFeatures;
use super::viterbi::ViterbiDecoder;
use crate::error::{IgtError, Result};

/// Anything that maps feature sequences to label sequences.
pub trait SequenceTagger {
    /// Learn from parallel feature and label sequences.
    fn fit(&mut self, features: &[Vec<MorphemeFeatures>], labels: &[Vec<String>]) -> Result<()>;

    /// Label every sequence.
    fn predict(&self, features: &[Vec<MorphemeFeatures>]) -> Result<Vec<Vec<String>>>;
}

/// Hyperparameters for [`PerceptronTagger`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptronConfig {
    /// Passes over the training data (at least 1).
    pub epochs: usize,
    /// Seed for the per-epoch shuffle.
    pub seed: u64,
}

impl Default for PerceptronConfig {
    fn default() -> Self {
        Self {
            epochs: 50,
            seed: 42,
        }
    }
}

impl PerceptronConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Emission weights per sparse feature plus a `[prev][curr]` transition matrix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Weights {
    emission: HashMap<String, Vec<f64>>,
    transitions: Vec<Vec<f64>>,
}

impl Weights {
    fn zeroed(num_labels: usize) -> Self {
        Self {
            emission: HashMap::new(),
            transitions: vec![vec![0.0; num_labels]; num_labels],
        }
    }

    fn emissions(&self, sentence: &[Vec<String>], num_labels: usize) -> Vec<Vec<f64>> {
        sentence
            .iter()
            .map(|features| {
                let mut scores = vec![0.0; num_labels];
                for w in features.iter().filter_map(|f| self.emission.get(f)) {
                    for (score, weight) in scores.iter_mut().zip(w) {
                        *score += weight;
                    }
                }
                scores
            })
            .collect()
    }

    fn add_emission(&mut self, feature: &str, label: usize, delta: f64, num_labels: usize) {
        let row = self
            .emission
            .entry(feature.to_string())
            .or_insert_with(|| vec![0.0; num_labels]);
        row[label] += delta;
    }
}

/// Averaged structured perceptron with Viterbi decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerceptronTagger {
    config: PerceptronConfig,
    labels: Vec<String>,
    weights: Weights,
}

impl PerceptronTagger {
    pub fn new(config: PerceptronConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &PerceptronConfig {
        &self.config
    }

    /// Labels seen in training, in first-seen order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_fitted(&self) -> bool {
        !self.labels.is_empty()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn decode(&self, weights: &Weights, sentence: &[Vec<String>]) -> Result<Vec<usize>> {
        let emissions = weights.emissions(sentence, self.labels.len());
        ViterbiDecoder::new(self.labels.len()).decode(&emissions, &weights.transitions)
    }
}

fn sparse_sentences(features: &[Vec<MorphemeFeatures>]) -> Vec<Vec<Vec<String>>> {
    features
        .iter()
        .map(|sentence| sentence.iter().map(MorphemeFeatures::to_sparse).collect())
        .collect()
}

fn shuffle(order: &mut [usize], rng: &mut Rand32) {
    for i in (1..order.len()).rev() {
        let j = rng.rand_range(0..(i as u32 + 1)) as usize;
        order.swap(i, j);
    }
}

impl SequenceTagger for PerceptronTagger {
    fn fit(&mut self, features: &[Vec<MorphemeFeatures>], labels: &[Vec<String>]) -> Result<()> {
        if features.len() != labels.len() {
            return Err(IgtError::length_mismatch(
                "training feature sentences vs label sentences",
                features.len(),
                labels.len(),
            ));
        }
        for (sentence, gold) in features.iter().zip(labels) {
            if sentence.len() != gold.len() {
                return Err(IgtError::length_mismatch(
                    "training features vs labels",
                    sentence.len(),
                    gold.len(),
                ));
            }
        }

        let mut label_ids: HashMap<&str, usize> = HashMap::new();
        let mut label_names = Vec::new();
        for label in labels.iter().flatten() {
            if !label_ids.contains_key(label.as_str()) {
                label_ids.insert(label.as_str(), label_names.len());
                label_names.push(label.clone());
            }
        }
        if label_names.is_empty() {
            return Err(IgtError::EmptyInput);
        }
        let num_labels = label_names.len();
        self.labels = label_names;

        let sparse = sparse_sentences(features);
        let gold: Vec<Vec<usize>> = labels
            .iter()
            .map(|s| s.iter().map(|l| label_ids[l.as_str()]).collect())
            .collect();

        // Averaging via the running-sum trick: avg = w - u / c.
        let mut current = Weights::zeroed(num_labels);
        let mut scaled = Weights::zeroed(num_labels);
        let mut c = 1.0_f64;

        let mut order: Vec<usize> = (0..sparse.len()).filter(|&i| !sparse[i].is_empty()).collect();
        let mut rng = Rand32::new(self.config.seed);
        let epochs = self.config.epochs.max(1);

        for epoch in 0..epochs {
            shuffle(&mut order, &mut rng);
            let mut correct = 0usize;
            let mut total = 0usize;

            for &s in &order {
                let pred = self.decode(&current, &sparse[s])?;
                let truth = &gold[s];

                for (pos, (&p, &t)) in pred.iter().zip(truth).enumerate() {
                    total += 1;
                    if p == t {
                        correct += 1;
                        continue;
                    }
                    for feature in &sparse[s][pos] {
                        current.add_emission(feature, t, 1.0, num_labels);
                        current.add_emission(feature, p, -1.0, num_labels);
                        scaled.add_emission(feature, t, c, num_labels);
                        scaled.add_emission(feature, p, -c, num_labels);
                    }
                }

                for pos in 1..truth.len() {
                    let (tp, tc) = (truth[pos - 1], truth[pos]);
                    let (pp, pc) = (pred[pos - 1], pred[pos]);
                    if (tp, tc) != (pp, pc) {
                        current.transitions[tp][tc] += 1.0;
                        current.transitions[pp][pc] -= 1.0;
                        scaled.transitions[tp][tc] += c;
                        scaled.transitions[pp][pc] -= c;
                    }
                }

                c += 1.0;
            }

            let accuracy = if total > 0 {
                correct as f64 / total as f64
            } else {
                0.0
            };
            debug!(epoch = epoch + 1, epochs, "training accuracy {:.2}%", accuracy * 100.0);
            if epoch + 1 == epochs {
                info!(epochs, labels = num_labels, "final training accuracy {:.2}%", accuracy * 100.0);
            }
        }

        for (feature, row) in current.emission.iter_mut() {
            if let Some(sums) = scaled.emission.get(feature) {
                for (w, u) in row.iter_mut().zip(sums) {
                    *w -= u / c;
                }
            }
        }
        for (row, sums) in current.transitions.iter_mut().zip(&scaled.transitions) {
            for (w, u) in row.iter_mut().zip(sums) {
                *w -= u / c;
            }
        }
        self.weights = current;
        Ok(())
    }

    fn predict(&self, features: &[Vec<MorphemeFeatures>]) -> Result<Vec<Vec<String>>> {
        if !self.is_fitted() {
            return Err(IgtError::TaggerNotFitted);
        }

        sparse_sentences(features)
            .iter()
            .map(|sentence| {
                let path = self.decode(&self.weights, sentence)?;
                Ok(path.into_iter().map(|i| self.labels[i].clone()).collect())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gloss::features::FeatureExtractor;

    fn corpus() -> (Vec<Vec<MorphemeFeatures>>, Vec<Vec<String>>) {
        let extractor = FeatureExtractor::default();
        let data = [
            ("ti=sqáycw=a", "DET STEM EXIS"),
            ("ti=smúlhats=a", "DET STEM EXIS"),
            ("ta=sqáycw=a", "DET STEM EXIS"),
            ("wá7 lhkan", "STEM FSGS"),
            ("ts'áqw-an'-lhkan", "STEM DIR FSGS"),
        ];
        let features = data.iter().map(|(seg, _)| extractor.line_features(seg)).collect();
        let labels = data
            .iter()
            .map(|(_, gloss)| gloss.split(' ').map(str::to_string).collect())
            .collect();
        (features, labels)
    }

    #[test]
    fn test_predict_before_fit() {
        let tagger = PerceptronTagger::default();
        let err = tagger.predict(&[]).unwrap_err();
        assert!(matches!(err, IgtError::TaggerNotFitted));
    }

    #[test]
    fn test_fit_reproduces_training_labels() {
        let (features, labels) = corpus();
        let mut tagger = PerceptronTagger::new(PerceptronConfig::new().with_epochs(10));
        tagger.fit(&features, &labels).unwrap();
        assert_eq!(tagger.labels(), &["DET", "STEM", "EXIS", "FSGS", "DIR"]);
        assert_eq!(tagger.predict(&features).unwrap(), labels);
    }

    #[test]
    fn test_fit_is_deterministic_for_seed() {
        let (features, labels) = corpus();
        let config = PerceptronConfig::new().with_epochs(3).with_seed(7);
        let mut a = PerceptronTagger::new(config.clone());
        let mut b = PerceptronTagger::new(config);
        a.fit(&features, &labels).unwrap();
        b.fit(&features, &labels).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fit_length_mismatch() {
        let (features, mut labels) = corpus();
        labels[0].pop();
        let mut tagger = PerceptronTagger::default();
        assert!(matches!(
            tagger.fit(&features, &labels),
            Err(IgtError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_epochs_clamped() {
        assert_eq!(PerceptronConfig::new().with_epochs(0).epochs, 1);
    }

    #[test]
    fn test_save_and_load() {
        let (features, labels) = corpus();
        let mut tagger = PerceptronTagger::new(PerceptronConfig::new().with_epochs(2));
        tagger.fit(&features, &labels).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagger.json");
        tagger.save(&path).unwrap();
        let loaded = PerceptronTagger::load(&path).unwrap();
        assert_eq!(loaded.predict(&features).unwrap(), tagger.predict(&features).unwrap());
    }
}
