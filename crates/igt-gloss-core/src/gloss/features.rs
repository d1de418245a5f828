//! Per-morpheme feature records for the sequence tagger.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::tokenizer::Tokenizer;

/// Combining acute accent, the stress mark in the corpora we gloss.
pub const STRESS_MARK: char = '\u{0301}';

/// Characters that tag a morpheme as belonging to a codeswitched language.
///
/// Empty by default, which turns language labels off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LangLabels(BTreeSet<char>);

impl LangLabels {
    pub fn new(symbols: impl IntoIterator<Item = char>) -> Self {
        Self(symbols.into_iter().collect())
    }

    pub fn contains(&self, c: char) -> bool {
        self.0.contains(&c)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The label symbol a morpheme ends with, if any.
    fn trailing(&self, morpheme: &str) -> Option<char> {
        morpheme.chars().last().filter(|&c| self.contains(c))
    }
}

/// Features for one morpheme in the context of its word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MorphemeFeatures {
    pub morpheme: String,
    pub suffix3: String,
    pub morpheme_no_stress: String,
    pub prev_morpheme: String,
    pub first_morpheme: bool,
    pub next_morpheme: String,
    pub last_morpheme: bool,
    pub lang_label: Option<char>,
}

impl MorphemeFeatures {
    /// Whether this record stands for an out-of-language word.
    pub fn is_ool(&self) -> bool {
        matches!(self.morpheme.as_str(), "OOL" | "ool")
    }

    /// Render the record as `name=value` strings plus a `bias` feature.
    pub fn to_sparse(&self) -> Vec<String> {
        let mut features = vec![
            "bias".to_string(),
            format!("morpheme={}", self.morpheme),
            format!("suffix3={}", self.suffix3),
            format!("morpheme_no_stress={}", self.morpheme_no_stress),
            format!("prev_morpheme={}", self.prev_morpheme),
            format!("first_morpheme={}", self.first_morpheme),
            format!("next_morpheme={}", self.next_morpheme),
            format!("last_morpheme={}", self.last_morpheme),
        ];
        if let Some(label) = self.lang_label {
            features.push(format!("lang_label={label}"));
        }
        features
    }
}

/// Build the feature record for `word[index]`.
///
/// # Panics
///
/// Panics if `index` is out of bounds for `word`.
pub fn morpheme_to_features(word: &[String], index: usize, labels: &LangLabels) -> MorphemeFeatures {
    let mut current = word[index].clone();

    let mut lang_label = None;
    if !labels.is_empty() {
        let last = word.len() - 1;
        // An infix can leave the word-final material in the penultimate slot.
        let candidates = [Some(last), last.checked_sub(1)];
        for slot in candidates.into_iter().flatten() {
            if let Some(label) = labels.trailing(&word[slot]) {
                lang_label = Some(label);
                if current.ends_with(label) {
                    current.pop();
                }
                break;
            }
        }
    }

    let morpheme = current.to_lowercase();
    let chars: Vec<char> = morpheme.chars().collect();
    let suffix3: String = chars[chars.len().saturating_sub(3)..].iter().collect();
    let morpheme_no_stress: String = morpheme.chars().filter(|&c| c != STRESS_MARK).collect();

    let neighbour = |i: Option<usize>| {
        i.and_then(|i| word.get(i))
            .map(|m| m.to_lowercase())
            .unwrap_or_default()
    };

    MorphemeFeatures {
        morpheme,
        suffix3,
        morpheme_no_stress,
        prev_morpheme: neighbour(index.checked_sub(1)),
        first_morpheme: index == 0,
        next_morpheme: neighbour(Some(index + 1)),
        last_morpheme: index + 1 == word.len(),
        lang_label,
    }
}

/// Turns segmentation lines into flat per-sentence feature sequences.
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    tokenizer: Tokenizer,
    labels: LangLabels,
}

impl FeatureExtractor {
    pub fn new(labels: LangLabels) -> Self {
        Self {
            tokenizer: Tokenizer::new(),
            labels,
        }
    }

    pub fn labels(&self) -> &LangLabels {
        &self.labels
    }

    /// Features for every morpheme of one tokenized word.
    pub fn word_features(&self, word: &[String]) -> Vec<MorphemeFeatures> {
        (0..word.len())
            .map(|i| morpheme_to_features(word, i, &self.labels))
            .collect()
    }

    /// Features for a segmentation line, flattened across words.
    pub fn line_features(&self, line: &str) -> Vec<MorphemeFeatures> {
        self.tokenizer
            .segment_line(line)
            .iter()
            .flat_map(|word| self.word_features(word))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_basic_features() {
        let w = word(&["Ti", "sqáycw", "a"]);
        let f = morpheme_to_features(&w, 1, &LangLabels::default());
        assert_eq!(f.morpheme, "sqáycw");
        assert_eq!(f.suffix3, "ycw");
        assert_eq!(f.prev_morpheme, "ti");
        assert_eq!(f.next_morpheme, "a");
        assert!(!f.first_morpheme);
        assert!(!f.last_morpheme);
        assert_eq!(f.lang_label, None);
    }

    #[test]
    fn test_word_edges() {
        let w = word(&["lhkan"]);
        let f = morpheme_to_features(&w, 0, &LangLabels::default());
        assert!(f.first_morpheme);
        assert!(f.last_morpheme);
        assert_eq!(f.prev_morpheme, "");
        assert_eq!(f.next_morpheme, "");
    }

    #[test]
    fn test_stress_removed() {
        // decomposed ú
        let w = word(&["pu\u{0301}p"]);
        let f = morpheme_to_features(&w, 0, &LangLabels::default());
        assert_eq!(f.morpheme_no_stress, "pup");
        assert_eq!(f.suffix3, "u\u{0301}p");
    }

    #[test]
    fn test_lang_label_from_last_morpheme() {
        let labels = LangLabels::new(['@']);
        let w = word(&["walk", "ing@"]);
        let last = morpheme_to_features(&w, 1, &labels);
        assert_eq!(last.lang_label, Some('@'));
        assert_eq!(last.morpheme, "ing");
        let first = morpheme_to_features(&w, 0, &labels);
        assert_eq!(first.lang_label, Some('@'));
        assert_eq!(first.morpheme, "walk");
    }

    #[test]
    fn test_lang_label_from_penultimate_morpheme() {
        let labels = LangLabels::new(['@']);
        let w = word(&["bse@", "b"]);
        let f = morpheme_to_features(&w, 0, &labels);
        assert_eq!(f.lang_label, Some('@'));
        assert_eq!(f.morpheme, "bse");
    }

    #[test]
    fn test_sparse_projection() {
        let w = word(&["a"]);
        let sparse = morpheme_to_features(&w, 0, &LangLabels::default()).to_sparse();
        assert_eq!(sparse[0], "bias");
        assert!(sparse.contains(&"morpheme=a".to_string()));
        assert!(sparse.contains(&"first_morpheme=true".to_string()));
        assert!(!sparse.iter().any(|s| s.starts_with("lang_label")));
    }

    #[test]
    fn test_line_features_flatten_words() {
        let extractor = FeatureExtractor::default();
        let feats = extractor.line_features("ti=sqáycw=a [wa7] pú<p>en'");
        let morphemes: Vec<&str> = feats.iter().map(|f| f.morpheme.as_str()).collect();
        assert_eq!(morphemes, vec!["ti", "sqáycw", "a", "wa7", "púen'", "p"]);
        assert!(feats[3].first_morpheme && feats[3].last_morpheme);
    }

    #[test]
    fn test_ool_feature() {
        let feats = FeatureExtractor::default().line_features("OOL wá7");
        assert!(feats[0].is_ool());
        assert!(!feats[1].is_ool());
        assert!(FeatureExtractor::default().line_features("ool")[0].is_ool());
        assert!(!FeatureExtractor::default().line_features("Ool")[0].is_ool());
    }
}
