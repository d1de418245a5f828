//! Stem/gram partition.
//!
//! The tagger only learns grams and a generic [`STEM_LABEL`]; stems are
//! recovered afterwards from a dictionary built on the training data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;
use unicode_normalization::UnicodeNormalization;

use super::features::{MorphemeFeatures, STRESS_MARK};
use crate::error::{IgtError, Result};

/// Placeholder label standing in for any stem.
pub const STEM_LABEL: &str = "STEM";

/// Whether a gold gloss is treated as a stem: it contains an ASCII lower-case letter.
pub fn is_stem_gloss(gloss: &str) -> bool {
    gloss.chars().any(|c| c.is_ascii_lowercase())
}

/// Strip stress and neutralize schwa so near-spellings of a stem match.
///
/// # Examples
/// ```
/// use igt_gloss_core::gloss::generalize_morpheme;
///
/// assert_eq!(generalize_morpheme("sqáycw"), "sqaycw");
/// assert_eq!(generalize_morpheme("kəl"), "kel");
/// ```
pub fn generalize_morpheme(morpheme: &str) -> String {
    morpheme
        .nfd()
        .filter(|&c| c != STRESS_MARK)
        .map(|c| if c == 'ə' { 'e' } else { c })
        .collect()
}

/// Morpheme to gloss, in insertion order.
///
/// Re-inserting a morpheme replaces its gloss but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(String, String)>", into = "Vec<(String, String)>")]
pub struct StemDictionary {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl From<Vec<(String, String)>> for StemDictionary {
    fn from(entries: Vec<(String, String)>) -> Self {
        let mut dict = StemDictionary::default();
        for (morpheme, gloss) in entries {
            dict.insert(morpheme, gloss);
        }
        dict
    }
}

impl From<StemDictionary> for Vec<(String, String)> {
    fn from(dict: StemDictionary) -> Self {
        dict.entries
    }
}

impl StemDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, morpheme: impl Into<String>, gloss: impl Into<String>) {
        let morpheme = morpheme.into();
        let gloss = gloss.into();
        match self.index.get(&morpheme) {
            Some(&i) => self.entries[i].1 = gloss,
            None => {
                self.index.insert(morpheme.clone(), self.entries.len());
                self.entries.push((morpheme, gloss));
            }
        }
    }

    pub fn get(&self, morpheme: &str) -> Option<&str> {
        self.index
            .get(morpheme)
            .map(|&i| self.entries[i].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(m, g)| (m.as_str(), g.as_str()))
    }

    /// Merge another dictionary in; its glosses win on shared morphemes.
    pub fn extend(&mut self, other: StemDictionary) {
        for (morpheme, gloss) in other.entries {
            self.insert(morpheme, gloss);
        }
    }

    /// Find the entry for a morpheme.
    ///
    /// An exact match is tried first. Otherwise the first key, in insertion
    /// order, whose generalized form equals the generalized query wins.
    pub fn match_stem(&self, morpheme: &str) -> Option<(&str, &str)> {
        if let Some(&i) = self.index.get(morpheme) {
            let (m, g) = &self.entries[i];
            return Some((m.as_str(), g.as_str()));
        }
        let wanted = generalize_morpheme(morpheme);
        self.iter().find(|(key, _)| generalize_morpheme(key) == wanted)
    }
}

/// Replace every stem gloss with [`STEM_LABEL`], recording the stem in a dictionary.
///
/// # Errors
///
/// Returns [`IgtError::LengthMismatch`] if `features` and `glosses` differ in length.
pub fn partition_stems(
    features: &[MorphemeFeatures],
    glosses: &[String],
) -> Result<(Vec<String>, StemDictionary)> {
    if features.len() != glosses.len() {
        return Err(IgtError::length_mismatch(
            "morpheme features vs gold glosses",
            features.len(),
            glosses.len(),
        ));
    }

    let mut dict = StemDictionary::new();
    let labels = features
        .iter()
        .zip(glosses)
        .map(|(feature, gloss)| {
            if is_stem_gloss(gloss) {
                dict.insert(feature.morpheme.clone(), gloss.clone());
                STEM_LABEL.to_string()
            } else {
                gloss.clone()
            }
        })
        .collect();

    Ok((labels, dict))
}

/// [`partition_stems`] over a corpus of sentences, with one merged dictionary.
pub fn partition_corpus(
    features: &[Vec<MorphemeFeatures>],
    glosses: &[Vec<String>],
) -> Result<(Vec<Vec<String>>, StemDictionary)> {
    if features.len() != glosses.len() {
        return Err(IgtError::length_mismatch(
            "feature sentences vs gloss sentences",
            features.len(),
            glosses.len(),
        ));
    }

    let mut dict = StemDictionary::new();
    let mut labels = Vec::with_capacity(features.len());
    for (sentence, gold) in features.iter().zip(glosses) {
        let (sentence_labels, sentence_dict) = partition_stems(sentence, gold)?;
        labels.push(sentence_labels);
        dict.extend(sentence_dict);
    }
    Ok((labels, dict))
}

/// How many predicted stems were found in the dictionary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StemLookupStats {
    pub known: usize,
    pub unknown: usize,
}

impl StemLookupStats {
    /// Share of predicted stems missing from the dictionary, `None` if no stems were predicted.
    pub fn unknown_ratio(&self) -> Option<f64> {
        let total = self.known + self.unknown;
        (total > 0).then(|| self.unknown as f64 / total as f64)
    }
}

/// Replace predicted [`STEM_LABEL`]s with their dictionary glosses.
///
/// Unknown stems keep the placeholder.
pub fn gloss_stems(
    features: &[Vec<MorphemeFeatures>],
    predicted: &[Vec<String>],
    dict: &StemDictionary,
) -> Result<(Vec<Vec<String>>, StemLookupStats)> {
    let mut stats = StemLookupStats::default();
    let mut glossed = Vec::with_capacity(predicted.len());

    for (sentence, labels) in features.iter().zip(predicted) {
        if sentence.len() != labels.len() {
            return Err(IgtError::length_mismatch(
                "morpheme features vs predicted labels",
                sentence.len(),
                labels.len(),
            ));
        }
        let out = sentence
            .iter()
            .zip(labels)
            .map(|(feature, label)| {
                if label != STEM_LABEL {
                    return label.clone();
                }
                match dict.match_stem(&feature.morpheme) {
                    Some((_, gloss)) => {
                        stats.known += 1;
                        gloss.to_string()
                    }
                    None => {
                        stats.unknown += 1;
                        label.clone()
                    }
                }
            })
            .collect();
        glossed.push(out);
    }

    if let Some(ratio) = stats.unknown_ratio() {
        info!(
            known = stats.known,
            unknown = stats.unknown,
            "unknown stem ratio {:.4}",
            ratio
        );
    }

    Ok((glossed, stats))
}
