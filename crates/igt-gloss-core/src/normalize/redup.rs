//! Reduplication and infix classification.
//!
//! Some corpora mark every reduplicant and infix with one ambiguous
//! character. The gloss tells them apart:
//!
//! - `CRED` is an infixing reduplicant, delimited by an infix pair;
//! - `TRED`/`IRED` precede the base and `FRED` follows it, delimited by `~`;
//! - anything else becomes a regular boundary.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::boundary::Boundary;
use crate::corpus::{Example, LineLayout};

/// Gloss tag for an infixing reduplicant.
pub const INFIXING_REDUPLICANT: &str = "CRED";
/// Gloss tags for reduplicants that precede the base.
pub const PRE_REDUPLICANTS: [&str; 2] = ["TRED", "IRED"];
/// Gloss tags for reduplicants that follow the base.
pub const POST_REDUPLICANTS: [&str; 1] = ["FRED"];

/// Which infix pair an infixing reduplicant is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfixPair {
    /// `<` `>`
    #[default]
    Plain,
    /// `{` `}`
    Reduplicating,
}

impl InfixPair {
    pub fn boundaries(self) -> (Boundary, Boundary) {
        match self {
            InfixPair::Plain => (Boundary::InfixOpen, Boundary::InfixClose),
            InfixPair::Reduplicating => (Boundary::RedupInfixOpen, Boundary::RedupInfixClose),
        }
    }
}

/// Classifier configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Ambiguous reduplication marker.
    pub marker: char,
    /// Pair written for `CRED` words.
    pub cred_pair: InfixPair,
    /// Ambiguous infix marker handled by
    /// [`ReduplicationClassifier::mark_infixes`].
    pub infix_marker: char,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            marker: '·',
            cred_pair: InfixPair::Plain,
            infix_marker: '~',
        }
    }
}

impl ClassifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_marker(mut self, marker: char) -> Self {
        self.marker = marker;
        self
    }

    pub fn with_cred_pair(mut self, pair: InfixPair) -> Self {
        self.cred_pair = pair;
        self
    }

    pub fn with_infix_marker(mut self, marker: char) -> Self {
        self.infix_marker = marker;
        self
    }
}

/// What the classifier did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierStats {
    pub infixing_reduplication: usize,
    pub linear_reduplication: usize,
    pub infixes: usize,
    /// Words whose gloss did not support a rewrite.
    pub skipped: usize,
}

impl AddAssign for ClassifierStats {
    fn add_assign(&mut self, rhs: Self) {
        self.infixing_reduplication += rhs.infixing_reduplication;
        self.linear_reduplication += rhs.linear_reduplication;
        self.infixes += rhs.infixes;
        self.skipped += rhs.skipped;
    }
}

/// Rewrites ambiguous markers in segmentation words using gloss evidence.
#[derive(Debug, Clone, Default)]
pub struct ReduplicationClassifier {
    config: ClassifierConfig,
}

impl ReduplicationClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify the reduplication markers of one word.
    ///
    /// # Examples
    /// ```
    /// use igt_gloss_core::normalize::{ClassifierStats, ReduplicationClassifier};
    ///
    /// let classifier = ReduplicationClassifier::default();
    /// let mut stats = ClassifierStats::default();
    /// let word = classifier.classify_word("pú·p·en'", "get.found·CRED·+DIR", &mut stats);
    /// assert_eq!(word, "pú<p>en'");
    /// ```
    pub fn classify_word(&self, seg: &str, gloss: &str, stats: &mut ClassifierStats) -> String {
        let marker = self.config.marker;
        let mut word = seg.to_string();

        if word.contains(marker) {
            if word.matches(marker).count() == 3 {
                match (gloss.find(INFIXING_REDUPLICANT), other_red_position(gloss)) {
                    (Some(cred), Some(other)) if other < cred + 1 => {
                        word = replace_nth(&word, marker, 0, Boundary::Regular.as_char());
                    }
                    (Some(_), Some(_)) => {
                        word = replace_last(&word, marker, Boundary::Regular.as_char());
                    }
                    _ => {
                        debug!(seg, gloss, "three markers without CRED and another RED tag");
                        stats.skipped += 1;
                    }
                }
            }

            if gloss_pieces(gloss, marker).any(|p| p == INFIXING_REDUPLICANT) {
                let (open, close) = self.config.cred_pair.boundaries();
                word = replace_nth(&word, marker, 0, open.as_char());
                word = replace_nth(&word, marker, 0, close.as_char());
                stats.infixing_reduplication += 1;
            }

            word = word.replace(marker, &Boundary::Regular.to_string());
        }

        let has_linear = gloss_pieces(gloss, marker)
            .any(|p| PRE_REDUPLICANTS.contains(&p) || POST_REDUPLICANTS.contains(&p));
        if has_linear {
            match self.position_linear_reduplicant(&word, gloss) {
                Some(repositioned) => {
                    if repositioned != word {
                        stats.linear_reduplication += 1;
                    }
                    word = repositioned;
                }
                None => {
                    debug!(seg = %word, gloss, "reduplicant pieces do not align with gloss");
                    stats.skipped += 1;
                }
            }
        }

        word
    }

    /// Mark `~`-delimited infixes (or whichever infix marker is configured).
    ///
    /// Words with exactly two markers become `{ }` when the gloss has
    /// `CRED`, `< >` otherwise. Any other non-zero count is skipped.
    pub fn mark_infixes(&self, seg: &str, gloss: &str, stats: &mut ClassifierStats) -> String {
        let marker = self.config.infix_marker;
        match seg.matches(marker).count() {
            0 => seg.to_string(),
            2 => {
                let pair = if gloss_pieces(gloss, marker).any(|p| p == INFIXING_REDUPLICANT) {
                    stats.infixing_reduplication += 1;
                    InfixPair::Reduplicating
                } else {
                    stats.infixes += 1;
                    InfixPair::Plain
                };
                let (open, close) = pair.boundaries();
                let word = replace_nth(seg, marker, 0, open.as_char());
                replace_nth(&word, marker, 0, close.as_char())
            }
            n => {
                debug!(seg, markers = n, "infix marker count is not two");
                stats.skipped += 1;
                seg.to_string()
            }
        }
    }

    /// Classify every word of a segmentation line against its gloss line.
    pub fn classify_line(&self, seg: &str, gloss: &str) -> (String, ClassifierStats) {
        self.rewrite_line(seg, gloss, |s, g, stats| self.classify_word(s, g, stats))
    }

    /// Mark infixes on every word of a segmentation line.
    pub fn mark_infixes_line(&self, seg: &str, gloss: &str) -> (String, ClassifierStats) {
        self.rewrite_line(seg, gloss, |s, g, stats| self.mark_infixes(s, g, stats))
    }

    /// Run [`Self::classify_line`] over a corpus.
    pub fn classify_examples(
        &self,
        examples: &[Example],
        layout: &LineLayout,
    ) -> (Vec<Example>, ClassifierStats) {
        let mut total = ClassifierStats::default();
        let out = examples
            .iter()
            .map(|example| {
                let (seg, stats) = self.classify_line(
                    example.line(layout.segmentation),
                    example.line(layout.gloss),
                );
                total += stats;
                let mut out = example.clone();
                out.set_line(layout.segmentation, seg);
                out
            })
            .collect();

        info!(
            infixing = total.infixing_reduplication,
            linear = total.linear_reduplication,
            skipped = total.skipped,
            "reduplication classified"
        );
        (out, total)
    }

    fn rewrite_line<F>(&self, seg: &str, gloss: &str, rewrite: F) -> (String, ClassifierStats)
    where
        F: Fn(&str, &str, &mut ClassifierStats) -> String,
    {
        let mut stats = ClassifierStats::default();
        let seg_words: Vec<&str> = seg.split_whitespace().collect();
        let gloss_words: Vec<&str> = gloss.split_whitespace().collect();
        if seg_words.len() != gloss_words.len() {
            stats.skipped += 1;
            return (seg.to_string(), stats);
        }

        let words: Vec<String> = seg_words
            .iter()
            .zip(&gloss_words)
            .map(|(s, g)| rewrite(s, g, &mut stats))
            .collect();
        (words.join(" "), stats)
    }

    /// Turn the boundary next to a linear reduplicant into `~`.
    ///
    /// The word is split on every non-infixing boundary and the other
    /// boundaries are written back unchanged. Returns `None` when the pieces
    /// of the word do not line up with the gloss pieces.
    fn position_linear_reduplicant(&self, seg: &str, gloss: &str) -> Option<String> {
        let mut seg_pieces = Vec::new();
        let mut joints = Vec::new();
        let mut start = 0;
        for (i, c) in seg.char_indices() {
            if Boundary::from_char(c).is_some_and(|b| b.is_non_infixing()) {
                seg_pieces.push(&seg[start..i]);
                joints.push(c);
                start = i + c.len_utf8();
            }
        }
        seg_pieces.push(&seg[start..]);

        let infix_pairs = seg
            .chars()
            .filter_map(Boundary::from_char)
            .filter(Boundary::is_infix_opener)
            .count();
        let mut dropped = 0;
        let gloss_pieces: Vec<&str> = gloss_pieces(gloss, self.config.marker)
            .filter(|p| {
                if *p == INFIXING_REDUPLICANT && dropped < infix_pairs {
                    dropped += 1;
                    false
                } else {
                    true
                }
            })
            .collect();

        if seg_pieces.len() != gloss_pieces.len() {
            return None;
        }

        for (i, piece) in gloss_pieces.iter().enumerate() {
            if PRE_REDUPLICANTS.contains(piece) && i < joints.len() {
                joints[i] = Boundary::Reduplication.as_char();
            } else if POST_REDUPLICANTS.contains(piece) && i > 0 {
                joints[i - 1] = Boundary::Reduplication.as_char();
            }
        }

        let mut word = String::with_capacity(seg.len());
        for (i, piece) in seg_pieces.iter().enumerate() {
            if i > 0 {
                word.push(joints[i - 1]);
            }
            word.push_str(piece);
        }
        Some(word)
    }
}

/// Gloss pieces split on `-`, `=`, `~` and the ambiguous marker.
fn gloss_pieces(gloss: &str, marker: char) -> impl Iterator<Item = &str> {
    gloss.split(move |c: char| c == marker || matches!(c, '-' | '=' | '~'))
}

/// Byte offset of the first `RED` preceded by something other than `C`.
fn other_red_position(gloss: &str) -> Option<usize> {
    gloss
        .match_indices("RED")
        .map(|(i, _)| i)
        .find(|&i| i > 0 && !gloss[..i].ends_with('C'))
}

fn replace_nth(word: &str, from: char, n: usize, to: char) -> String {
    let mut seen = 0;
    word.chars()
        .map(|c| {
            if c == from {
                seen += 1;
                if seen == n + 1 {
                    return to;
                }
            }
            c
        })
        .collect()
}

fn replace_last(word: &str, from: char, to: char) -> String {
    let total = word.matches(from).count();
    if total == 0 {
        return word.to_string();
    }
    replace_nth(word, from, total - 1, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::morpheme_count;

    fn classifier() -> ReduplicationClassifier {
        ReduplicationClassifier::default()
    }

    fn classify(seg: &str, gloss: &str) -> (String, ClassifierStats) {
        let mut stats = ClassifierStats::default();
        let word = classifier().classify_word(seg, gloss, &mut stats);
        (word, stats)
    }

    #[test]
    fn test_cred_becomes_infix_pair() {
        let (word, stats) = classify("pú·p·en'", "get.found·CRED·+DIR");
        assert_eq!(word, "pú<p>en'");
        assert_eq!(stats.infixing_reduplication, 1);
    }

    #[test]
    fn test_cred_reduplicating_pair() {
        let config = ClassifierConfig::new().with_cred_pair(InfixPair::Reduplicating);
        let mut stats = ClassifierStats::default();
        let word = ReduplicationClassifier::new(config).classify_word(
            "pú·p·en'",
            "get.found·CRED·+DIR",
            &mut stats,
        );
        assert_eq!(word, "pú{p}en'");
    }

    #[test]
    fn test_plain_marker_becomes_regular() {
        let (word, _) = classify("a·b", "x·PL");
        assert_eq!(word, "a-b");
    }

    #[test]
    fn test_pre_reduplicant() {
        let (word, stats) = classify("qʷal·qʷal", "TRED·say");
        assert_eq!(word, "qʷal~qʷal");
        assert_eq!(stats.linear_reduplication, 1);
    }

    #[test]
    fn test_post_reduplicant() {
        let (word, _) = classify("s-tsu·tsu", "NOM-say·FRED");
        assert_eq!(word, "s-tsu~tsu");
    }

    #[test]
    fn test_three_markers_other_first() {
        let (word, _) = classify("re·ba·b·se", "TRED·base·CRED");
        assert_eq!(word, "re~ba<b>se");
        assert_eq!(morpheme_count(&word), 3);
    }

    #[test]
    fn test_three_markers_cred_first() {
        let (word, _) = classify("ba·b·se·se", "base·CRED·FRED");
        assert_eq!(word, "ba<b>se~se");
        assert_eq!(morpheme_count(&word), 3);
    }

    #[test]
    fn test_linear_misalignment_is_counted() {
        let (word, stats) = classify("a·b·c", "TRED·x");
        assert_eq!(word, "a-b-c");
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn test_mark_infixes() {
        let mut stats = ClassifierStats::default();
        let c = classifier();
        assert_eq!(c.mark_infixes("pú~p~en'", "get.found-CRED-DIR", &mut stats), "pú{p}en'");
        assert_eq!(c.mark_infixes("sa~ma~t", "go-INCH", &mut stats), "sa<ma>t");
        assert_eq!(c.mark_infixes("a~b", "x-y", &mut stats), "a~b");
        assert_eq!(c.mark_infixes("ab", "x", &mut stats), "ab");
        assert_eq!(stats.infixing_reduplication, 1);
        assert_eq!(stats.infixes, 1);
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn test_classify_examples() {
        let data = vec![Example::new([
            "púpen' ti",
            "pú·p·en' ti",
            "get.found·CRED·+DIR DET",
            "found the",
        ])];
        let (out, stats) = classifier().classify_examples(&data, &LineLayout::default());
        assert_eq!(out[0].line(1), "pú<p>en' ti");
        assert_eq!(out[0].line(2), "get.found·CRED·+DIR DET");
        assert_eq!(stats.infixing_reduplication, 1);
    }

    #[test]
    fn test_line_word_count_mismatch() {
        let (line, stats) = classifier().classify_line("a·b c", "x·PL");
        assert_eq!(line, "a·b c");
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn test_other_red_position() {
        assert_eq!(other_red_position("x·CRED·FRED"), Some(10));
        assert_eq!(other_red_position("x·CRED"), None);
        assert_eq!(other_red_position("RED"), None);
        assert_eq!(other_red_position("RED·TRED"), Some(6));
    }

    #[test]
    fn test_linear_reduplicant_with_proclitic() {
        let (word, stats) = classify("i=ts7ás·ts7as=a", "PL.DET=TRED·woman=EXIS");
        assert_eq!(word, "i=ts7ás~ts7as=a");
        assert_eq!(stats.linear_reduplication, 1);
        assert_eq!(stats.skipped, 0);
    }

    #[test]
    fn test_linear_reduplicant_with_enclitic() {
        let (word, stats) = classify("t'ák·t'ak=kalh", "get·FRED=FPLP");
        assert_eq!(word, "t'ák~t'ak=kalh");
        assert_eq!(stats.skipped, 0);
    }

    #[test]
    fn test_linear_reduplicant_between_clitics() {
        let (word, stats) = classify("ta=sél·sel-p-qw=a", "DET=revolve·FRED-INCH-back=EXIS");
        assert_eq!(word, "ta=sél~sel-p-qw=a");
        assert_eq!(morpheme_count(&word), 6);
        assert_eq!(stats.skipped, 0);
    }
}
