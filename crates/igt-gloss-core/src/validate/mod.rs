//! # Alignment Validation
//!
//! Read-only prescreen checks over a corpus. Every check increments one
//! counter of a [`ValidationReport`]; reports from several files are merged
//! with `+=`. The only hard error is an inconsistent number of lines per
//! example.

pub mod inventory;

use std::fmt;
use std::ops::AddAssign;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::boundary::{self, Boundary};
use crate::corpus::tidy::NON_PERMITTED_PUNCTUATION_PATTERN;
use crate::corpus::{Example, LineLayout, check_shape};
use crate::error::Result;
use crate::tokenizer::Tokenizer;

pub use inventory::{GlossInventory, InventoryEntry, gloss_inventory};

/// Failure counts, one field per check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub examples: usize,
    pub tabs: usize,
    pub multiple_spaces: usize,
    pub transcription_punctuation: usize,
    pub seg_consecutive_boundaries: usize,
    pub seg_disconnected_boundary: usize,
    pub seg_infix_mismatch: usize,
    pub seg_infix_misplacement: usize,
    pub seg_punctuation: usize,
    pub transcription_seg_words: usize,
    pub gloss_consecutive_boundaries: usize,
    pub gloss_disconnected_boundary: usize,
    pub gloss_infix_mismatch: usize,
    pub gloss_infix_misplacement: usize,
    pub seg_gloss_words: usize,
    pub seg_gloss_morphemes: usize,
    pub seg_gloss_word_morphemes: usize,
    pub seg_gloss_boundary_types: usize,
}

impl ValidationReport {
    /// Number of distinct checks.
    pub const CHECKS: usize = 17;

    /// Sum of all failure counts.
    pub fn total(&self) -> usize {
        self.tabs
            + self.multiple_spaces
            + self.transcription_punctuation
            + self.seg_consecutive_boundaries
            + self.seg_disconnected_boundary
            + self.seg_infix_mismatch
            + self.seg_infix_misplacement
            + self.seg_punctuation
            + self.transcription_seg_words
            + self.gloss_consecutive_boundaries
            + self.gloss_disconnected_boundary
            + self.gloss_infix_mismatch
            + self.gloss_infix_misplacement
            + self.seg_gloss_words
            + self.seg_gloss_morphemes
            + self.seg_gloss_word_morphemes
            + self.seg_gloss_boundary_types
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

impl AddAssign for ValidationReport {
    fn add_assign(&mut self, rhs: Self) {
        self.examples += rhs.examples;
        self.tabs += rhs.tabs;
        self.multiple_spaces += rhs.multiple_spaces;
        self.transcription_punctuation += rhs.transcription_punctuation;
        self.seg_consecutive_boundaries += rhs.seg_consecutive_boundaries;
        self.seg_disconnected_boundary += rhs.seg_disconnected_boundary;
        self.seg_infix_mismatch += rhs.seg_infix_mismatch;
        self.seg_infix_misplacement += rhs.seg_infix_misplacement;
        self.seg_punctuation += rhs.seg_punctuation;
        self.transcription_seg_words += rhs.transcription_seg_words;
        self.gloss_consecutive_boundaries += rhs.gloss_consecutive_boundaries;
        self.gloss_disconnected_boundary += rhs.gloss_disconnected_boundary;
        self.gloss_infix_mismatch += rhs.gloss_infix_mismatch;
        self.gloss_infix_misplacement += rhs.gloss_infix_misplacement;
        self.seg_gloss_words += rhs.seg_gloss_words;
        self.seg_gloss_morphemes += rhs.seg_gloss_morphemes;
        self.seg_gloss_word_morphemes += rhs.seg_gloss_word_morphemes;
        self.seg_gloss_boundary_types += rhs.seg_gloss_boundary_types;
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} checks run over {} examples.",
            Self::CHECKS,
            self.examples
        )?;
        if self.is_clean() {
            return writeln!(f, "No problems found.");
        }
        writeln!(f, "{} problems in total:", self.total())?;
        let rows = [
            (self.tabs, "lines with tab characters"),
            (self.multiple_spaces, "lines with consecutive spaces"),
            (self.transcription_punctuation, "transcription lines with non-permitted punctuation"),
            (self.seg_punctuation, "segmentation lines with non-permitted punctuation"),
            (self.transcription_seg_words, "transcription/segmentation word count mismatches"),
            (self.seg_consecutive_boundaries, "segmentation lines with consecutive boundaries"),
            (self.gloss_consecutive_boundaries, "gloss lines with consecutive boundaries"),
            (self.seg_disconnected_boundary, "segmentation lines with a disconnected boundary"),
            (self.gloss_disconnected_boundary, "gloss lines with a disconnected boundary"),
            (self.seg_infix_mismatch, "unpaired infix boundaries in segmentation lines"),
            (self.gloss_infix_mismatch, "unpaired infix boundaries in gloss lines"),
            (self.seg_infix_misplacement, "misplaced infix boundaries in segmentation lines"),
            (self.gloss_infix_misplacement, "misplaced infix boundaries in gloss lines"),
            (self.seg_gloss_words, "segmentation/gloss word count mismatches"),
            (self.seg_gloss_morphemes, "segmentation/gloss morpheme count mismatches"),
            (self.seg_gloss_word_morphemes, "words with a segmentation/gloss morpheme count mismatch"),
            (self.seg_gloss_boundary_types, "segmentation/gloss boundary type mismatches"),
        ];
        for (count, label) in rows {
            writeln!(f, "  - {count} {label}")?;
        }
        Ok(())
    }
}

/// Which misalignment [`Validator::filter_misaligned`] removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentFilter {
    /// Segmentation/gloss morphemes do not line up.
    #[default]
    SegGloss,
    /// Transcription/segmentation word counts differ.
    OrthoSeg,
    /// Either of the above.
    Both,
}

/// Prescreen checks with pre-compiled patterns.
pub struct Validator {
    tokenizer: Tokenizer,
    re_punctuation: Regex,
    re_consecutive: Regex,
    re_gloss_consecutive: Regex,
    re_disconnected: Regex,
    re_gloss_disconnected: Regex,
}

impl Validator {
    /// # Errors
    ///
    /// Returns `IgtError::RegexError` if a pattern fails to compile.
    pub fn new() -> Result<Self> {
        let all = r"[<>{}\-=~]";
        let openers_and_linear = r"[<{\-=~]";
        Ok(Self {
            tokenizer: Tokenizer::new(),
            re_punctuation: Regex::new(NON_PERMITTED_PUNCTUATION_PATTERN)?,
            re_consecutive: Regex::new(&format!("{all}{all}"))?,
            re_gloss_consecutive: Regex::new(&format!("{openers_and_linear}{all}"))?,
            re_disconnected: Regex::new(&format!(r"{all}(\s|$)"))?,
            re_gloss_disconnected: Regex::new(&format!(r"{openers_and_linear}(\s|$)"))?,
        })
    }

    /// Validate a whole corpus.
    ///
    /// # Errors
    ///
    /// [`crate::IgtError::InconsistentLineCount`] if the examples do not all
    /// have the same number of lines.
    pub fn validate(&self, examples: &[Example], layout: &LineLayout) -> Result<ValidationReport> {
        check_shape(examples, layout)?;
        let mut report = ValidationReport::default();
        for example in examples {
            report += self.validate_example(example, layout);
        }
        info!(examples = report.examples, problems = report.total(), "prescreen finished");
        Ok(report)
    }

    /// Run every check on one example.
    pub fn validate_example(&self, example: &Example, layout: &LineLayout) -> ValidationReport {
        let mut report = ValidationReport {
            examples: 1,
            ..Default::default()
        };

        for line in &example.lines {
            if line.contains('\t') {
                debug!(line = %line, "tab character");
                report.tabs += 1;
            }
            if line.contains("  ") {
                debug!(line = %line, "consecutive spaces");
                report.multiple_spaces += 1;
            }
        }

        let trans = example.line(layout.transcription);
        let seg = example.line(layout.segmentation);
        let gloss = example.line(layout.gloss);

        self.check_transcription(trans, seg, &mut report);
        self.check_segmentation(seg, &mut report);
        self.check_gloss(gloss, &mut report);
        self.check_seg_gloss(seg, gloss, &mut report);

        report
    }

    fn check_transcription(&self, trans: &str, seg: &str, report: &mut ValidationReport) {
        if trans.split_whitespace().count() != seg.split_whitespace().count() {
            debug!(trans, seg, "transcription/segmentation word count mismatch");
            report.transcription_seg_words += 1;
        }
        if self.re_punctuation.is_match(trans) || trans.contains(Boundary::Clitic.as_char()) {
            debug!(trans, "non-permitted punctuation in transcription");
            report.transcription_punctuation += 1;
        }
    }

    fn check_segmentation(&self, seg: &str, report: &mut ValidationReport) {
        if self.re_consecutive.is_match(seg) {
            debug!(seg, "consecutive boundaries");
            report.seg_consecutive_boundaries += 1;
        }
        if self.re_disconnected.is_match(seg) {
            debug!(seg, "disconnected boundary");
            report.seg_disconnected_boundary += 1;
        }
        for opener in [Boundary::InfixOpen, Boundary::RedupInfixOpen] {
            if !infix_pairs_match(seg, opener) {
                debug!(seg, %opener, "unpaired infix boundary");
                report.seg_infix_mismatch += 1;
            }
            if !infix_placement_ok(seg, opener, false) {
                debug!(seg, %opener, "misplaced infix boundary");
                report.seg_infix_misplacement += 1;
            }
        }
        if self.re_punctuation.is_match(seg) {
            debug!(seg, "non-permitted punctuation in segmentation");
            report.seg_punctuation += 1;
        }
    }

    fn check_gloss(&self, gloss: &str, report: &mut ValidationReport) {
        if self.re_gloss_consecutive.is_match(gloss) {
            debug!(gloss, "consecutive boundaries");
            report.gloss_consecutive_boundaries += 1;
        }
        if self.re_gloss_disconnected.is_match(gloss) {
            debug!(gloss, "disconnected boundary");
            report.gloss_disconnected_boundary += 1;
        }
        for opener in [Boundary::InfixOpen, Boundary::RedupInfixOpen] {
            if !infix_pairs_match(gloss, opener) {
                debug!(gloss, %opener, "unpaired infix boundary");
                report.gloss_infix_mismatch += 1;
            }
            if !infix_placement_ok(gloss, opener, true) {
                debug!(gloss, %opener, "misplaced infix boundary");
                report.gloss_infix_misplacement += 1;
            }
        }
    }

    fn check_seg_gloss(&self, seg: &str, gloss: &str, report: &mut ValidationReport) {
        let seg_words: Vec<&str> = seg.split_whitespace().collect();
        let gloss_words: Vec<&str> = gloss.split_whitespace().collect();
        if seg_words.len() != gloss_words.len() {
            debug!(seg, gloss, "segmentation/gloss word count mismatch");
            report.seg_gloss_words += 1;
        }

        let seg_morphemes = self.tokenizer.segment_line(seg);
        let gloss_morphemes = self.tokenizer.gloss_line(gloss);
        let seg_total: usize = seg_morphemes.iter().map(Vec::len).sum();
        let gloss_total: usize = gloss_morphemes.iter().map(Vec::len).sum();
        if seg_total != gloss_total {
            debug!(seg, gloss, seg_total, gloss_total, "morpheme count mismatch");
            report.seg_gloss_morphemes += 1;
        }

        for (s, g) in seg_morphemes.iter().zip(&gloss_morphemes) {
            if s.len() != g.len() {
                debug!(seg_word = ?s, gloss_word = ?g, "word morpheme count mismatch");
                report.seg_gloss_word_morphemes += 1;
            }
        }

        for (s, g) in seg_words.iter().zip(&gloss_words) {
            let differing = boundary::boundaries_in(s)
                .into_iter()
                .zip(boundary::boundaries_in(g))
                .filter(|(a, b)| a != b)
                .count();
            if differing > 0 {
                debug!(seg_word = s, gloss_word = g, differing, "boundary type mismatch");
                report.seg_gloss_boundary_types += differing;
            }
        }
    }

    /// Whether an example's segmentation and gloss line up word by word and
    /// morpheme by morpheme.
    pub fn seg_and_gloss_aligned(&self, example: &Example, layout: &LineLayout) -> bool {
        let seg = self.tokenizer.segment_line(example.line(layout.segmentation));
        let gloss = self.tokenizer.gloss_line(example.line(layout.gloss));
        seg.len() == gloss.len() && seg.iter().zip(&gloss).all(|(s, g)| s.len() == g.len())
    }

    /// Drop misaligned examples. Returns the kept examples and how many were
    /// removed.
    pub fn filter_misaligned(
        &self,
        examples: &[Example],
        layout: &LineLayout,
        filter: AlignmentFilter,
    ) -> (Vec<Example>, usize) {
        let kept: Vec<Example> = examples
            .iter()
            .filter(|example| {
                let seg_gloss = self.seg_and_gloss_aligned(example, layout);
                let ortho_seg = example.line(layout.transcription).split_whitespace().count()
                    == example.line(layout.segmentation).split_whitespace().count();
                match filter {
                    AlignmentFilter::SegGloss => seg_gloss,
                    AlignmentFilter::OrthoSeg => ortho_seg,
                    AlignmentFilter::Both => seg_gloss && ortho_seg,
                }
            })
            .cloned()
            .collect();
        let removed = examples.len() - kept.len();
        info!(kept = kept.len(), removed, ?filter, "filtered misaligned examples");
        (kept, removed)
    }
}

/// Every opener must be directly followed by its closer in the word's
/// boundary list, and every closer directly preceded by its opener.
fn infix_pairs_match(line: &str, opener: Boundary) -> bool {
    let Some(closer) = opener.closer() else {
        return true;
    };
    line.split_whitespace().all(|word| {
        let boundaries = boundary::boundaries_in(word);
        boundaries.iter().enumerate().all(|(i, b)| {
            if *b == opener {
                boundaries.get(i + 1) == Some(&closer)
            } else if *b == closer {
                i > 0 && boundaries[i - 1] == opener
            } else {
                true
            }
        })
    })
}

/// The opener must follow a morpheme. In gloss lines the closer must also
/// end the word or be followed by another boundary.
fn infix_placement_ok(line: &str, opener: Boundary, is_gloss: bool) -> bool {
    let Some(closer) = opener.closer() else {
        return true;
    };
    line.split_whitespace().all(|word| {
        let chars: Vec<char> = word.chars().collect();
        chars.iter().enumerate().all(|(i, &c)| {
            if c == opener.as_char() {
                i > 0 && !boundary::is_boundary(chars[i - 1])
            } else if is_gloss && c == closer.as_char() {
                chars.get(i + 1).is_none_or(|&next| boundary::is_boundary(next))
            } else {
                true
            }
        })
    })
}
