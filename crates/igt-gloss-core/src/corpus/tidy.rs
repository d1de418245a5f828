use regex::Regex;

use super::example::{Example, LineLayout};
use crate::error::Result;

/// Punctuation stripped from transcription and segmentation lines.
///
/// A single `:` counts, `::` does not (it marks vowel length in some
/// orthographies).
pub const NON_PERMITTED_PUNCTUATION: &[&str] =
    &[".", ",", "?", "\"", "“", "”", "!", "♪", ":", ";", "–"];

pub(crate) const NON_PERMITTED_PUNCTUATION_PATTERN: &str = r#"[.,?"“”!♪;–]|([^:]):([^:])"#;

/// Normalizes whitespace and punctuation before any boundary work.
pub struct Tidier {
    re_punctuation: Regex,
    re_spaces: Regex,
}

impl Tidier {
    /// Constructs a `Tidier` with pre-compiled patterns.
    ///
    /// # Errors
    ///
    /// Returns `IgtError::RegexError` if a pattern fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_punctuation: Regex::new(NON_PERMITTED_PUNCTUATION_PATTERN)?,
            re_spaces: Regex::new(r" {2,}")?,
        })
    }

    /// Remove non-permitted punctuation, keeping the characters around a
    /// single colon.
    pub fn strip_punctuation(&self, line: &str) -> String {
        self.re_punctuation.replace_all(line, "$1$2").into_owned()
    }

    /// Collapse runs of spaces and trim.
    pub fn collapse_spaces(&self, line: &str) -> String {
        self.re_spaces.replace_all(line, " ").trim().to_string()
    }

    /// Tidy one example: punctuation on the transcription and segmentation
    /// lines, whitespace everywhere.
    pub fn tidy(&self, example: &Example, layout: &LineLayout) -> Example {
        let lines = example
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                if i == layout.transcription || i == layout.segmentation {
                    self.collapse_spaces(&self.strip_punctuation(line))
                } else {
                    self.collapse_spaces(line)
                }
            })
            .collect::<Vec<_>>();
        Example::new(lines)
    }
}

/// Tidy a whole corpus.
pub fn tidy_examples(examples: &[Example], layout: &LineLayout) -> Result<Vec<Example>> {
    let tidier = Tidier::new()?;
    Ok(examples.iter().map(|e| tidier.tidy(e, layout)).collect())
}
