use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{IgtError, Result};

/// One IGT record: transcription, segmentation, gloss and translation lines
/// (or whatever layout the corpus uses).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Example {
    /// Lines of the record, in file order.
    pub lines: Vec<String>,
}

impl Example {
    /// Creates an example from its lines.
    #[must_use]
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of lines in the record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if the record has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line at `index`, or an empty string if it does not exist.
    #[must_use]
    pub fn line(&self, index: usize) -> &str {
        self.lines.get(index).map(String::as_str).unwrap_or("")
    }

    /// Replace the line at `index`. Out-of-range indices are ignored.
    pub fn set_line(&mut self, index: usize, line: impl Into<String>) {
        if let Some(slot) = self.lines.get_mut(index) {
            *slot = line.into();
        }
    }
}

impl fmt::Display for Example {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

/// Which line of a record holds which tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineLayout {
    /// Zero-based index of the orthographic transcription.
    pub transcription: usize,
    /// Zero-based index of the morphological segmentation.
    pub segmentation: usize,
    /// Zero-based index of the gloss.
    pub gloss: usize,
}

impl Default for LineLayout {
    fn default() -> Self {
        Self {
            transcription: 0,
            segmentation: 1,
            gloss: 2,
        }
    }
}

impl LineLayout {
    /// Build a layout from the 1-based line numbers used on the command line.
    ///
    /// Zero is treated as line 1.
    pub fn from_line_numbers(segmentation: usize, gloss: usize) -> Self {
        Self {
            transcription: 0,
            segmentation: segmentation.saturating_sub(1),
            gloss: gloss.saturating_sub(1),
        }
    }

    fn max_index(&self) -> usize {
        self.transcription.max(self.segmentation).max(self.gloss)
    }
}

/// Check that every example has as many lines as the first one and that the
/// layout fits inside them.
///
/// Returns the shared line count (zero for an empty corpus).
///
/// # Errors
///
/// [`IgtError::InconsistentLineCount`] for the first example that differs,
/// [`IgtError::LineIndexOutOfRange`] if the layout points past the last line.
pub fn check_shape(examples: &[Example], layout: &LineLayout) -> Result<usize> {
    let Some(first) = examples.first() else {
        return Ok(0);
    };
    let expected = first.len();

    for (idx, example) in examples.iter().enumerate() {
        if example.len() != expected {
            return Err(IgtError::InconsistentLineCount {
                example: idx,
                expected,
                found: example.len(),
            });
        }
    }

    if layout.max_index() >= expected {
        return Err(IgtError::LineIndexOutOfRange {
            index: layout.max_index(),
            lines: expected,
        });
    }

    Ok(expected)
}
