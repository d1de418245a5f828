//! Reading and writing blank-line separated IGT corpora.

use std::fs;
use std::path::Path;

use tracing::debug;

use super::example::Example;
use crate::error::Result;

/// Parse a corpus from text.
///
/// Each example is a block of consecutive non-blank lines. Lines are trimmed,
/// runs of blank lines separate examples, and the final block is kept even
/// without a trailing blank line.
///
/// # Examples
/// ```
/// use igt_gloss_core::corpus::read_examples;
///
/// let examples = read_examples("a\nb\n\nc\nd\n\n\n");
/// assert_eq!(examples.len(), 2);
/// assert_eq!(examples[1].line(0), "c");
/// ```
pub fn read_examples(text: &str) -> Vec<Example> {
    let mut examples = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                examples.push(Example::new(std::mem::take(&mut current)));
            }
            continue;
        }
        current.push(line.to_string());
    }

    if !current.is_empty() {
        examples.push(Example::new(current));
    }

    examples
}

/// Read a corpus file.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<Example>> {
    let text = fs::read_to_string(path.as_ref())?;
    let examples = read_examples(&text);
    debug!(path = %path.as_ref().display(), examples = examples.len(), "read corpus");
    Ok(examples)
}

/// Render examples with one blank line between them and none after the last.
pub fn write_examples(examples: &[Example]) -> String {
    let mut out = String::new();
    for (i, example) in examples.iter().filter(|e| !e.is_empty()).enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for line in &example.lines {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// Write a corpus file.
pub fn write_file<P: AsRef<Path>>(path: P, examples: &[Example]) -> Result<()> {
    fs::write(path.as_ref(), write_examples(examples))?;
    debug!(path = %path.as_ref().display(), examples = examples.len(), "wrote corpus");
    Ok(())
}
