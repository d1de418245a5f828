//! Out-of-language (OOL) words.
//!
//! A word prefixed with [`OOL_MARKER`] is carried through every transform
//! untouched, kept out of features and scoring, and restored at output time.

use super::example::{Example, LineLayout};

/// Prefix marking an out-of-language word.
pub const OOL_MARKER: char = '*';
/// Generic label that can stand in for an OOL word.
pub const OOL_LABEL: &str = "OOL";

/// What to do with OOL words when preparing data for tagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OolMode {
    /// Drop the word.
    #[default]
    Remove,
    /// Replace the word with [`OOL_LABEL`].
    Replace,
}

/// Whether a word is marked OOL or is the OOL label itself.
pub fn is_ool_word(word: &str) -> bool {
    word.starts_with(OOL_MARKER) || word == OOL_LABEL
}

fn collapse_markers(word: &str) -> String {
    let rest = word.trim_start_matches(OOL_MARKER);
    if rest.len() == word.len() {
        word.to_string()
    } else {
        format!("{OOL_MARKER}{rest}")
    }
}

/// Mark listed words as OOL in the transcription, segmentation and gloss lines.
///
/// A word is only marked when it appears verbatim at the same position in all
/// three lines. Examples whose line count differs from `lines_per_example`
/// are left alone.
pub fn mark_ool_words(
    examples: &[Example],
    words: &[&str],
    layout: &LineLayout,
    lines_per_example: usize,
) -> Vec<Example> {
    examples
        .iter()
        .map(|example| {
            if example.len() != lines_per_example {
                return example.clone();
            }

            let split = |i: usize| -> Vec<String> {
                example.line(i).split_whitespace().map(str::to_string).collect()
            };
            let mut trans = split(layout.transcription);
            let mut seg = split(layout.segmentation);
            let mut gloss = split(layout.gloss);

            let shared = trans.len().min(seg.len()).min(gloss.len());
            for i in 0..shared {
                let word = trans[i].clone();
                if words.contains(&word.as_str()) && seg[i] == word && gloss[i] == word {
                    let marked = format!("{OOL_MARKER}{word}");
                    trans[i] = marked.clone();
                    seg[i] = marked.clone();
                    gloss[i] = marked;
                }
            }

            let mut out = example.clone();
            for (idx, line) in [
                (layout.transcription, trans),
                (layout.segmentation, seg),
                (layout.gloss, gloss),
            ] {
                let line: Vec<String> = line.iter().map(|w| collapse_markers(w)).collect();
                out.set_line(idx, line.join(" "));
            }
            out
        })
        .collect()
}

/// Remove or replace OOL words on every line of every example.
pub fn handle_ool_words(examples: &[Example], mode: OolMode) -> Vec<Example> {
    examples
        .iter()
        .map(|example| Example::new(example.lines.iter().map(|line| handle_ool_line(line, mode))))
        .collect()
}

/// Remove or replace OOL words in a single line.
pub fn handle_ool_line(line: &str, mode: OolMode) -> String {
    line.split_whitespace()
        .filter_map(|word| match (is_ool_word(word), mode) {
            (false, _) => Some(word),
            (true, OolMode::Remove) => None,
            (true, OolMode::Replace) => Some(OOL_LABEL),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Re-insert OOL words at their transcription positions and drop any
/// [`OOL_LABEL`] left in the prediction.
pub fn add_back_ool_words(transcription: &str, predicted: &[String]) -> Vec<String> {
    let mut words: Vec<String> = predicted.to_vec();
    for (idx, word) in transcription.split_whitespace().enumerate() {
        if word.starts_with(OOL_MARKER) {
            let at = idx.min(words.len());
            words.insert(at, word.to_string());
        }
    }
    words.retain(|w| w != OOL_LABEL);
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(lines: &[&str]) -> Example {
        Example::new(lines.iter().copied())
    }

    #[test]
    fn test_is_ool_word() {
        assert!(is_ool_word("*Mary"));
        assert!(is_ool_word("OOL"));
        assert!(!is_ool_word("Mary"));
    }

    #[test]
    fn test_mark_ool_words() {
        let data = vec![example(&["Mary wá7", "Mary wá7", "Mary be", "Mary is here"])];
        let marked = mark_ool_words(&data, &["Mary"], &LineLayout::default(), 4);
        assert_eq!(marked[0].line(0), "*Mary wá7");
        assert_eq!(marked[0].line(1), "*Mary wá7");
        assert_eq!(marked[0].line(2), "*Mary be");
        assert_eq!(marked[0].line(3), "Mary is here");
    }

    #[test]
    fn test_mark_requires_identical_words() {
        let data = vec![example(&["Mary", "Mary", "NAME", "Mary"])];
        let marked = mark_ool_words(&data, &["Mary"], &LineLayout::default(), 4);
        assert_eq!(marked[0], data[0]);
    }

    #[test]
    fn test_mark_collapses_double_markers() {
        let data = vec![example(&["*Mary", "*Mary", "*Mary", "t"])];
        let marked = mark_ool_words(&data, &["*Mary"], &LineLayout::default(), 4);
        assert_eq!(marked[0].line(0), "*Mary");
    }

    #[test]
    fn test_mark_skips_wrong_shape() {
        let data = vec![example(&["Mary", "Mary", "Mary"])];
        let marked = mark_ool_words(&data, &["Mary"], &LineLayout::default(), 4);
        assert_eq!(marked[0].line(0), "Mary");
    }

    #[test]
    fn test_handle_ool_words() {
        let data = vec![example(&["*Mary wá7 OOL", "*Mary wá7"])];
        let removed = handle_ool_words(&data, OolMode::Remove);
        assert_eq!(removed[0].lines, vec!["wá7", "wá7"]);
        let replaced = handle_ool_words(&data, OolMode::Replace);
        assert_eq!(replaced[0].lines, vec!["OOL wá7 OOL", "OOL wá7"]);
    }

    #[test]
    fn test_add_back_ool_words() {
        let predicted = vec!["be".to_string(), "DET=man".to_string()];
        let restored = add_back_ool_words("wá7 *Mary ti=sqáycw", &predicted);
        assert_eq!(restored, vec!["be", "*Mary", "DET=man"]);

        let with_label = vec!["OOL".to_string(), "be".to_string()];
        assert_eq!(add_back_ool_words("*Mary wá7", &with_label), vec!["*Mary", "be"]);
    }
}
