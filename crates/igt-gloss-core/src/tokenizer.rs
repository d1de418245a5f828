//! # Morpheme Tokenizer
//!
//! Splits boundary-marked segmentation and gloss lines into morphemes,
//! either flat or nested by word.
//!
//! Non-infixing boundaries (`-`, `~`, `=`) split a word linearly. A
//! candidate that still contains an infix (`a<b>c` or `a{b}c`) is replaced
//! by the rejoined base `ac` followed by the infix `b`, which is the order
//! in which infixes are conventionally glossed (`stem-CRED`).

use crate::boundary::{self, Boundary};
use crate::error::{IgtError, Result};

/// Tokenizer for segmentation and gloss lines.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    strip_brackets: bool,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self {
            strip_brackets: true,
        }
    }
}

impl Tokenizer {
    /// Create a tokenizer that strips `[` `]` before splitting.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep or strip brackets before splitting segmentation lines.
    pub fn with_bracket_stripping(mut self, strip: bool) -> Self {
        self.strip_brackets = strip;
        self
    }

    /// Split one segmentation word into morphemes.
    ///
    /// # Examples
    /// ```
    /// use igt_gloss_core::tokenizer::Tokenizer;
    ///
    /// let tokenizer = Tokenizer::new();
    /// assert_eq!(tokenizer.segment_word("pú<p>en'-s"), vec!["púen'", "p", "s"]);
    /// ```
    pub fn segment_word(&self, word: &str) -> Vec<String> {
        let word = if self.strip_brackets {
            boundary::ignore_brackets(word)
        } else {
            word.to_string()
        };

        let mut morphemes = Vec::new();
        for candidate in word.split(|c: char| Boundary::from_char(c).is_some_and(|b| b.is_non_infixing())) {
            let (base, infixes) = extract_infixes(candidate);
            morphemes.push(base);
            morphemes.extend(infixes);
        }

        morphemes.retain(|m| !m.is_empty());
        morphemes
    }

    /// Split a segmentation line into words of morphemes.
    ///
    /// Words that contain no morphemes are dropped.
    pub fn segment_line(&self, line: &str) -> Vec<Vec<String>> {
        line.split_whitespace()
            .map(|word| self.segment_word(word))
            .filter(|word| !word.is_empty())
            .collect()
    }

    /// Split a segmentation line into a flat morpheme list.
    pub fn segment_line_flat(&self, line: &str) -> Vec<String> {
        self.segment_line(line).into_iter().flatten().collect()
    }

    /// Split one gloss word into glosses.
    ///
    /// Infix openers become regular boundaries and closers disappear, so
    /// `light<INCH>-1PL` glosses as `light`, `INCH`, `1PL`.
    pub fn gloss_word(&self, word: &str) -> Vec<String> {
        let flattened: String = boundary::ignore_brackets(word)
            .chars()
            .filter_map(|c| match Boundary::from_char(c) {
                Some(b) if b.is_infix_opener() => Some('-'),
                Some(b) if b.is_infix_closer() => None,
                _ => Some(c),
            })
            .collect();

        flattened
            .split(|c: char| Boundary::from_char(c).is_some_and(|b| b.is_non_infixing()))
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Split a gloss line into words of glosses.
    pub fn gloss_line(&self, line: &str) -> Vec<Vec<String>> {
        line.split_whitespace()
            .map(|word| self.gloss_word(word))
            .filter(|word| !word.is_empty())
            .collect()
    }

    /// Split a gloss line into a flat gloss list.
    pub fn gloss_line_flat(&self, line: &str) -> Vec<String> {
        self.gloss_line(line).into_iter().flatten().collect()
    }
}

/// Pull every infix out of a candidate that has no linear boundaries left.
///
/// Returns the rejoined base and the infixes in order of appearance. An
/// opener without a closer takes the rest of the candidate as its infix.
fn extract_infixes(candidate: &str) -> (String, Vec<String>) {
    let mut base = candidate.to_string();
    let mut infixes = Vec::new();

    while let Some((open_idx, opener)) = base
        .char_indices()
        .find_map(|(i, c)| Boundary::from_char(c).filter(|b| b.is_infix_opener()).map(|b| (i, b)))
    {
        let Some(closer) = opener.closer() else {
            break;
        };
        let prefix = &base[..open_idx];
        let rest = &base[open_idx + opener.as_char().len_utf8()..];
        let (infix, suffix) = match rest.find(closer.as_char()) {
            Some(close_idx) => (&rest[..close_idx], &rest[close_idx + closer.as_char().len_utf8()..]),
            None => (rest, ""),
        };
        infixes.push(infix.to_string());
        base = format!("{prefix}{suffix}");
    }

    (base, infixes)
}

/// Rebuild a word from its morphemes and the boundary sequence of a
/// reference word.
///
/// Infix closers are emitted straight after the morpheme that follows their
/// opener.
///
/// # Errors
///
/// Returns [`IgtError::LengthMismatch`] when the number of morpheme-starting
/// boundaries is not one less than the number of morphemes, or when some
/// boundaries are left over.
///
/// # Examples
/// ```
/// use igt_gloss_core::boundary::boundaries_in;
/// use igt_gloss_core::tokenizer::rejoin_word;
///
/// let glosses = vec!["get.found".to_string(), "CRED".to_string(), "DIR".to_string()];
/// let word = rejoin_word(&glosses, &boundaries_in("pú<p>en'-s")).unwrap();
/// assert_eq!(word, "get.found<CRED>-DIR");
/// ```
pub fn rejoin_word(morphemes: &[String], boundaries: &[Boundary]) -> Result<String> {
    let starters = boundaries.iter().filter(|b| b.starts_morpheme()).count();
    if morphemes.is_empty() || starters != morphemes.len() - 1 {
        return Err(IgtError::length_mismatch(
            "morphemes vs word boundaries",
            starters + 1,
            morphemes.len(),
        ));
    }

    let mut word = morphemes[0].clone();
    let mut boundary_idx = 0;
    for morpheme in &morphemes[1..] {
        word.push(boundaries[boundary_idx].as_char());
        boundary_idx += 1;
        word.push_str(morpheme);
        if let Some(next) = boundaries.get(boundary_idx) {
            if next.is_infix_closer() {
                word.push(next.as_char());
                boundary_idx += 1;
            }
        }
    }

    if boundary_idx != boundaries.len() {
        return Err(IgtError::length_mismatch(
            "consumed word boundaries",
            boundaries.len(),
            boundary_idx,
        ));
    }

    Ok(word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{boundaries_in, morpheme_count};
    use proptest::prelude::*;

    fn tokenizer() -> Tokenizer {
        Tokenizer::new()
    }

    #[test]
    fn test_segment_basic() {
        assert_eq!(
            tokenizer().segment_line("kʷukʷ-s-cút-s wá7=lhkan"),
            vec![vec!["kʷukʷ", "s", "cút", "s"], vec!["wá7", "lhkan"]]
        );
    }

    #[test]
    fn test_segment_infix() {
        assert_eq!(tokenizer().segment_word("pú<p>en'"), vec!["púen'", "p"]);
        assert_eq!(tokenizer().segment_word("q{ʷ}al~qʷal"), vec!["qal", "ʷ", "qʷal"]);
    }

    #[test]
    fn test_segment_multiple_infixes() {
        assert_eq!(tokenizer().segment_word("a<b>c<d>e"), vec!["ace", "b", "d"]);
    }

    #[test]
    fn test_segment_drops_empty() {
        assert_eq!(tokenizer().segment_word("a--b"), vec!["a", "b"]);
        assert!(tokenizer().segment_line("- =").is_empty());
    }

    #[test]
    fn test_segment_brackets() {
        assert_eq!(
            tokenizer().segment_word("náq̓ʷ-m[in][-t]-s"),
            vec!["náq̓ʷ", "min", "t", "s"]
        );
        let keep = Tokenizer::new().with_bracket_stripping(false);
        assert_eq!(keep.segment_word("m[in]"), vec!["m[in]"]);
    }

    #[test]
    fn test_gloss_tokenization() {
        assert_eq!(
            tokenizer().gloss_line("light<INCH>-1PL DET=man"),
            vec![vec!["light", "INCH", "1PL"], vec!["DET", "man"]]
        );
        assert_eq!(
            tokenizer().gloss_line_flat("get.found{CRED}-DIR"),
            vec!["get.found", "CRED", "DIR"]
        );
    }

    #[test]
    fn test_flat_matches_nested() {
        let line = "wá7=lhkan pú<p>en'-s";
        let nested: Vec<String> = tokenizer().segment_line(line).concat();
        assert_eq!(nested, tokenizer().segment_line_flat(line));
    }

    #[test]
    fn test_rejoin_linear() {
        let morphemes: Vec<String> = ["kʷukʷ", "s", "cút", "s"].map(String::from).to_vec();
        let word = rejoin_word(&morphemes, &boundaries_in("kʷukʷ-s=cút~s")).unwrap();
        assert_eq!(word, "kʷukʷ-s=cút~s");
    }

    #[test]
    fn test_rejoin_count_mismatch() {
        let morphemes: Vec<String> = vec!["a".into(), "b".into()];
        assert!(rejoin_word(&morphemes, &boundaries_in("a-b-c")).is_err());
        assert!(rejoin_word(&[], &[]).is_err());
    }

    #[test]
    fn test_retokenize_is_idempotent() {
        let t = tokenizer();
        let first = t.segment_line("wá7=lhkan kʷukʷ-s-cút-s");
        let rejoined: Vec<String> = first.iter().map(|w| w.join("-")).collect();
        let second = t.segment_line(&rejoined.join(" "));
        assert_eq!(first, second);
    }

    #[test]
    fn morpheme_count_law() {
        proptest!(|(pieces in prop::collection::vec("[a-z]{1,4}", 1..6),
                    seps in prop::collection::vec(prop::sample::select(vec!['-', '=', '~']), 5),
                    infix in prop::option::of(("[a-z]{1,3}", prop::bool::ANY)))| {
            let mut word = pieces[0].clone();
            for (piece, sep) in pieces[1..].iter().zip(&seps) {
                word.push(*sep);
                word.push_str(piece);
            }
            let mut infix_pairs = 0;
            if let Some((infix, redup)) = infix {
                let (open, close) = if redup { ('{', '}') } else { ('<', '>') };
                let first: String = word.chars().take(1).collect();
                let rest: String = word.chars().skip(1).collect();
                word = format!("{first}{open}{infix}{close}{rest}");
                infix_pairs = 1;
            }
            let linear = pieces.len() - 1;
            let tokens = Tokenizer::new().segment_word(&word);
            prop_assert_eq!(tokens.len(), 1 + linear + infix_pairs);
            prop_assert_eq!(tokens.len(), morpheme_count(&word));
        });
    }

    #[test]
    fn rejoin_without_infix_is_identity() {
        proptest!(|(pieces in prop::collection::vec("[a-zʷ]{1,4}", 1..6),
                    seps in prop::collection::vec(prop::sample::select(vec!['-', '=', '~']), 5))| {
            let mut word = pieces[0].clone();
            for (piece, sep) in pieces[1..].iter().zip(&seps) {
                word.push(*sep);
                word.push_str(piece);
            }
            let morphemes = Tokenizer::new().segment_word(&word);
            let rejoined = rejoin_word(&morphemes, &boundaries_in(&word)).unwrap();
            prop_assert_eq!(rejoined, word);
        });
    }
}
