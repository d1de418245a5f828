//! # Boundary Taxonomy
//!
//! The closed set of morpheme boundary markers shared by segmentation and
//! gloss lines, plus the line-level helpers every other stage builds on.
//!
//! | Marker | Meaning |
//! |---|---|
//! | `-` | regular (affixal) boundary |
//! | `=` | clitic boundary |
//! | `~` | linear reduplication boundary |
//! | `<` `>` | plain infix open/close |
//! | `{` `}` | reduplicating infix open/close |
//!
//! Brackets (`[` `]`) are not boundaries: they mark spans that are not
//! realized on the surface and are stripped before tokenizing.

use std::fmt;

/// Opening bracket for an unrealized span.
pub const LEFT_BRACKET: char = '[';
/// Closing bracket for an unrealized span.
pub const RIGHT_BRACKET: char = ']';

/// A morpheme boundary marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// `-`
    Regular,
    /// `=`
    Clitic,
    /// `~`
    Reduplication,
    /// `<`
    InfixOpen,
    /// `>`
    InfixClose,
    /// `{`
    RedupInfixOpen,
    /// `}`
    RedupInfixClose,
}

impl Boundary {
    /// Every boundary, in marker order.
    pub const ALL: [Boundary; 7] = [
        Boundary::Regular,
        Boundary::Clitic,
        Boundary::Reduplication,
        Boundary::InfixOpen,
        Boundary::InfixClose,
        Boundary::RedupInfixOpen,
        Boundary::RedupInfixClose,
    ];

    /// Boundaries that split a word linearly.
    pub const NON_INFIXING: [Boundary; 3] =
        [Boundary::Regular, Boundary::Reduplication, Boundary::Clitic];

    /// Parse a marker character.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '-' => Some(Boundary::Regular),
            '=' => Some(Boundary::Clitic),
            '~' => Some(Boundary::Reduplication),
            '<' => Some(Boundary::InfixOpen),
            '>' => Some(Boundary::InfixClose),
            '{' => Some(Boundary::RedupInfixOpen),
            '}' => Some(Boundary::RedupInfixClose),
            _ => None,
        }
    }

    /// The marker character.
    pub fn as_char(&self) -> char {
        match self {
            Boundary::Regular => '-',
            Boundary::Clitic => '=',
            Boundary::Reduplication => '~',
            Boundary::InfixOpen => '<',
            Boundary::InfixClose => '>',
            Boundary::RedupInfixOpen => '{',
            Boundary::RedupInfixClose => '}',
        }
    }

    /// `<` or `{`.
    pub fn is_infix_opener(&self) -> bool {
        matches!(self, Boundary::InfixOpen | Boundary::RedupInfixOpen)
    }

    /// `>` or `}`.
    pub fn is_infix_closer(&self) -> bool {
        matches!(self, Boundary::InfixClose | Boundary::RedupInfixClose)
    }

    /// `-`, `~` or `=`.
    pub fn is_non_infixing(&self) -> bool {
        matches!(
            self,
            Boundary::Regular | Boundary::Reduplication | Boundary::Clitic
        )
    }

    /// The closer matching this opener, if it is one.
    pub fn closer(&self) -> Option<Boundary> {
        match self {
            Boundary::InfixOpen => Some(Boundary::InfixClose),
            Boundary::RedupInfixOpen => Some(Boundary::RedupInfixClose),
            _ => None,
        }
    }

    /// Whether this boundary introduces a new morpheme.
    ///
    /// Closers only terminate an infix, so an infix pair contributes one
    /// morpheme rather than two.
    pub fn starts_morpheme(&self) -> bool {
        !self.is_infix_closer()
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Check whether a character is a boundary marker.
pub fn is_boundary(c: char) -> bool {
    Boundary::from_char(c).is_some()
}

/// Boundaries of a word in order of appearance.
pub fn boundaries_in(word: &str) -> Vec<Boundary> {
    word.chars().filter_map(Boundary::from_char).collect()
}

/// Number of morphemes in a word: one plus every boundary that starts a morpheme.
///
/// # Examples
/// ```
/// use igt_gloss_core::boundary::morpheme_count;
///
/// assert_eq!(morpheme_count("kʷukʷ-s-cút-s"), 4);
/// assert_eq!(morpheme_count("pú<p>en'"), 2);
/// ```
pub fn morpheme_count(word: &str) -> usize {
    1 + boundaries_in(word)
        .iter()
        .filter(|b| b.starts_morpheme())
        .count()
}

/// Remove the bracket characters but keep the bracketed material.
pub fn ignore_brackets(line: &str) -> String {
    line.chars()
        .filter(|&c| c != LEFT_BRACKET && c != RIGHT_BRACKET)
        .collect()
}

/// Remove every closed bracketed span together with its contents.
///
/// An unmatched `[` is left in place.
pub fn drop_bracketed(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(open) = rest.find(LEFT_BRACKET) {
        let after = &rest[open + LEFT_BRACKET.len_utf8()..];
        match after.find(RIGHT_BRACKET) {
            Some(close) => {
                out.push_str(&rest[..open]);
                rest = &after[close + RIGHT_BRACKET.len_utf8()..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Rewrite every boundary marker as `-`.
pub fn canonicalize_boundaries(line: &str) -> String {
    line.chars()
        .map(|c| if is_boundary(c) { '-' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_roundtrip() {
        for b in Boundary::ALL {
            assert_eq!(Boundary::from_char(b.as_char()), Some(b));
        }
        assert_eq!(Boundary::from_char('a'), None);
        assert_eq!(Boundary::from_char('['), None);
    }

    #[test]
    fn opener_closer_pairs() {
        assert_eq!(Boundary::InfixOpen.closer(), Some(Boundary::InfixClose));
        assert_eq!(
            Boundary::RedupInfixOpen.closer(),
            Some(Boundary::RedupInfixClose)
        );
        assert_eq!(Boundary::Regular.closer(), None);
        assert!(Boundary::InfixClose.is_infix_closer());
        assert!(!Boundary::InfixClose.starts_morpheme());
        assert!(Boundary::Clitic.is_non_infixing());
    }

    #[test]
    fn test_morpheme_count() {
        assert_eq!(morpheme_count("dog"), 1);
        assert_eq!(morpheme_count("dog-s"), 2);
        assert_eq!(morpheme_count("wá7=lhkan"), 2);
        assert_eq!(morpheme_count("pú<p>en'-s"), 3);
        assert_eq!(morpheme_count("q{ʷ}al~qʷal"), 3);
    }

    #[test]
    fn test_boundaries_in() {
        assert_eq!(
            boundaries_in("a<b>c-d=e"),
            vec![
                Boundary::InfixOpen,
                Boundary::InfixClose,
                Boundary::Regular,
                Boundary::Clitic
            ]
        );
    }

    #[test]
    fn test_ignore_brackets() {
        assert_eq!(ignore_brackets("náq̓ʷ-m[in][-t]-s"), "náq̓ʷ-min-t-s");
    }

    #[test]
    fn test_drop_bracketed() {
        assert_eq!(drop_bracketed("go-[INVIS] DET"), "go- DET");
        assert_eq!(drop_bracketed("[a][b]c"), "c");
        assert_eq!(drop_bracketed("open[only"), "open[only");
    }

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize_boundaries("a=b~c<d>e"), "a-b-c-d-e");
    }

    #[test]
    fn display_uses_marker() {
        assert_eq!(Boundary::RedupInfixOpen.to_string(), "{");
    }
}
