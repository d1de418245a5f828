//! # Clitic Promotion
//!
//! Clitics that are separate words in the orthographic line are often fused
//! with `=` in the segmentation and gloss lines. The promoter splits them
//! out so that all three lines agree on word count.
//!
//! Proclitics are matched positionally: the orthographic word at the same
//! index must be the clitic. Enclitics are matched anywhere in the
//! orthographic line. Both behaviors are kept distinct on purpose; enclitics
//! can drift away from their host in the orthography.

use std::collections::{BTreeMap, VecDeque};
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use unicode_normalization::UnicodeNormalization;

use crate::corpus::{Example, LineLayout};

const CLITIC: char = '=';
const COMBINING_ACUTE: char = '\u{301}';

/// Punctuation ignored when comparing clitics against the orthography.
const IGNORED_PUNCTUATION: [char; 5] = ['.', ',', '?', '!', ':'];

fn strip_ignored_punctuation(word: &str) -> String {
    word.chars()
        .filter(|c| !IGNORED_PUNCTUATION.contains(c))
        .collect()
}

fn unstress(form: &str) -> String {
    let mut out = String::with_capacity(form.len());
    let mut prev = None;
    for c in form.nfd() {
        if c == COMBINING_ACUTE && matches!(prev, Some('a' | 'u')) {
            continue;
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Compare two clitic forms, ignoring stress on `a` and `u`.
///
/// Stress is marked inconsistently between orthography and segmentation.
///
/// # Examples
/// ```
/// use igt_gloss_core::normalize::same_clitic;
///
/// assert!(same_clitic("wá7", "wa7"));
/// assert!(same_clitic("tú7", "tu\u{301}7"));
/// assert!(!same_clitic("kélh", "kelh"));
/// ```
pub fn same_clitic(a: &str, b: &str) -> bool {
    unstress(a) == unstress(b)
}

/// Known clitics, keyed by segmentation form, valued by orthographic form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliticTables {
    pub proclitics: BTreeMap<String, String>,
    /// Keys are `p1=p2`.
    pub compound_proclitics: BTreeMap<String, String>,
    pub enclitics: BTreeMap<String, String>,
    /// Keys are `e1=e2`.
    pub compound_enclitics: BTreeMap<String, String>,
}

impl CliticTables {
    /// Empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_proclitic(mut self, seg: impl Into<String>, ortho: impl Into<String>) -> Self {
        self.proclitics.insert(seg.into(), ortho.into());
        self
    }

    pub fn with_compound_proclitic(
        mut self,
        seg: impl Into<String>,
        ortho: impl Into<String>,
    ) -> Self {
        self.compound_proclitics.insert(seg.into(), ortho.into());
        self
    }

    pub fn with_enclitic(mut self, seg: impl Into<String>, ortho: impl Into<String>) -> Self {
        self.enclitics.insert(seg.into(), ortho.into());
        self
    }

    pub fn with_compound_enclitic(
        mut self,
        seg: impl Into<String>,
        ortho: impl Into<String>,
    ) -> Self {
        self.compound_enclitics.insert(seg.into(), ortho.into());
        self
    }

    /// The St̓át̓imcets clitic inventory.
    pub fn statimcets() -> Self {
        let mut tables = Self::new();

        for p in [
            "i", "ki", "ken", "ku", "kw", "kwa", "kwelh", "lhel", "na", "nelh", "ni", "ta", "ti",
            "wa7", "wi",
        ] {
            tables = tables.with_proclitic(p, p);
        }

        for (seg, ortho) in [
            ("e=ta", "éta"),
            ("e=ki", "éki"),
            ("ken=ki", "kénki"),
            ("ken=ku", "kenkú"),
            ("ken=ta", "kénta"),
            ("l=ki", "lki"),
            ("l=kwa", "lkwa"),
            ("l=na", "lna"),
            ("l=ta", "lta"),
            ("lhel=ki", "lhélki"),
            ("lhel=ku", "lhelkú"),
            ("lhel=ta", "lhélta"),
        ] {
            tables = tables.with_compound_proclitic(seg, ortho);
        }

        for e in [
            "cwílh", "hém'", "hem'", "iz'", "ká", "ka", "k'á", "k'a", "ku7", "kélh", "kelh",
            "malh", "ni7", "t'elh", "t'ú7", "t'u7", "ti7", "ts7a", "tú7", "tu7", "wi", "wi7",
        ] {
            tables = tables.with_enclitic(e, e);
        }
        tables = tables
            .with_enclitic("klh", "kelh")
            .with_enclitic("t'lh", "t'elh")
            .with_compound_enclitic("tú7=a", "tú7a")
            .with_compound_enclitic("t'ú7=a", "t'ú7a");

        tables
    }

    fn lookup_proclitic<'a>(
        table: &'a BTreeMap<String, String>,
        form: &str,
    ) -> Option<&'a str> {
        table
            .iter()
            .find(|(key, _)| same_clitic(key, form))
            .map(|(_, ortho)| ortho.as_str())
    }
}

/// Counts gathered while promoting clitics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionStats {
    pub proclitics: usize,
    pub enclitics: usize,
    /// Splits that matched the tables but could not be mirrored in the gloss.
    pub skipped: usize,
}

impl PromotionStats {
    pub fn promoted(&self) -> usize {
        self.proclitics + self.enclitics
    }
}

impl AddAssign for PromotionStats {
    fn add_assign(&mut self, rhs: Self) {
        self.proclitics += rhs.proclitics;
        self.enclitics += rhs.enclitics;
        self.skipped += rhs.skipped;
    }
}

/// Result of promoting one example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotedLines {
    pub segmentation: String,
    pub gloss: String,
    pub stats: PromotionStats,
}

#[derive(Debug)]
enum Pending {
    /// Still has to be checked for clitics.
    Word { seg: String, gloss: String },
    /// A clitic that has been split off; emitted as is.
    Settled { seg: String, gloss: String },
}

/// A candidate split: the clitic, the host left behind, and the clitic's
/// gloss and host gloss.
struct Split {
    clitic: String,
    host: String,
    clitic_gloss: String,
    host_gloss: String,
}

/// Splits clitics out of segmentation and gloss lines.
#[derive(Debug, Clone)]
pub struct CliticPromoter {
    tables: CliticTables,
}

impl Default for CliticPromoter {
    fn default() -> Self {
        Self::new(CliticTables::statimcets())
    }
}

impl CliticPromoter {
    pub fn new(tables: CliticTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &CliticTables {
        &self.tables
    }

    /// Promote clitics in one example.
    ///
    /// The orthographic line is only read. If the segmentation and gloss
    /// lines disagree on word count, both are returned unchanged and the
    /// example is counted as skipped.
    pub fn promote_line(&self, ortho: &str, seg: &str, gloss: &str) -> PromotedLines {
        let mut stats = PromotionStats::default();
        let ortho_words: Vec<String> = strip_ignored_punctuation(ortho)
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        let seg_words: Vec<&str> = seg.split_whitespace().collect();
        let gloss_words: Vec<&str> = gloss.split_whitespace().collect();

        if seg_words.len() != gloss_words.len() {
            warn!(
                seg_words = seg_words.len(),
                gloss_words = gloss_words.len(),
                "word count mismatch, clitics left in place"
            );
            stats.skipped += 1;
            return PromotedLines {
                segmentation: seg.to_string(),
                gloss: gloss.to_string(),
                stats,
            };
        }

        let mut queue: VecDeque<Pending> = seg_words
            .iter()
            .zip(&gloss_words)
            .map(|(s, g)| Pending::Word {
                seg: (*s).to_string(),
                gloss: (*g).to_string(),
            })
            .collect();
        let mut out: Vec<(String, String)> = Vec::with_capacity(queue.len());

        while let Some(pending) = queue.pop_front() {
            let (seg, gloss) = match pending {
                Pending::Settled { seg, gloss } => {
                    out.push((seg, gloss));
                    continue;
                }
                Pending::Word { seg, gloss } => (seg, gloss),
            };

            let position = out.len();
            if let Some(split) = self.split_proclitic(&seg, &gloss, &ortho_words, position, &mut stats) {
                debug!(clitic = %split.clitic, host = %split.host, "promoted proclitic");
                stats.proclitics += 1;
                out.push((split.clitic, split.clitic_gloss));
                queue.push_front(Pending::Word {
                    seg: split.host,
                    gloss: split.host_gloss,
                });
                continue;
            }

            if let Some(split) = self.split_enclitic(&seg, &gloss, &ortho_words, &mut stats) {
                debug!(clitic = %split.clitic, host = %split.host, "promoted enclitic");
                stats.enclitics += 1;
                queue.push_front(Pending::Settled {
                    seg: split.clitic,
                    gloss: split.clitic_gloss,
                });
                queue.push_front(Pending::Word {
                    seg: split.host,
                    gloss: split.host_gloss,
                });
                continue;
            }

            out.push((seg, gloss));
        }

        let (seg_out, gloss_out): (Vec<String>, Vec<String>) = out.into_iter().unzip();
        PromotedLines {
            segmentation: seg_out.join(" "),
            gloss: gloss_out.join(" "),
            stats,
        }
    }

    /// Promote clitics in every example.
    pub fn promote_examples(
        &self,
        examples: &[Example],
        layout: &LineLayout,
    ) -> (Vec<Example>, PromotionStats) {
        let mut total = PromotionStats::default();
        let promoted = examples
            .iter()
            .map(|example| {
                let result = self.promote_line(
                    example.line(layout.transcription),
                    example.line(layout.segmentation),
                    example.line(layout.gloss),
                );
                total += result.stats;
                let mut out = example.clone();
                out.set_line(layout.segmentation, result.segmentation);
                out.set_line(layout.gloss, result.gloss);
                out
            })
            .collect();

        info!(
            proclitics = total.proclitics,
            enclitics = total.enclitics,
            skipped = total.skipped,
            "clitic promotion finished"
        );
        (promoted, total)
    }

    fn split_proclitic(
        &self,
        seg: &str,
        gloss: &str,
        ortho_words: &[String],
        position: usize,
        stats: &mut PromotionStats,
    ) -> Option<Split> {
        let ortho_word = ortho_words.get(position)?;

        // single: p=rest
        if let Some((clitic, host)) = seg.split_once(CLITIC) {
            let matches = CliticTables::lookup_proclitic(&self.tables.proclitics, clitic)
                .is_some_and(|form| same_clitic(ortho_word, form));
            if matches && !host.is_empty() {
                return match gloss.split_once(CLITIC) {
                    Some((clitic_gloss, host_gloss)) => Some(Split {
                        clitic: clitic.to_string(),
                        host: host.to_string(),
                        clitic_gloss: clitic_gloss.to_string(),
                        host_gloss: host_gloss.to_string(),
                    }),
                    None => {
                        stats.skipped += 1;
                        warn!(seg, gloss, "gloss cannot mirror proclitic split");
                        None
                    }
                };
            }
        }

        // compound: p1=p2=rest
        let (clitic, host) = split_at_nth(seg, 2)?;
        let matches = CliticTables::lookup_proclitic(&self.tables.compound_proclitics, &clitic)
            .is_some_and(|form| same_clitic(ortho_word, form));
        if !matches || host.is_empty() {
            return None;
        }
        match split_at_nth(gloss, 2) {
            Some((clitic_gloss, host_gloss)) => Some(Split {
                clitic,
                host,
                clitic_gloss,
                host_gloss,
            }),
            None => {
                stats.skipped += 1;
                warn!(seg, gloss, "gloss cannot mirror compound proclitic split");
                None
            }
        }
    }

    fn split_enclitic(
        &self,
        seg: &str,
        gloss: &str,
        ortho_words: &[String],
        stats: &mut PromotionStats,
    ) -> Option<Split> {
        let in_ortho = |form: &str| ortho_words.iter().any(|w| same_clitic(form, w));

        // compound first, so e1=e2 is not broken apart
        if let Some((host, clitic)) = rsplit_at_nth(seg, 2) {
            let key = strip_ignored_punctuation(&clitic);
            let matches = self
                .tables
                .compound_enclitics
                .get(&key)
                .is_some_and(|form| in_ortho(form.as_str()));
            if matches && !host.is_empty() {
                return match rsplit_at_nth(gloss, 2) {
                    Some((host_gloss, clitic_gloss)) => Some(Split {
                        clitic,
                        host,
                        clitic_gloss,
                        host_gloss,
                    }),
                    None => {
                        stats.skipped += 1;
                        warn!(seg, gloss, "gloss cannot mirror compound enclitic split");
                        None
                    }
                };
            }
        }

        let (host, clitic) = seg.rsplit_once(CLITIC)?;
        let key = strip_ignored_punctuation(clitic);
        let matches = self
            .tables
            .enclitics
            .get(&key)
            .is_some_and(|form| in_ortho(form.as_str()));
        if !matches || host.is_empty() {
            return None;
        }
        match gloss.rsplit_once(CLITIC) {
            Some((host_gloss, clitic_gloss)) => Some(Split {
                clitic: clitic.to_string(),
                host: host.to_string(),
                clitic_gloss: clitic_gloss.to_string(),
                host_gloss: host_gloss.to_string(),
            }),
            None => {
                stats.skipped += 1;
                warn!(seg, gloss, "gloss cannot mirror enclitic split");
                None
            }
        }
    }
}

/// Split at the `n`th clitic boundary from the left: `(first n pieces, rest)`.
fn split_at_nth(word: &str, n: usize) -> Option<(String, String)> {
    let (idx, _) = word.match_indices(CLITIC).nth(n - 1)?;
    Some((
        word[..idx].to_string(),
        word[idx + CLITIC.len_utf8()..].to_string(),
    ))
}

/// Split at the `n`th clitic boundary from the right: `(rest, last n pieces)`.
fn rsplit_at_nth(word: &str, n: usize) -> Option<(String, String)> {
    let (idx, _) = word.rmatch_indices(CLITIC).nth(n - 1)?;
    Some((
        word[..idx].to_string(),
        word[idx + CLITIC.len_utf8()..].to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn promoter() -> CliticPromoter {
        CliticPromoter::default()
    }

    #[test]
    fn test_same_clitic() {
        assert!(same_clitic("ká", "ka"));
        assert!(same_clitic("tu\u{301}7", "tú7"));
        assert!(!same_clitic("ka", "ki"));
        assert!(same_clitic("éta", "éta"));
    }

    #[test]
    fn test_split_helpers() {
        assert_eq!(
            split_at_nth("e=ta=sqáycw", 2),
            Some(("e=ta".to_string(), "sqáycw".to_string()))
        );
        assert_eq!(
            rsplit_at_nth("wá7=tú7=a", 2),
            Some(("wá7".to_string(), "tú7=a".to_string()))
        );
        assert_eq!(split_at_nth("a=b", 2), None);
    }

    #[test]
    fn promotes_accented_proclitic() {
        let out = promoter().promote_line("Wá7 lhkan", "wá7=lhkan", "IPFV=FSGS");
        assert_eq!(out.segmentation, "wá7 lhkan");
        assert_eq!(out.gloss, "IPFV FSGS");
        assert_eq!(out.stats.proclitics, 1);
    }

    #[test]
    fn proclitic_must_match_position() {
        let out = promoter().promote_line("sqáycw wa7", "wa7=sqáycw", "IPFV=man");
        assert_eq!(out.segmentation, "wa7=sqáycw");
        assert_eq!(out.stats.promoted(), 0);
    }

    #[test]
    fn stacked_proclitics() {
        let out = promoter().promote_line(
            "wa7 ti sqáycw-a",
            "wa7=ti=sqáycw=a",
            "IPFV=DET=man=EXIS",
        );
        assert_eq!(out.segmentation, "wa7 ti sqáycw=a");
        assert_eq!(out.gloss, "IPFV DET man=EXIS");
        assert_eq!(out.stats.proclitics, 2);
    }

    #[test]
    fn compound_proclitic_keeps_gloss_pair() {
        let out = promoter().promote_line("éta sqáycw", "e=ta=sqáycw", "PREP=DET=man");
        assert_eq!(out.segmentation, "e=ta sqáycw");
        assert_eq!(out.gloss, "PREP=DET man");
    }

    #[test]
    fn enclitic_matches_anywhere() {
        let out = promoter().promote_line("ka sqáycw", "sqáycw=ka", "man=IRR");
        assert_eq!(out.segmentation, "sqáycw ka");
        assert_eq!(out.gloss, "man IRR");
        assert_eq!(out.stats.enclitics, 1);
    }

    #[test]
    fn enclitic_keeps_original_form() {
        let out = promoter().promote_line("sqáycw ka", "sqáycw=ka?", "man=IRR");
        assert_eq!(out.segmentation, "sqáycw ka?");
    }

    #[test]
    fn compound_enclitic_before_single() {
        let out = promoter().promote_line("sqáycw tú7a", "sqáycw=tú7=a", "man=then=EXIS");
        assert_eq!(out.segmentation, "sqáycw tú7=a");
        assert_eq!(out.gloss, "man then=EXIS");
        assert_eq!(out.stats.enclitics, 1);
    }

    #[test]
    fn never_leaves_empty_host() {
        let out = promoter().promote_line("ti", "ti=", "DET=");
        assert_eq!(out.segmentation, "ti=");
        assert_eq!(out.stats.promoted(), 0);
    }

    #[test]
    fn gloss_without_boundary_is_skipped() {
        let out = promoter().promote_line("ti sqáycw", "ti=sqáycw", "DET.man");
        assert_eq!(out.segmentation, "ti=sqáycw");
        assert_eq!(out.gloss, "DET.man");
        assert_eq!(out.stats.skipped, 1);
    }

    #[test]
    fn word_count_mismatch_is_skipped() {
        let out = promoter().promote_line("ti sqáycw", "ti=sqáycw", "DET=man extra");
        assert_eq!(out.segmentation, "ti=sqáycw");
        assert_eq!(out.stats.skipped, 1);
    }

    #[test]
    fn promoted_words_are_standalone() {
        let ortho = "wa7 ti sqáycw ka";
        let out = promoter().promote_line(ortho, "wa7=ti=sqáycw=ka", "IPFV=DET=man=IRR");
        let seg: Vec<&str> = out.segmentation.split_whitespace().collect();
        for (o, s) in ortho.split_whitespace().zip(&seg) {
            if promoter().tables().proclitics.contains_key(o) {
                assert!(!s.contains(CLITIC));
                assert_eq!(*s, o);
            }
        }
        assert_eq!(seg.len(), out.gloss.split_whitespace().count());
    }

    #[test]
    fn custom_tables() {
        let tables = CliticTables::new().with_proclitic("de", "de");
        let out = CliticPromoter::new(tables).promote_line("de casa", "de=casa", "of=house");
        assert_eq!(out.segmentation, "de casa");
    }

    #[test]
    fn tables_from_json() {
        let tables: CliticTables = serde_json::from_str(r#"{"enclitics": {"ka": "ka"}}"#).unwrap();
        assert!(tables.proclitics.is_empty());
        assert_eq!(tables.enclitics.get("ka").map(String::as_str), Some("ka"));
    }

    #[test]
    fn promote_examples_sums_stats() {
        let data = vec![
            Example::new(["wá7 lhkan", "wá7=lhkan", "IPFV=FSGS", "I am here"]),
            Example::new(["ka sqáycw", "sqáycw=ka", "man=IRR", "a man"]),
        ];
        let (out, stats) = promoter().promote_examples(&data, &LineLayout::default());
        assert_eq!(stats.promoted(), 2);
        assert_eq!(out[0].line(1), "wá7 lhkan");
        assert_eq!(out[1].line(2), "man IRR");
        assert_eq!(out[1].line(3), "a man");
    }
}
