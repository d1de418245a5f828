//! Accuracy metrics over sentences of words of glosses.
//!
//! Morpheme comparisons walk the *gold* morphemes of each word: extra
//! predicted morphemes are ignored and missing ones count as wrong.

use super::{Score, percent};
use crate::error::{IgtError, Result};
use crate::gloss::{STEM_LABEL, StemDictionary, is_stem_gloss};

/// Sentences of words of morphemes (or glosses).
pub type Corpus = [Vec<Vec<String>>];

/// Check that two corpora have the same sentence count and the same word
/// count in every sentence.
pub fn check_alignment<T, U>(gold: &[Vec<T>], predicted: &[Vec<U>]) -> Result<()> {
    if gold.len() != predicted.len() {
        return Err(IgtError::length_mismatch(
            "gold vs predicted sentences",
            gold.len(),
            predicted.len(),
        ));
    }
    for (i, (g, p)) in gold.iter().zip(predicted).enumerate() {
        if g.len() != p.len() {
            return Err(IgtError::length_mismatch(
                format!("gold vs predicted words in sentence {i}"),
                g.len(),
                p.len(),
            ));
        }
    }
    Ok(())
}

fn word_pairs<'a>(
    gold: &'a Corpus,
    predicted: &'a Corpus,
) -> impl Iterator<Item = (&'a Vec<String>, &'a Vec<String>)> {
    gold.iter()
        .zip(predicted)
        .flat_map(|(g, p)| g.iter().zip(p.iter()))
}

fn gold_hits(gold_word: &[String], predicted_word: &[String]) -> usize {
    gold_word
        .iter()
        .enumerate()
        .filter(|(i, g)| predicted_word.get(*i) == Some(*g))
        .count()
}

/// Share of gold morphemes whose predicted counterpart at the same position matches.
pub fn morpheme_accuracy(gold: &Corpus, predicted: &Corpus) -> Result<Score> {
    check_alignment(gold, predicted)?;
    let (mut correct, mut total) = (0, 0);
    for (g, p) in word_pairs(gold, predicted) {
        total += g.len();
        correct += gold_hits(g, p);
    }
    Ok(percent(correct, total))
}

/// Share of words whose every gold morpheme is matched.
pub fn word_accuracy(gold: &Corpus, predicted: &Corpus) -> Result<Score> {
    check_alignment(gold, predicted)?;
    let (mut correct, mut total) = (0, 0);
    for (g, p) in word_pairs(gold, predicted) {
        total += 1;
        if gold_hits(g, p) == g.len() {
            correct += 1;
        }
    }
    Ok(percent(correct, total))
}

/// Stem and gram accuracy, split by what the tagger *predicted* each morpheme to be.
///
/// `interim` holds the placeholder labels; a [`STEM_LABEL`] marks a predicted
/// stem. Every predicted morpheme is scored, paired with `""` when the gold
/// word is shorter.
pub fn stem_gram_accuracy_by_prediction(
    interim: &Corpus,
    predicted: &Corpus,
    gold: &Corpus,
) -> Result<(Score, Score)> {
    check_alignment(gold, predicted)?;
    check_alignment(interim, predicted)?;

    let (mut stems, mut stems_ok, mut grams, mut grams_ok) = (0, 0, 0, 0);
    for ((i_sent, p_sent), g_sent) in interim.iter().zip(predicted).zip(gold) {
        for ((i_word, p_word), g_word) in i_sent.iter().zip(p_sent).zip(g_sent) {
            for (idx, (label, pred)) in i_word.iter().zip(p_word).enumerate() {
                let gold_gloss = g_word.get(idx).map(String::as_str).unwrap_or("");
                if label == STEM_LABEL {
                    stems += 1;
                    stems_ok += usize::from(pred == gold_gloss);
                } else {
                    grams += 1;
                    grams_ok += usize::from(label == gold_gloss);
                }
            }
        }
    }
    Ok((percent(stems_ok, stems), percent(grams_ok, grams)))
}

/// Stem and gram accuracy, split by the gold category of each morpheme.
pub fn stem_gram_accuracy_by_gold(gold: &Corpus, predicted: &Corpus) -> Result<(Score, Score)> {
    check_alignment(gold, predicted)?;
    let (mut stems, mut stems_ok, mut grams, mut grams_ok) = (0, 0, 0, 0);
    for (g, p) in word_pairs(gold, predicted) {
        for (idx, gold_gloss) in g.iter().enumerate() {
            let hit = usize::from(p.get(idx) == Some(gold_gloss));
            if is_stem_gloss(gold_gloss) {
                stems += 1;
                stems_ok += hit;
            } else {
                grams += 1;
                grams_ok += hit;
            }
        }
    }
    Ok((percent(stems_ok, stems), percent(grams_ok, grams)))
}

/// Accuracy on gold stems whose morpheme the training dictionary knows.
///
/// `segmentation` holds the gold morphemes. Words whose morpheme and gloss
/// counts differ are left out.
pub fn in_vocab_stem_accuracy(
    segmentation: &Corpus,
    gold: &Corpus,
    predicted: &Corpus,
    stems: &StemDictionary,
) -> Result<Score> {
    check_alignment(gold, predicted)?;
    let (mut correct, mut total) = (0, 0);
    for ((s_sent, g_sent), p_sent) in segmentation.iter().zip(gold).zip(predicted) {
        for ((s_word, g_word), p_word) in s_sent.iter().zip(g_sent).zip(p_sent) {
            if s_word.len() != g_word.len() {
                continue;
            }
            for (idx, (morpheme, gold_gloss)) in s_word.iter().zip(g_word).enumerate() {
                if !is_stem_gloss(gold_gloss) || stems.match_stem(&morpheme.to_lowercase()).is_none() {
                    continue;
                }
                total += 1;
                correct += usize::from(p_word.get(idx) == Some(gold_gloss));
            }
        }
    }
    Ok(percent(correct, total))
}

/// Share of gold morphemes found anywhere in the predicted word, each
/// predicted morpheme matching at most once.
pub fn bag_of_words_accuracy(gold: &Corpus, predicted: &Corpus) -> Result<Score> {
    check_alignment(gold, predicted)?;
    let (mut correct, mut total) = (0, 0);
    for (g, p) in word_pairs(gold, predicted) {
        let mut pool: Vec<&String> = p.iter().collect();
        for gloss in g {
            total += 1;
            if let Some(pos) = pool.iter().position(|cand| *cand == gloss) {
                pool.swap_remove(pos);
                correct += 1;
            }
        }
    }
    Ok(percent(correct, total))
}

/// Share of gold gloss words, boundaries included, reproduced exactly.
pub fn whole_word_accuracy(gold: &[Vec<String>], predicted: &[Vec<String>]) -> Result<Score> {
    check_alignment(gold, predicted)?;
    let (mut correct, mut total) = (0, 0);
    for (g, p) in gold.iter().zip(predicted) {
        for (gw, pw) in g.iter().zip(p) {
            total += 1;
            correct += usize::from(gw == pw);
        }
    }
    Ok(percent(correct, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(sentences: &[&[&[&str]]]) -> Vec<Vec<Vec<String>>> {
        sentences
            .iter()
            .map(|s| {
                s.iter()
                    .map(|w| w.iter().map(|m| m.to_string()).collect())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn extra_predicted_morphemes_are_ignored() {
        let gold = corpus(&[&[&["dog", "PL"]]]);
        let pred = corpus(&[&[&["dog", "PL", "EXTRA"]]]);
        assert_eq!(morpheme_accuracy(&gold, &pred).unwrap(), Some(100.0));
        assert_eq!(word_accuracy(&gold, &pred).unwrap(), Some(100.0));
    }

    #[test]
    fn missing_predicted_morphemes_are_wrong() {
        let gold = corpus(&[&[&["dog", "PL"], &["run"]]]);
        let pred = corpus(&[&[&["dog"], &["walk"]]]);
        assert_eq!(morpheme_accuracy(&gold, &pred).unwrap(), Some(33.33));
        assert_eq!(word_accuracy(&gold, &pred).unwrap(), Some(0.0));
    }

    #[test]
    fn empty_corpus_has_no_result() {
        assert_eq!(morpheme_accuracy(&[], &[]).unwrap(), None);
        assert_eq!(word_accuracy(&[], &[]).unwrap(), None);
    }

    #[test]
    fn word_count_mismatch_is_an_error() {
        let gold = corpus(&[&[&["a"], &["b"]]]);
        let pred = corpus(&[&[&["a"]]]);
        assert!(matches!(
            morpheme_accuracy(&gold, &pred),
            Err(IgtError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn stem_gram_split_by_prediction() {
        let gold = corpus(&[&[&["DET", "man", "EXIS"]]]);
        let pred = corpus(&[&[&["DET", "woman", "PL", "X"]]]);
        let interim = corpus(&[&[&["DET", "STEM", "PL", "X"]]]);
        let (stem, gram) = stem_gram_accuracy_by_prediction(&interim, &pred, &gold).unwrap();
        assert_eq!(stem, Some(0.0));
        // DET right, PL vs EXIS wrong, X vs "" wrong
        assert_eq!(gram, Some(33.33));
    }

    #[test]
    fn stem_gram_split_by_gold() {
        let gold = corpus(&[&[&["DET", "man", "EXIS"]]]);
        let pred = corpus(&[&[&["DET", "man"]]]);
        let (stem, gram) = stem_gram_accuracy_by_gold(&gold, &pred).unwrap();
        assert_eq!(stem, Some(100.0));
        assert_eq!(gram, Some(50.0));

        let only_grams = corpus(&[&[&["DET"]]]);
        assert_eq!(stem_gram_accuracy_by_gold(&only_grams, &only_grams).unwrap().0, None);
    }

    #[test]
    fn in_vocab_stems_only() {
        let mut stems = StemDictionary::new();
        stems.insert("sqáycw", "man");
        let seg = corpus(&[&[&["ti", "sqaycw", "a"], &["smúlhats"]]]);
        let gold = corpus(&[&[&["DET", "man", "EXIS"], &["woman"]]]);
        let pred = corpus(&[&[&["DET", "man", "EXIS"], &["STEM"]]]);
        assert_eq!(
            in_vocab_stem_accuracy(&seg, &gold, &pred, &stems).unwrap(),
            Some(100.0)
        );
        assert_eq!(
            in_vocab_stem_accuracy(&seg, &gold, &pred, &StemDictionary::new()).unwrap(),
            None
        );
    }

    #[test]
    fn bag_of_words_consumes_matches() {
        let gold = corpus(&[&[&["PL", "PL", "dog"]]]);
        let pred = corpus(&[&[&["dog", "PL"]]]);
        assert_eq!(bag_of_words_accuracy(&gold, &pred).unwrap(), Some(66.67));
    }

    #[test]
    fn whole_words_compare_boundaries() {
        let gold = vec![vec!["DET=man".to_string(), "be".to_string()]];
        let pred = vec![vec!["DET-man".to_string(), "be".to_string()]];
        assert_eq!(whole_word_accuracy(&gold, &pred).unwrap(), Some(50.0));
    }
}
