//! Gloss inventory: which morphemes each gloss was written for.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::corpus::{Example, LineLayout};
use crate::tokenizer::Tokenizer;

/// One gloss and the morpheme forms it labels, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryEntry {
    pub gloss: String,
    pub morphemes: Vec<(String, usize)>,
}

impl fmt::Display for InventoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let forms: Vec<String> = self
            .morphemes
            .iter()
            .map(|(m, n)| format!("{m} ({n})"))
            .collect();
        write!(f, "{} : {}", self.gloss, forms.join(", "))
    }
}

/// Glosses sorted into grams, stems and untranslated forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GlossInventory {
    pub grams: Vec<InventoryEntry>,
    pub stems: Vec<InventoryEntry>,
    /// Glosses identical to their only morpheme (names, loanwords).
    pub untranslated: Vec<InventoryEntry>,
    /// Examples left out because their morpheme counts disagree.
    pub skipped_examples: usize,
}

impl fmt::Display for GlossInventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sections = [
            ("Grams", &self.grams),
            ("Stems", &self.stems),
            ("Untranslated", &self.untranslated),
        ];
        for (title, entries) in sections {
            writeln!(f, "--- {title}: {} unique glosses ---", entries.len())?;
            for entry in entries {
                writeln!(f, "{entry}")?;
            }
        }
        Ok(())
    }
}

/// Python-style `isupper`: at least one cased character and no lower-case ones.
fn is_gram(gloss: &str) -> bool {
    gloss.chars().any(char::is_uppercase) && !gloss.chars().any(char::is_lowercase)
}

/// Build the inventory for a corpus.
pub fn gloss_inventory(examples: &[Example], layout: &LineLayout) -> GlossInventory {
    let tokenizer = Tokenizer::new();
    let mut by_gloss: BTreeMap<String, Vec<(String, usize)>> = BTreeMap::new();
    let mut inventory = GlossInventory::default();

    for example in examples {
        let morphemes = tokenizer.segment_line_flat(example.line(layout.segmentation));
        let glosses = tokenizer.gloss_line_flat(example.line(layout.gloss));
        if morphemes.len() != glosses.len() {
            warn!(
                seg = example.line(layout.segmentation),
                "morpheme/gloss count mismatch, left out of inventory"
            );
            inventory.skipped_examples += 1;
            continue;
        }

        for (morpheme, gloss) in morphemes.into_iter().zip(glosses) {
            let forms = by_gloss.entry(gloss).or_default();
            match forms.iter_mut().find(|(m, _)| *m == morpheme) {
                Some((_, count)) => *count += 1,
                None => forms.push((morpheme, 1)),
            }
        }
    }

    for (gloss, morphemes) in by_gloss {
        let untranslated = morphemes.len() == 1 && morphemes[0].0 == gloss;
        let entry = InventoryEntry { gloss, morphemes };
        if is_gram(&entry.gloss) {
            inventory.grams.push(entry);
        } else if untranslated {
            inventory.untranslated.push(entry);
        } else {
            inventory.stems.push(entry);
        }
    }

    inventory
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_gram() {
        assert!(is_gram("3ERG"));
        assert!(is_gram("DET"));
        assert!(!is_gram("man"));
        assert!(!is_gram("get.found"));
        assert!(!is_gram("123"));
    }

    #[test]
    fn test_inventory_sections() {
        let data = vec![
            Example::new(["x", "ti=sqáycw=a Mary", "DET=man=EXIS Mary", "t"]),
            Example::new(["x", "ta=sqáycw=a", "DET=man=EXIS", "t"]),
            Example::new(["x", "a-b", "A", "t"]),
        ];
        let inv = gloss_inventory(&data, &LineLayout::default());
        assert_eq!(inv.skipped_examples, 1);

        let grams: Vec<&str> = inv.grams.iter().map(|e| e.gloss.as_str()).collect();
        assert_eq!(grams, vec!["DET", "EXIS"]);
        assert_eq!(
            inv.grams[0].morphemes,
            vec![("ti".to_string(), 1), ("ta".to_string(), 1)]
        );
        assert_eq!(inv.stems[0].gloss, "man");
        assert_eq!(inv.stems[0].morphemes, vec![("sqáycw".to_string(), 2)]);
        assert_eq!(inv.untranslated[0].gloss, "Mary");
    }

    #[test]
    fn test_inventory_display() {
        let data = vec![Example::new(["x", "ti=sqáycw", "DET=man", "t"])];
        let text = gloss_inventory(&data, &LineLayout::default()).to_string();
        assert!(text.contains("DET : ti (1)"));
        assert!(text.contains("--- Stems: 1 unique glosses ---"));
    }
}
