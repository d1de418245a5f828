//! Full evaluation of a predicted corpus against its gold version.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use tracing::info;

use super::accuracy::{
    bag_of_words_accuracy, in_vocab_stem_accuracy, morpheme_accuracy, stem_gram_accuracy_by_gold,
    stem_gram_accuracy_by_prediction, whole_word_accuracy, word_accuracy,
};
use super::{Score, as_percent};
use super::boundary::{BoundaryMatch, line_boundary_counts};
use super::oov::oov_scores;
use crate::boundary::ignore_brackets;
use crate::corpus::{Example, LineLayout, OolMode, check_shape, handle_ool_words};
use crate::error::{IgtError, Result};
use crate::gloss::{
    GlossingPipeline, LangLabels, Prediction, STEM_LABEL, SequenceTagger, StemDictionary,
    TrainingData, is_stem_gloss, make_sentence_list_with_prediction,
};
use crate::tokenizer::Tokenizer;

/// Every metric, in reporting order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub morpheme_accuracy: Score,
    pub word_accuracy: Score,
    pub stem_accuracy: Score,
    pub gram_accuracy: Score,
    pub gold_stem_accuracy: Score,
    pub gold_gram_accuracy: Score,
    pub in_vocab_stem_accuracy: Score,
    pub bag_of_words_accuracy: Score,
    pub whole_word_accuracy: Score,
    pub boundary_precision: Score,
    pub boundary_recall: Score,
    pub boundary_f1: Score,
    pub oov_count: Option<usize>,
    pub oov_proportion: Score,
    pub oov_accuracy: Score,
}

impl EvaluationReport {
    /// Metric names and values in reporting order.
    pub fn entries(&self) -> [(&'static str, Option<f64>); 15] {
        [
            ("Morpheme accuracy", self.morpheme_accuracy),
            ("Word accuracy", self.word_accuracy),
            ("Stem accuracy", self.stem_accuracy),
            ("Gram accuracy", self.gram_accuracy),
            ("Stem accuracy (gold split)", self.gold_stem_accuracy),
            ("Gram accuracy (gold split)", self.gold_gram_accuracy),
            ("In-vocabulary stem accuracy", self.in_vocab_stem_accuracy),
            ("Bag-of-words accuracy", self.bag_of_words_accuracy),
            ("Whole-word accuracy", self.whole_word_accuracy),
            ("Boundary precision", self.boundary_precision),
            ("Boundary recall", self.boundary_recall),
            ("Boundary F1", self.boundary_f1),
            ("OOV count", self.oov_count.map(|c| c as f64)),
            ("OOV proportion", self.oov_proportion),
            ("OOV accuracy", self.oov_accuracy),
        ]
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.entries() {
            match value {
                Some(v) if name == "OOV count" => writeln!(f, "{name}: {v}")?,
                Some(v) => writeln!(f, "{name}: {v:.2}%")?,
                None => writeln!(f, "{name}: None")?,
            }
        }
        Ok(())
    }
}

/// What the training run knew: its stems and its gold gloss words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainingReference {
    pub stems: StemDictionary,
    pub vocabulary: BTreeSet<String>,
}

impl TrainingReference {
    pub fn from_pipeline<T: SequenceTagger>(pipeline: &GlossingPipeline<T>) -> Self {
        Self {
            stems: pipeline.stems().clone(),
            vocabulary: pipeline.training_vocabulary().clone(),
        }
    }

    /// Rebuild the reference from a training corpus.
    pub fn from_examples(examples: &[Example], layout: &LineLayout, labels: &LangLabels) -> Result<Self> {
        let data = TrainingData::from_examples(examples, layout, labels);
        Ok(Self {
            stems: data.stems()?,
            vocabulary: data.vocabulary,
        })
    }
}

/// Scores predicted corpora against gold ones.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    layout: LineLayout,
    boundary_match: BoundaryMatch,
    training: Option<TrainingReference>,
    tokenizer: Tokenizer,
}

type Nested = Vec<Vec<Vec<String>>>;

impl Evaluator {
    pub fn new(layout: LineLayout) -> Self {
        Self {
            layout,
            ..Default::default()
        }
    }

    pub fn with_boundary_match(mut self, matching: BoundaryMatch) -> Self {
        self.boundary_match = matching;
        self
    }

    /// Enable the in-vocabulary and OOV metrics.
    pub fn with_training(mut self, training: TrainingReference) -> Self {
        self.training = Some(training);
        self
    }

    /// Evaluate a predicted corpus file against the gold one.
    ///
    /// Stems are told apart from grams in the prediction by the case of
    /// the predicted gloss.
    pub fn evaluate(&self, gold: &[Example], predicted: &[Example]) -> Result<EvaluationReport> {
        let predicted = handle_ool_words(predicted, OolMode::Remove);
        let interim: Nested = self
            .glosses(&predicted)
            .into_iter()
            .map(|sentence| {
                sentence
                    .into_iter()
                    .map(|word| word.into_iter().map(interim_label).collect())
                    .collect()
            })
            .collect();
        self.score(gold, &predicted, interim)
    }

    /// Evaluate pipeline predictions, using the tagger's own stem placeholders.
    pub fn evaluate_predictions(
        &self,
        gold: &[Example],
        predictions: &[Prediction],
    ) -> Result<EvaluationReport> {
        let lines: Vec<String> = predictions.iter().map(|p| p.line.clone()).collect();
        let predicted = make_sentence_list_with_prediction(gold, &lines, self.layout.gloss);
        let predicted = handle_ool_words(&predicted, OolMode::Remove);
        let interim = predictions.iter().map(|p| p.interim_words.clone()).collect();
        self.score(gold, &predicted, interim)
    }

    fn glosses(&self, examples: &[Example]) -> Nested {
        examples
            .iter()
            .map(|e| self.tokenizer.gloss_line(e.line(self.layout.gloss)))
            .collect()
    }

    fn words(examples: &[Example], line: usize) -> Vec<Vec<String>> {
        examples
            .iter()
            .map(|e| e.line(line).split_whitespace().map(str::to_string).collect())
            .collect()
    }

    fn score(&self, gold: &[Example], predicted: &[Example], interim: Nested) -> Result<EvaluationReport> {
        check_shape(gold, &self.layout)?;
        check_shape(predicted, &self.layout)?;
        if gold.len() != predicted.len() {
            return Err(IgtError::length_mismatch(
                "gold vs predicted examples",
                gold.len(),
                predicted.len(),
            ));
        }

        let gold = handle_ool_words(gold, OolMode::Remove);
        let gold_y = self.glosses(&gold);
        let pred_y = self.glosses(predicted);

        let (stem_accuracy, gram_accuracy) =
            stem_gram_accuracy_by_prediction(&interim, &pred_y, &gold_y)?;
        let (gold_stem_accuracy, gold_gram_accuracy) = stem_gram_accuracy_by_gold(&gold_y, &pred_y)?;

        let gold_words = Self::words(&gold, self.layout.gloss);
        let pred_words = Self::words(predicted, self.layout.gloss);

        let seg_words = |examples: &[Example]| -> Vec<Vec<String>> {
            examples
                .iter()
                .map(|e| {
                    ignore_brackets(e.line(self.layout.segmentation))
                        .split_whitespace()
                        .map(str::to_string)
                        .collect()
                })
                .collect()
        };
        let boundaries = line_boundary_counts(&seg_words(&gold), &seg_words(predicted), self.boundary_match)?;

        let mut report = EvaluationReport {
            morpheme_accuracy: morpheme_accuracy(&gold_y, &pred_y)?,
            word_accuracy: word_accuracy(&gold_y, &pred_y)?,
            stem_accuracy,
            gram_accuracy,
            gold_stem_accuracy,
            gold_gram_accuracy,
            bag_of_words_accuracy: bag_of_words_accuracy(&gold_y, &pred_y)?,
            whole_word_accuracy: whole_word_accuracy(&gold_words, &pred_words)?,
            boundary_precision: boundaries.precision().map(as_percent),
            boundary_recall: boundaries.recall().map(as_percent),
            boundary_f1: boundaries.f1().map(as_percent),
            ..Default::default()
        };

        if let Some(training) = &self.training {
            let gold_segmentation: Nested = gold
                .iter()
                .map(|e| self.tokenizer.segment_line(e.line(self.layout.segmentation)))
                .collect();
            report.in_vocab_stem_accuracy =
                in_vocab_stem_accuracy(&gold_segmentation, &gold_y, &pred_y, &training.stems)?;

            let oov = oov_scores(&gold_words, &pred_words, &training.vocabulary)?;
            report.oov_count = Some(oov.count);
            report.oov_proportion = oov.proportion;
            report.oov_accuracy = oov.accuracy;
        }

        info!(
            examples = gold.len(),
            morpheme_accuracy = ?report.morpheme_accuracy,
            word_accuracy = ?report.word_accuracy,
            "evaluation finished"
        );
        Ok(report)
    }
}

fn interim_label(gloss: String) -> String {
    if is_stem_gloss(&gloss) {
        STEM_LABEL.to_string()
    } else {
        gloss
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gloss::{PerceptronConfig, PipelineConfig};

    fn example(seg: &str, gloss: &str) -> Example {
        Example::new(["trans", seg, gloss, "translation"])
    }

    #[test]
    fn perfect_prediction() {
        let gold = vec![example("ti=sqáycw=a", "DET=man=EXIS")];
        let report = Evaluator::default().evaluate(&gold, &gold).unwrap();
        assert_eq!(report.morpheme_accuracy, Some(100.0));
        assert_eq!(report.word_accuracy, Some(100.0));
        assert_eq!(report.stem_accuracy, Some(100.0));
        assert_eq!(report.gram_accuracy, Some(100.0));
        assert_eq!(report.whole_word_accuracy, Some(100.0));
        assert_eq!(report.boundary_f1, Some(100.0));
        assert_eq!(report.oov_count, None);
        assert_eq!(report.in_vocab_stem_accuracy, None);
    }

    #[test]
    fn extra_predicted_morpheme_ignored() {
        let gold = vec![example("dog-s", "dog-PL")];
        let pred = vec![example("dog-s-x", "dog-PL-EXTRA")];
        let report = Evaluator::default().evaluate(&gold, &pred).unwrap();
        assert_eq!(report.morpheme_accuracy, Some(100.0));
        assert_eq!(report.whole_word_accuracy, Some(0.0));
        assert_eq!(report.boundary_precision, Some(50.0));
        assert_eq!(report.boundary_recall, Some(100.0));
    }

    #[test]
    fn ool_words_not_scored() {
        let gold = vec![example("*Mary wá7", "*Mary be")];
        let pred = vec![example("*Mary wá7", "*Mary do")];
        let report = Evaluator::default().evaluate(&gold, &pred).unwrap();
        assert_eq!(report.morpheme_accuracy, Some(0.0));
        assert_eq!(report.boundary_precision, None);
    }

    #[test]
    fn sentence_count_mismatch() {
        let gold = vec![example("a", "A"), example("b", "B")];
        let pred = vec![example("a", "A")];
        assert!(Evaluator::default().evaluate(&gold, &pred).is_err());
    }

    #[test]
    fn training_reference_enables_oov() {
        let train = vec![example("ti=sqáycw=a", "DET=man=EXIS")];
        let reference =
            TrainingReference::from_examples(&train, &LineLayout::default(), &LangLabels::default())
                .unwrap();
        assert_eq!(reference.stems.get("sqáycw"), Some("man"));

        let gold = vec![example("ti=sqáycw=a wá7", "DET=man=EXIS be")];
        let pred = vec![example("ti=sqáycw=a wá7", "DET=man=EXIS STEM")];
        let report = Evaluator::default()
            .with_training(reference)
            .evaluate(&gold, &pred)
            .unwrap();
        assert_eq!(report.oov_count, Some(1));
        assert_eq!(report.oov_proportion, Some(50.0));
        assert_eq!(report.oov_accuracy, Some(0.0));
        assert_eq!(report.in_vocab_stem_accuracy, Some(100.0));
        // "STEM" left in the output counts as a predicted stem
        assert_eq!(report.stem_accuracy, Some(50.0));
    }

    #[test]
    fn report_display_and_json() {
        let report = EvaluationReport {
            morpheme_accuracy: Some(87.5),
            oov_count: Some(3),
            ..Default::default()
        };
        let text = report.to_string();
        assert!(text.starts_with("Morpheme accuracy: 87.50%\n"));
        assert!(text.contains("Word accuracy: None"));
        assert!(text.contains("OOV count: 3\n"));
        assert_eq!(text.lines().count(), 15);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["morpheme_accuracy"], 87.5);
        assert!(json["word_accuracy"].is_null());
    }

    #[test]
    fn evaluate_pipeline_predictions() {
        let train = vec![
            example("ti=sqáycw=a", "DET=man=EXIS"),
            example("ti=smúlhats=a", "DET=woman=EXIS"),
        ];
        let config = PipelineConfig::new().with_perceptron(PerceptronConfig::new().with_epochs(5));
        let mut pipeline = GlossingPipeline::new(config);
        pipeline.train(&train).unwrap();
        let predictions = pipeline.predict(&train).unwrap();

        let report = Evaluator::default()
            .with_training(TrainingReference::from_pipeline(&pipeline))
            .evaluate_predictions(&train, &predictions)
            .unwrap();
        assert_eq!(report.morpheme_accuracy, Some(100.0));
        assert_eq!(report.oov_count, Some(0));
        assert_eq!(report.oov_accuracy, None);
    }
}
