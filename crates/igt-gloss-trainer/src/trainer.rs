//! The runs behind each `igt-gloss` subcommand.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

use igt_gloss_core::corpus::{Example, mark_ool_words, tidy_examples};
use igt_gloss_core::eval::{BoundaryMatch, EvaluationReport, Evaluator, TrainingReference};
use igt_gloss_core::gloss::{
    GlossingPipeline, StemLookupStats, TrainingSummary, make_sentence_list_with_prediction,
};
use igt_gloss_core::normalize::{
    ClassifierStats, CliticPromoter, PromotionStats, ReduplicationClassifier,
};
use igt_gloss_core::validate::{GlossInventory, ValidationReport, Validator, gloss_inventory};

use crate::data::RunConfig;

/// Problems found in a raw corpus, plus its gloss inventory.
#[derive(Debug, Clone, Serialize)]
pub struct Prescreen {
    pub report: ValidationReport,
    pub inventory: GlossInventory,
}

/// A normalized corpus and what was changed on the way.
#[derive(Debug, Clone, Serialize)]
pub struct Normalized {
    #[serde(skip)]
    pub examples: Vec<Example>,
    pub promotion: PromotionStats,
    pub classification: ClassifierStats,
    pub infixes: Option<ClassifierStats>,
    /// Problems left after normalization.
    pub residual: ValidationReport,
    /// Examples dropped by the alignment filter.
    pub filtered: usize,
}

/// Result of training on one corpus and glossing another.
#[derive(Debug, Clone, Serialize)]
pub struct GlossRun {
    pub training: TrainingSummary,
    pub stem_lookup: StemLookupStats,
    pub report: EvaluationReport,
    #[serde(skip)]
    pub predicted: Vec<Example>,
}

pub struct Trainer {
    config: RunConfig,
    validator: Validator,
}

impl Trainer {
    pub fn new(config: RunConfig) -> Result<Self> {
        Ok(Self {
            config,
            validator: Validator::new()?,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn prescreen(&self, examples: &[Example]) -> Result<Prescreen> {
        let layout = self.config.pipeline.layout;
        let report = self.validator.validate(examples, &layout)?;
        let inventory = gloss_inventory(examples, &layout);
        info!(problems = report.total(), "prescreen finished");
        Ok(Prescreen { report, inventory })
    }

    /// Tidy, mark OOL words, promote clitics, resolve infixes if configured
    /// and classify reduplication.
    /// With `filter` set, misaligned examples are dropped at the end.
    pub fn normalize(&self, examples: &[Example], filter: bool) -> Result<Normalized> {
        let layout = self.config.pipeline.layout;
        let tidied = tidy_examples(examples, &layout)?;

        let ool: Vec<&str> = self.config.ool_words.iter().map(String::as_str).collect();
        let marked = if ool.is_empty() {
            tidied
        } else {
            mark_ool_words(&tidied, &ool, &layout, self.config.pipeline.lines_per_example)
        };

        let promoter = CliticPromoter::new(self.config.clitic_tables());
        let (mut promoted, promotion) = promoter.promote_examples(&marked, &layout);

        let classifier = ReduplicationClassifier::new(self.config.classifier.clone());
        // Raw infix markers are resolved before reduplication writes its own `~`.
        let infixes = self.config.mark_infixes.then(|| {
            let mut total = ClassifierStats::default();
            for example in &mut promoted {
                let (seg, stats) = classifier.mark_infixes_line(
                    example.line(layout.segmentation),
                    example.line(layout.gloss),
                );
                example.set_line(layout.segmentation, seg);
                total += stats;
            }
            total
        });
        let (classified, classification) = classifier.classify_examples(&promoted, &layout);

        let residual = self.validator.validate(&classified, &layout)?;
        let (examples, filtered) = if filter {
            self.validator
                .filter_misaligned(&classified, &layout, self.config.filter)
        } else {
            (classified, 0)
        };
        if filtered > 0 {
            warn!(filtered, "dropped misaligned examples");
        }

        info!(
            examples = examples.len(),
            promoted = promotion.promoted(),
            residual = residual.total(),
            "normalization finished"
        );
        Ok(Normalized {
            examples,
            promotion,
            classification,
            infixes,
            residual,
            filtered,
        })
    }

    /// Train on `train`, gloss `test` and score the result against it.
    pub fn gloss(
        &self,
        train: &[Example],
        test: &[Example],
        matching: BoundaryMatch,
        model_path: Option<&Path>,
    ) -> Result<GlossRun> {
        let mut pipeline = GlossingPipeline::new(self.config.pipeline.clone());
        let training = pipeline.train(train)?;
        if let Some(path) = model_path {
            pipeline.save(path)?;
            info!(path = %path.display(), "saved glossing model");
        }

        let (predictions, stem_lookup) = pipeline.predict_with_stats(test)?;
        if let Some(ratio) = stem_lookup.unknown_ratio() {
            info!(unknown_ratio = ratio, "stem lookup");
        }

        let layout = self.config.pipeline.layout;
        let lines: Vec<String> = predictions.iter().map(|p| p.line.clone()).collect();
        let predicted = make_sentence_list_with_prediction(test, &lines, layout.gloss);

        let report = Evaluator::new(layout)
            .with_boundary_match(matching)
            .with_training(TrainingReference::from_pipeline(&pipeline))
            .evaluate_predictions(test, &predictions)?;

        Ok(GlossRun {
            training,
            stem_lookup,
            report,
            predicted,
        })
    }

    /// Score an already glossed corpus. OOV and in-vocabulary scores need
    /// the training corpus.
    pub fn evaluate(
        &self,
        gold: &[Example],
        predicted: &[Example],
        train: Option<&[Example]>,
        matching: BoundaryMatch,
    ) -> Result<EvaluationReport> {
        let pipeline = &self.config.pipeline;
        let mut evaluator = Evaluator::new(pipeline.layout).with_boundary_match(matching);
        if let Some(train) = train {
            let reference =
                TrainingReference::from_examples(train, &pipeline.layout, &pipeline.lang_labels)?;
            evaluator = evaluator.with_training(reference);
        }
        Ok(evaluator.evaluate(gold, predicted)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(trans: &str, seg: &str, gloss: &str) -> Example {
        Example::new([trans, seg, gloss, "translation"])
    }

    fn corpus() -> Vec<Example> {
        vec![
            example("ti sqáycwa", "ti=sqáycw=a", "DET=man=EXIS"),
            example("ti smúlhatsa", "ti=smúlhats=a", "DET=woman=EXIS"),
            example("wá7 lhkan", "wá7 lhkan", "be FSGS"),
            example("ta sqáycwa", "ta=sqáycw=a", "DET=man=EXIS"),
        ]
    }

    #[test]
    fn test_prescreen_counts_problems() {
        let trainer = Trainer::new(RunConfig::default()).unwrap();
        let mut examples = corpus();
        examples.push(example("wá7  lhkan", "wá7 lhkan", "be FSGS"));

        let result = trainer.prescreen(&examples).unwrap();
        assert_eq!(result.report.multiple_spaces, 1);
        assert!(!result.inventory.grams.is_empty());
    }

    #[test]
    fn test_normalize_promotes_clitics() {
        let trainer = Trainer::new(RunConfig::default()).unwrap();
        let examples = vec![example("Wá7 lhkan", "wá7=lhkan", "IPFV=FSGS")];

        let result = trainer.normalize(&examples, false).unwrap();
        assert_eq!(result.examples[0].line(1), "wá7 lhkan");
        assert_eq!(result.examples[0].line(2), "IPFV FSGS");
        assert_eq!(result.promotion.promoted(), 1);
        assert!(result.infixes.is_none());
    }

    #[test]
    fn test_normalize_marks_infixes_before_reduplication() {
        let config = RunConfig {
            mark_infixes: true,
            ..RunConfig::default()
        };
        let trainer = Trainer::new(config).unwrap();
        let examples = vec![
            example("aba", "a·b·a", "TRED·base·FRED"),
            example("qʷalqʷal", "qʷal·qʷal", "TRED·say"),
            example("samat", "sa~ma~t", "go-INCH"),
        ];

        let result = trainer.normalize(&examples, false).unwrap();
        assert_eq!(result.examples[0].line(1), "a~b~a");
        assert_eq!(result.examples[1].line(1), "qʷal~qʷal");
        assert_eq!(result.examples[2].line(1), "sa<ma>t");

        let infixes = result.infixes.unwrap();
        assert_eq!(infixes.infixes, 1);
        assert_eq!(infixes.skipped, 0);
        assert_eq!(result.classification.linear_reduplication, 2);
    }

    #[test]
    fn test_normalize_filter_drops_misaligned() {
        let trainer = Trainer::new(RunConfig::default()).unwrap();
        let mut examples = corpus();
        examples.push(example("wá7", "wá7", "be FSGS"));

        let result = trainer.normalize(&examples, true).unwrap();
        assert_eq!(result.filtered, 1);
        assert_eq!(result.examples.len(), corpus().len());
    }

    #[test]
    fn test_gloss_round_trip_on_training_data() {
        let trainer = Trainer::new(RunConfig::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.json");

        let run = trainer
            .gloss(&corpus(), &corpus(), BoundaryMatch::Untyped, Some(&model))
            .unwrap();
        assert!(model.exists());
        assert_eq!(run.training.examples, 4);
        assert_eq!(run.predicted.len(), 4);
        assert_eq!(run.report.boundary_f1, Some(100.0));
        assert_eq!(run.report.oov_count, Some(0));
    }

    #[test]
    fn test_evaluate_identical_corpus() {
        let trainer = Trainer::new(RunConfig::default()).unwrap();
        let gold = corpus();
        let report = trainer
            .evaluate(&gold, &gold, None, BoundaryMatch::Typed)
            .unwrap();
        assert_eq!(report.word_accuracy, Some(100.0));
        assert_eq!(report.oov_count, None);
    }
}
