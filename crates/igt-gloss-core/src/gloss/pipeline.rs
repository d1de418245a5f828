//! # Glossing Pipeline
//!
//! Train: featurize segmentation lines, swap stems for [`STEM_LABEL`], fit the
//! tagger on the gram-only targets and keep the stem dictionary.
//!
//! Predict: tag, look stems back up, regroup the flat labels into words using
//! the segmentation line, and render gloss lines with OOL words restored.
//!
//! [`STEM_LABEL`]: super::stems::STEM_LABEL

use std::collections::BTreeSet;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::features::{FeatureExtractor, LangLabels, MorphemeFeatures};
use super::stems::{StemDictionary, StemLookupStats, gloss_stems, partition_corpus};
use super::tagger::{PerceptronConfig, PerceptronTagger, SequenceTagger};
use crate::boundary::{self, Boundary};
use crate::corpus::{
    Example, LineLayout, OOL_LABEL, OolMode, add_back_ool_words, check_shape, handle_ool_line,
};
use crate::error::{IgtError, Result};
use crate::tokenizer::{Tokenizer, rejoin_word};

/// Configuration for [`GlossingPipeline`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Lines per example in the corpus files.
    pub lines_per_example: usize,
    pub layout: LineLayout,
    pub lang_labels: LangLabels,
    pub perceptron: PerceptronConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lines_per_example: 4,
            layout: LineLayout::default(),
            lang_labels: LangLabels::default(),
            perceptron: PerceptronConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lines_per_example(mut self, lines: usize) -> Self {
        self.lines_per_example = lines.max(1);
        self
    }

    pub fn with_layout(mut self, layout: LineLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_lang_labels(mut self, labels: LangLabels) -> Self {
        self.lang_labels = labels;
        self
    }

    pub fn with_perceptron(mut self, perceptron: PerceptronConfig) -> Self {
        self.perceptron = perceptron;
        self
    }
}

/// What a training run used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrainingSummary {
    pub examples: usize,
    /// Examples left out because their morpheme and gloss counts differ.
    pub skipped: usize,
    pub stems: usize,
}

/// The pipeline's output for one example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prediction {
    /// Tagger labels, with stems still as placeholders.
    pub interim: Vec<String>,
    /// Labels after stem lookup.
    pub glossed: Vec<String>,
    /// `interim` grouped into words.
    pub interim_words: Vec<Vec<String>>,
    /// `glossed` grouped into words.
    pub words: Vec<Vec<String>>,
    /// Rendered gloss line, OOL words included.
    pub line: String,
}

/// Regroup a flat label sequence into words, following a segmentation line.
///
/// Brackets are ignored and every word takes as many labels as it has
/// morphemes.
///
/// # Errors
///
/// [`IgtError::UnbalancedInfix`] if a word's infix openers and closers do not
/// pair up, [`IgtError::LengthMismatch`] if the labels run out.
pub fn add_word_boundaries_to_gloss(labels: &[String], seg_line: &str) -> Result<Vec<Vec<String>>> {
    let seg_line = boundary::ignore_brackets(seg_line);
    let mut remaining = labels.iter();
    let mut words = Vec::new();

    for word in seg_line.split_whitespace() {
        let boundaries = boundary::boundaries_in(word);
        let count = |b: Boundary| boundaries.iter().filter(|&&x| x == b).count();
        if count(Boundary::InfixOpen) != count(Boundary::InfixClose)
            || count(Boundary::RedupInfixOpen) != count(Boundary::RedupInfixClose)
        {
            return Err(IgtError::UnbalancedInfix {
                word: word.to_string(),
            });
        }

        let needed = boundary::morpheme_count(word);
        let glossed: Vec<String> = remaining.by_ref().take(needed).cloned().collect();
        if glossed.len() != needed {
            return Err(IgtError::length_mismatch(
                format!("predicted labels for {seg_line:?}"),
                needed,
                glossed.len(),
            ));
        }
        words.push(glossed);
    }

    let leftover = remaining.count();
    if leftover > 0 {
        warn!(leftover, seg = %seg_line, "predicted labels left over after regrouping");
    }
    Ok(words)
}

/// Join each predicted word's labels with the boundaries of its segmentation word.
///
/// # Errors
///
/// [`IgtError::LengthMismatch`] if the word counts differ or a word's
/// boundaries do not fit its labels.
pub fn reassemble_predicted_words(seg_line: &str, words: &[Vec<String>]) -> Result<Vec<String>> {
    let seg_words: Vec<&str> = seg_line.split_whitespace().collect();
    if seg_words.len() != words.len() {
        return Err(IgtError::length_mismatch(
            "segmentation words vs predicted words",
            seg_words.len(),
            words.len(),
        ));
    }

    seg_words
        .iter()
        .zip(words)
        .map(|(seg_word, glosses)| rejoin_word(glosses, &boundary::boundaries_in(seg_word)))
        .collect()
}

/// Copies of `examples` with line `line_index` replaced by the predicted lines.
pub fn make_sentence_list_with_prediction(
    examples: &[Example],
    predicted: &[String],
    line_index: usize,
) -> Vec<Example> {
    examples
        .iter()
        .zip(predicted)
        .map(|(example, line)| {
            let mut out = example.clone();
            out.set_line(line_index, line.clone());
            out
        })
        .collect()
}

/// Features for a segmentation line with OOL words replaced, then dropped.
///
/// Replacing first lets the neighbours of an OOL word see `ool` as context.
fn ool_free_features(extractor: &FeatureExtractor, seg_line: &str) -> Vec<MorphemeFeatures> {
    let mut features = extractor.line_features(&handle_ool_line(seg_line, OolMode::Replace));
    features.retain(|f| !f.is_ool());
    features
}

/// Aligned training features and gold glosses, OOL words removed.
#[derive(Debug, Clone, Default)]
pub struct TrainingData {
    pub features: Vec<Vec<MorphemeFeatures>>,
    pub glosses: Vec<Vec<String>>,
    /// Gold gloss words, boundaries included.
    pub vocabulary: BTreeSet<String>,
    /// Examples left out because their morpheme and gloss counts differ.
    pub skipped: usize,
}

impl TrainingData {
    pub fn from_examples(examples: &[Example], layout: &LineLayout, labels: &LangLabels) -> Self {
        let extractor = FeatureExtractor::new(labels.clone());
        let tokenizer = Tokenizer::new();
        let mut data = TrainingData::default();

        for example in examples {
            let seg = example.line(layout.segmentation);
            let gloss = example.line(layout.gloss);
            let sentence = ool_free_features(&extractor, seg);
            let mut gold = tokenizer.gloss_line_flat(&handle_ool_line(gloss, OolMode::Replace));
            gold.retain(|g| g != OOL_LABEL);

            if sentence.len() != gold.len() {
                warn!(seg, gloss, "morpheme/gloss count mismatch, left out of training");
                data.skipped += 1;
                continue;
            }

            data.vocabulary.extend(
                handle_ool_line(gloss, OolMode::Remove)
                    .split_whitespace()
                    .map(str::to_string),
            );
            data.features.push(sentence);
            data.glosses.push(gold);
        }
        data
    }

    /// The stem dictionary these examples produce.
    pub fn stems(&self) -> Result<StemDictionary> {
        Ok(partition_corpus(&self.features, &self.glosses)?.1)
    }
}

/// Stem dictionary plus a gram tagger, trained together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlossingPipeline<T = PerceptronTagger> {
    config: PipelineConfig,
    stems: StemDictionary,
    tagger: T,
    vocabulary: BTreeSet<String>,
}

impl GlossingPipeline<PerceptronTagger> {
    /// Pipeline backed by the averaged perceptron.
    pub fn new(config: PipelineConfig) -> Self {
        let tagger = PerceptronTagger::new(config.perceptron.clone());
        Self::with_tagger(config, tagger)
    }
}

impl Default for GlossingPipeline<PerceptronTagger> {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl<T: Serialize + DeserializeOwned> GlossingPipeline<T> {
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl<T: SequenceTagger> GlossingPipeline<T> {
    pub fn with_tagger(config: PipelineConfig, tagger: T) -> Self {
        Self {
            config,
            stems: StemDictionary::new(),
            tagger,
            vocabulary: BTreeSet::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn stems(&self) -> &StemDictionary {
        &self.stems
    }

    pub fn tagger(&self) -> &T {
        &self.tagger
    }

    /// Gold gloss words seen in training, OOL words excluded.
    pub fn training_vocabulary(&self) -> &BTreeSet<String> {
        &self.vocabulary
    }

    fn check(&self, examples: &[Example]) -> Result<()> {
        let lines = check_shape(examples, &self.config.layout)?;
        if lines != self.config.lines_per_example {
            return Err(IgtError::InconsistentLineCount {
                example: 0,
                expected: self.config.lines_per_example,
                found: lines,
            });
        }
        Ok(())
    }

    /// Build the stem dictionary and fit the tagger.
    ///
    /// # Errors
    ///
    /// [`IgtError::EmptyInput`] for an empty corpus, shape errors from
    /// [`check_shape`], and whatever the tagger reports.
    pub fn train(&mut self, examples: &[Example]) -> Result<TrainingSummary> {
        if examples.is_empty() {
            return Err(IgtError::EmptyInput);
        }
        self.check(examples)?;

        let data = TrainingData::from_examples(examples, &self.config.layout, &self.config.lang_labels);
        let (labels, stems) = partition_corpus(&data.features, &data.glosses)?;
        self.tagger.fit(&data.features, &labels)?;
        self.stems = stems;
        self.vocabulary = data.vocabulary;

        let summary = TrainingSummary {
            examples: data.features.len(),
            skipped: data.skipped,
            stems: self.stems.len(),
        };
        info!(
            examples = summary.examples,
            skipped = summary.skipped,
            stems = summary.stems,
            "glossing pipeline trained"
        );
        Ok(summary)
    }

    /// Gloss every example.
    pub fn predict(&self, examples: &[Example]) -> Result<Vec<Prediction>> {
        Ok(self.predict_with_stats(examples)?.0)
    }

    /// [`predict`](Self::predict) plus the stem lookup counts.
    pub fn predict_with_stats(&self, examples: &[Example]) -> Result<(Vec<Prediction>, StemLookupStats)> {
        if examples.is_empty() {
            return Ok((Vec::new(), StemLookupStats::default()));
        }
        self.check(examples)?;

        let layout = self.config.layout;
        let extractor = FeatureExtractor::new(self.config.lang_labels.clone());
        let features: Vec<Vec<MorphemeFeatures>> = examples
            .iter()
            .map(|e| ool_free_features(&extractor, e.line(layout.segmentation)))
            .collect();

        let interim = self.tagger.predict(&features)?;
        let (glossed, stats) = gloss_stems(&features, &interim, &self.stems)?;

        let predictions = examples
            .iter()
            .zip(interim)
            .zip(glossed)
            .map(|((example, interim), glossed)| {
                let seg = handle_ool_line(example.line(layout.segmentation), OolMode::Remove);
                let interim_words = add_word_boundaries_to_gloss(&interim, &seg)?;
                let words = add_word_boundaries_to_gloss(&glossed, &seg)?;
                let rendered = reassemble_predicted_words(&seg, &words)?;
                let line = add_back_ool_words(example.line(layout.transcription), &rendered).join(" ");
                Ok(Prediction {
                    interim,
                    glossed,
                    interim_words,
                    words,
                    line,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((predictions, stats))
    }

    /// Copies of `examples` with the gloss line replaced by the prediction.
    pub fn gloss_examples(&self, examples: &[Example]) -> Result<(Vec<Example>, Vec<Prediction>)> {
        let predictions = self.predict(examples)?;
        let lines: Vec<String> = predictions.iter().map(|p| p.line.clone()).collect();
        let glossed = make_sentence_list_with_prediction(examples, &lines, self.config.layout.gloss);
        Ok((glossed, predictions))
    }
}
