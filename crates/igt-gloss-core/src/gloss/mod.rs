//! Automatic glossing: morpheme features, the stem/gram partition, the
//! sequence tagger and the pipeline that ties them together.

pub mod features;
pub mod pipeline;
pub mod stems;
pub mod tagger;
pub mod viterbi;

pub use features::{FeatureExtractor, LangLabels, MorphemeFeatures, morpheme_to_features};
pub use pipeline::{
    GlossingPipeline, PipelineConfig, Prediction, TrainingData, TrainingSummary,
    add_word_boundaries_to_gloss, make_sentence_list_with_prediction, reassemble_predicted_words,
};
pub use stems::{
    STEM_LABEL, StemDictionary, StemLookupStats, generalize_morpheme, gloss_stems, is_stem_gloss,
    partition_corpus, partition_stems,
};
pub use tagger::{PerceptronConfig, PerceptronTagger, SequenceTagger};
pub use viterbi::ViterbiDecoder;
