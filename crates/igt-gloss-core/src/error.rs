use thiserror::Error;

/// Errors that can occur during IGT processing.
#[derive(Debug, Error)]
pub enum IgtError {
    /// The input corpus or line is empty.
    #[error("input is empty or whitespace-only")]
    EmptyInput,

    /// An example does not have the same number of lines as the first example.
    #[error("example {example} has {found} lines, expected {expected}")]
    InconsistentLineCount {
        /// Zero-based index of the offending example.
        example: usize,
        /// Line count established by the first example.
        expected: usize,
        /// Line count of the offending example.
        found: usize,
    },

    /// A configured line index does not exist in the examples.
    #[error("line index {index} is out of range for examples with {lines} lines")]
    LineIndexOutOfRange {
        /// The requested zero-based line index.
        index: usize,
        /// Number of lines per example.
        lines: usize,
    },

    /// Two sequences that must be parallel have different lengths.
    #[error("length mismatch in {context}: expected {expected}, found {found}")]
    LengthMismatch {
        /// What was being aligned.
        context: String,
        /// Expected length.
        expected: usize,
        /// Observed length.
        found: usize,
    },

    /// A word has infix openers without matching closers (or vice versa).
    #[error("unbalanced infix boundaries in word {word:?}")]
    UnbalancedInfix {
        /// The offending segmentation word.
        word: String,
    },

    /// `predict` was called on a tagger that has not been fitted.
    #[error("sequence tagger has not been fitted")]
    TaggerNotFitted,

    /// Reading or writing a corpus or model failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Model, report or configuration (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A regex pattern failed to compile (should not happen with static patterns).
    #[error("regex compilation error: {0}")]
    RegexError(#[from] regex::Error),
}

impl IgtError {
    pub(crate) fn length_mismatch(context: impl Into<String>, expected: usize, found: usize) -> Self {
        IgtError::LengthMismatch {
            context: context.into(),
            expected,
            found,
        }
    }
}

/// Result type alias for IGT operations.
pub type Result<T> = std::result::Result<T, IgtError>;
