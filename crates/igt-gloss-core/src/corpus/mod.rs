//! Corpus records and the passes that run before boundary work.

pub mod example;
pub mod ool;
pub mod reader;
pub mod tidy;

pub use example::{Example, LineLayout, check_shape};
pub use ool::{
    OOL_LABEL, OOL_MARKER, OolMode, add_back_ool_words, handle_ool_line, handle_ool_words,
    is_ool_word, mark_ool_words,
};
pub use reader::{read_examples, read_file, write_examples, write_file};
pub use tidy::{Tidier, tidy_examples};
