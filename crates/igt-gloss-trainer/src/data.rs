//! Corpus and configuration loading for training runs.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::info;

use igt_gloss_core::corpus::{self, Example, check_shape};
use igt_gloss_core::gloss::PipelineConfig;
use igt_gloss_core::normalize::{ClassifierConfig, CliticTables};
use igt_gloss_core::validate::AlignmentFilter;

/// Everything a run can be configured with from a JSON file.
///
/// Missing fields fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub pipeline: PipelineConfig,
    /// Clitic tables for promotion; the St'át'imcets tables when absent.
    pub clitics: Option<CliticTables>,
    pub classifier: ClassifierConfig,
    /// Also resolve the ambiguous infix marker during normalization.
    pub mark_infixes: bool,
    /// Words to mark as out-of-language before normalizing.
    pub ool_words: Vec<String>,
    /// Misalignment removed by `normalize --filter`.
    pub filter: AlignmentFilter,
}

impl RunConfig {
    /// Read a config file, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Point the layout at 1-based segmentation and gloss line numbers.
    pub fn with_line_numbers(mut self, segmentation: Option<usize>, gloss: Option<usize>) -> Self {
        let layout = &mut self.pipeline.layout;
        if let Some(line) = segmentation {
            layout.segmentation = line.saturating_sub(1);
        }
        if let Some(line) = gloss {
            layout.gloss = line.saturating_sub(1);
        }
        self
    }

    pub fn clitic_tables(&self) -> CliticTables {
        self.clitics.clone().unwrap_or_else(CliticTables::statimcets)
    }
}

/// Load a corpus file and check that it matches the configured shape.
pub fn load_corpus<P: AsRef<Path>>(path: P, config: &PipelineConfig) -> Result<Vec<Example>> {
    let path = path.as_ref();
    if !path.exists() {
        bail!("Corpus not found: {}", path.display());
    }

    let examples = corpus::read_file(path)
        .with_context(|| format!("Failed to read corpus {}", path.display()))?;
    let lines = check_shape(&examples, &config.layout)
        .with_context(|| format!("Malformed corpus {}", path.display()))?;
    if !examples.is_empty() && lines != config.lines_per_example {
        bail!(
            "{} has {} lines per example, expected {}",
            path.display(),
            lines,
            config.lines_per_example
        );
    }

    info!(path = %path.display(), examples = examples.len(), "loaded corpus");
    Ok(examples)
}

/// Write a corpus file, creating parent directories as needed.
pub fn save_corpus<P: AsRef<Path>>(path: P, examples: &[Example]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    corpus::write_file(path, examples)
        .with_context(|| format!("Failed to write corpus {}", path.display()))?;
    info!(path = %path.display(), examples = examples.len(), "wrote corpus");
    Ok(())
}
