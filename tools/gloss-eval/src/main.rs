//! Scores a glossed corpus against its gold version and prints the result as
//! a single JSON line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use igt_gloss_core::corpus::{Example, read_file};
use igt_gloss_core::eval::{BoundaryMatch, EvaluationReport, Evaluator, TrainingReference};
use igt_gloss_core::gloss::LangLabels;
use igt_gloss_core::LineLayout;

#[derive(Parser)]
#[command(name = "gloss-eval")]
#[command(about = "Score predicted glosses against a gold corpus")]
#[command(version)]
struct Args {
    gold: PathBuf,
    predicted: PathBuf,

    /// Training corpus, enables OOV and in-vocabulary scores
    #[arg(short, long)]
    train: Option<PathBuf>,

    /// 1-based line number of the segmentation line
    #[arg(long, default_value_t = 2)]
    segmentation_line: usize,

    /// 1-based line number of the gloss line
    #[arg(long, default_value_t = 3)]
    gloss_line: usize,

    /// Characters used as language labels on morphemes
    #[arg(long, default_value = "")]
    lang_labels: String,

    /// Count a boundary as correct only if its type matches too
    #[arg(long)]
    typed_boundaries: bool,
}

#[derive(Debug, Serialize)]
struct EvalOutput {
    gold: String,
    predicted: String,
    examples: usize,
    report: Option<EvaluationReport>,
    error: Option<String>,
}

fn load(path: &PathBuf) -> Result<Vec<Example>> {
    read_file(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn evaluate(args: &Args, gold: &[Example]) -> Result<EvaluationReport> {
    let layout = LineLayout::from_line_numbers(args.segmentation_line, args.gloss_line);
    let matching = if args.typed_boundaries {
        BoundaryMatch::Typed
    } else {
        BoundaryMatch::Untyped
    };
    let mut evaluator = Evaluator::new(layout).with_boundary_match(matching);
    if let Some(path) = &args.train {
        let labels = LangLabels::new(args.lang_labels.chars());
        let reference = TrainingReference::from_examples(&load(path)?, &layout, &labels)?;
        evaluator = evaluator.with_training(reference);
    }
    let predicted = load(&args.predicted)?;
    Ok(evaluator.evaluate(gold, &predicted)?)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let gold = load(&args.gold)?;

    let (report, error) = match evaluate(&args, &gold) {
        Ok(report) => (Some(report), None),
        Err(e) => (None, Some(format!("{e:#}"))),
    };
    let output = EvalOutput {
        gold: args.gold.display().to_string(),
        predicted: args.predicted.display().to_string(),
        examples: gold.len(),
        report,
        error,
    };
    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}
