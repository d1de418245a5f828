//! Command-line entry point for corpus normalization, glossing and scoring.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use igt_gloss_core::eval::BoundaryMatch;
use igt_gloss_trainer::{RunConfig, Trainer, load_corpus, save_corpus};

#[derive(Parser)]
#[command(name = "igt-gloss")]
#[command(about = "Normalize, gloss and evaluate interlinear glossed text")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON run configuration
    #[arg(short, long, env = "IGT_GLOSS_CONFIG")]
    config: Option<PathBuf>,

    /// 1-based line number of the segmentation line
    #[arg(long)]
    segmentation_line: Option<usize>,

    /// 1-based line number of the gloss line
    #[arg(long)]
    gloss_line: Option<usize>,

    /// Count a boundary as correct only if its type matches too
    #[arg(long)]
    typed_boundaries: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Report formatting problems and list the glosses in a corpus
    Prescreen {
        input: PathBuf,
        /// Also print the gloss inventory
        #[arg(short, long)]
        inventory: bool,
    },
    /// Tidy a corpus and normalize its boundaries
    Normalize {
        input: PathBuf,
        output: PathBuf,
        /// Drop examples that are still misaligned
        #[arg(short, long)]
        filter: bool,
    },
    /// Train on one corpus, gloss another and score the result
    Gloss {
        train: PathBuf,
        test: PathBuf,
        /// Where to write the glossed test corpus
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Where to save the trained model
        #[arg(short, long)]
        model: Option<PathBuf>,
    },
    /// Score a glossed corpus against its gold version
    Evaluate {
        gold: PathBuf,
        predicted: PathBuf,
        /// Training corpus, enables OOV and in-vocabulary scores
        #[arg(short, long)]
        train: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = RunConfig::load(cli.config.as_deref())?
        .with_line_numbers(cli.segmentation_line, cli.gloss_line);
    let trainer = Trainer::new(config).context("Failed to set up trainer")?;
    let matching = if cli.typed_boundaries {
        BoundaryMatch::Typed
    } else {
        BoundaryMatch::Untyped
    };
    let pipeline = &trainer.config().pipeline;

    match cli.command {
        Commands::Prescreen { input, inventory } => {
            let examples = load_corpus(&input, pipeline)?;
            let result = trainer.prescreen(&examples)?;
            print!("{}", result.report);
            if inventory {
                print!("{}", result.inventory);
            }
        }
        Commands::Normalize {
            input,
            output,
            filter,
        } => {
            let examples = load_corpus(&input, pipeline)?;
            let result = trainer.normalize(&examples, filter)?;
            save_corpus(&output, &result.examples)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            print!("{}", result.residual);
        }
        Commands::Gloss {
            train,
            test,
            output,
            model,
        } => {
            let train = load_corpus(&train, pipeline)?;
            let test = load_corpus(&test, pipeline)?;
            let run = trainer.gloss(&train, &test, matching, model.as_deref())?;
            if let Some(output) = output {
                write_with_gold(&output, &run.predicted, &test)?;
            }
            print!("{}", run.report);
        }
        Commands::Evaluate {
            gold,
            predicted,
            train,
        } => {
            let gold = load_corpus(&gold, pipeline)?;
            let predicted = load_corpus(&predicted, pipeline)?;
            let train = train.map(|path| load_corpus(path, pipeline)).transpose()?;
            let report = trainer.evaluate(&gold, &predicted, train.as_deref(), matching)?;
            print!("{report}");
        }
    }

    Ok(())
}

/// Write the predictions next to a copy of the gold corpus.
fn write_with_gold(
    output: &Path,
    predicted: &[igt_gloss_core::Example],
    gold: &[igt_gloss_core::Example],
) -> Result<()> {
    save_corpus(output, predicted)?;
    let gold_path = output.with_extension("gold.txt");
    save_corpus(&gold_path, gold)?;
    info!(predicted = %output.display(), gold = %gold_path.display(), "wrote glossed corpus");
    Ok(())
}
