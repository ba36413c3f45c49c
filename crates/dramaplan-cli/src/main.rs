//! Dramaplan - short-drama story evaluation CLI
//!
//! The `dramaplan` command drives the batch evaluation pipeline offline,
//! replaying captured evaluator responses from disk.
//!
//! ## Commands
//!
//! - `evaluate`: run a full multi-round evaluation and print the report
//! - `score`: extract the numeric score from a single response file

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};

use dramaplan_core::{
    extract_score, init_tracing, run_batch_evaluation, text_prep, write_report_json, BatchConfig,
    EvaluationReport, EvaluatorRegistry, ReplayEvaluator,
};

#[derive(Parser)]
#[command(name = "dramaplan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Short-drama story evaluation pipeline", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a multi-round batch evaluation over a story file
    Evaluate(EvaluateArgs),

    /// Extract the numeric score from one evaluation response file
    Score {
        /// Path to the response text file
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Args)]
struct EvaluateArgs {
    /// Path to the story text file
    #[arg(short, long)]
    story: PathBuf,

    /// Theme/context passed uniformly to every round
    #[arg(short, long, default_value = "")]
    theme: String,

    /// Directory containing captured round responses (round-<n>.txt)
    #[arg(long)]
    replay_dir: PathBuf,

    /// Number of evaluation rounds
    #[arg(long, default_value_t = dramaplan_core::DEFAULT_ROUNDS)]
    rounds: usize,

    /// Maximum concurrently in-flight evaluation calls
    #[arg(long, default_value_t = dramaplan_core::DEFAULT_PARALLEL_LIMIT)]
    max_concurrent: usize,

    /// Per-round deadline in seconds
    #[arg(long, default_value_t = 60)]
    round_timeout: u64,

    /// Truncate the story to this many characters before evaluation
    #[arg(long, default_value_t = text_prep::DEFAULT_MAX_LENGTH)]
    max_length: usize,

    /// Optional output path for the JSON report artifact
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Run the `evaluate` command: prepare the story text, replay the captured
/// rounds through the pipeline, and optionally persist the JSON artifact.
async fn cmd_evaluate(args: &EvaluateArgs) -> Result<EvaluationReport> {
    let raw = std::fs::read_to_string(&args.story)
        .with_context(|| format!("read story file {:?}", args.story))?;
    let story_text = text_prep::truncate(&raw, args.max_length);

    let registry = EvaluatorRegistry::new().with_capability(
        "story_evaluation",
        Arc::new(ReplayEvaluator::new(args.replay_dir.clone())),
    );
    let evaluator = registry.get("story_evaluation")?;

    let config = BatchConfig {
        requested_rounds: args.rounds,
        max_concurrent: args.max_concurrent,
        round_timeout: Duration::from_secs(args.round_timeout),
    };

    let report = run_batch_evaluation(evaluator, &story_text, &args.theme, config).await?;
    info!(
        batch_id = %report.batch_id,
        rating = %report.rating,
        round_count = report.round_count,
        "batch evaluation finished"
    );

    if let Some(path) = &args.output {
        write_report_json(path, &report)?;
    }

    Ok(report)
}

/// Run the `score` command: extract the score from one response file.
fn cmd_score(file: &PathBuf) -> Result<f64> {
    let text =
        std::fs::read_to_string(file).with_context(|| format!("read response file {:?}", file))?;
    match extract_score(&text) {
        Some(score) => Ok(score),
        None => bail!("no score pattern matched in {:?}", file),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match cli.command {
        Commands::Evaluate(args) => {
            let report = cmd_evaluate(&args).await?;
            println!("{}", report.report_text);
            if let Some(path) = &args.output {
                println!("report artifact written to {}", path.display());
            }
        }

        Commands::Score { file } => {
            let score = cmd_score(&file)?;
            println!("{score}");
        }
    }

    Ok(())
}
