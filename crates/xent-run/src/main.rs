//! XENT Run - plays game programs against scripted players
//!
//! Runs every (game, player, seed) combination of a run configuration,
//! storing one result file per combination, or resumes a single suspended
//! checkpoint with new responses.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use xent_orchestrator::{
    init_logging, FileStore, Orchestrator, RunConfig, ScriptedPlayers, UnitRecord, UnitStatus,
};
use xent_runtime::{BuiltinJudges, Checkpoint, Game, RunOutcome, ScriptedPlayer, WhenExhausted};

#[derive(Parser, Debug)]
#[command(name = "xent-run")]
#[command(about = "Run XENT game programs against players and a judge")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Path to a run configuration (JSON)
    config: Option<PathBuf>,

    /// Directory for result files (overrides the configuration)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Maximum number of games in flight (overrides the configuration)
    #[arg(long)]
    max_concurrency: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Continue a suspended checkpoint with scripted responses
    Resume {
        /// Result file or bare checkpoint (JSON)
        checkpoint: PathBuf,

        /// Responses handed to the player, in order
        #[arg(long, num_args = 1..)]
        responses: Vec<String>,

        /// Where to write the updated checkpoint (defaults to the input file)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Some(Command::Resume {
            checkpoint,
            responses,
            out,
        }) => resume(checkpoint, responses, out),
        None => match cli.config {
            Some(config) => run(config, cli.output, cli.max_concurrency).await,
            None => Err(anyhow::anyhow!("a run configuration path is required")),
        },
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(config_path: PathBuf, output: Option<PathBuf>, max_concurrency: Option<usize>) -> Result<()> {
    info!("Loading run configuration from: {}", config_path.display());
    let mut config = RunConfig::from_file(&config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    if let Some(output) = output {
        config.output_dir = output;
    }
    if let Some(max_concurrency) = max_concurrency {
        config.max_concurrency = max_concurrency;
    }

    let units = config.work_units().context("failed to prepare work units")?;
    let store = FileStore::new(&config.output_dir).context("failed to open result directory")?;
    info!(
        units = units.len(),
        output = %store.dir().display(),
        max_concurrency = config.max_concurrency,
        "starting run"
    );

    let orchestrator = Orchestrator::new(
        config.max_concurrency,
        Arc::new(store),
        Arc::new(ScriptedPlayers),
        Arc::new(BuiltinJudges),
    )
    .with_judge(config.judge.clone());

    let reports = orchestrator.run(units).await;
    for report in &reports {
        match &report.status {
            UnitStatus::Completed { total_score } => info!(key = %report.key, total_score, "completed"),
            UnitStatus::Skipped { total_score } => info!(key = %report.key, total_score, "skipped"),
            UnitStatus::Suspended => warn!(key = %report.key, "suspended"),
            UnitStatus::Failed { error } => error!(key = %report.key, error = %error, "failed"),
        }
    }
    println!("{}", serde_json::to_string_pretty(&reports)?);

    if reports.iter().any(|r| matches!(r.status, UnitStatus::Failed { .. })) {
        bail!("some work units failed");
    }
    Ok(())
}

fn resume(path: PathBuf, responses: Vec<String>, out: Option<PathBuf>) -> Result<()> {
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut record: Option<UnitRecord> = serde_json::from_str(&json).ok();
    let checkpoint = match &record {
        Some(record) => record.checkpoint.clone(),
        None => Checkpoint::from_json(&json).context("not a result record or checkpoint")?,
    };

    let suspended = match checkpoint {
        Checkpoint::Results(rounds) => {
            info!(rounds = rounds.len(), "checkpoint is already complete");
            return Ok(());
        }
        Checkpoint::State(suspended) => suspended,
    };

    let mut game = Game::resume(*suspended, &BuiltinJudges).context("failed to resume game")?;
    let mut player = ScriptedPlayer::new("resume", responses).when_exhausted(WhenExhausted::Halt);
    let outcome = game.run(&mut player).context("game failed")?;

    let summary = game.summary();
    let checkpoint = match outcome {
        RunOutcome::Finished(summary) => {
            info!(total_score = summary.total_score, "game finished");
            Checkpoint::from(summary)
        }
        RunOutcome::Suspended(suspended) => {
            warn!(line = suspended.vm.line, "player halted again");
            Checkpoint::State(suspended)
        }
    };

    let out = out.unwrap_or(path);
    let json = match record.as_mut() {
        Some(record) => {
            record.total_score = summary.total_score;
            record.usage = summary.usage;
            record.checkpoint = checkpoint;
            serde_json::to_string_pretty(record)?
        }
        None => checkpoint.to_json()?,
    };
    std::fs::write(&out, json).with_context(|| format!("failed to write {}", out.display()))?;
    info!("Wrote checkpoint to: {}", out.display());
    Ok(())
}
