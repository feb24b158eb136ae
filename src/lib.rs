pub mod analysis;
pub mod commands;
pub mod config;
pub mod hevy;
pub mod mapper;
pub mod models;
pub mod planner;
pub mod progression;
pub mod publisher;

#[cfg(test)]
mod test_utils;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::plan::PlanArgs;
use commands::CommandError;
use config::{AppConfig, DEFAULT_CONFIG_PATH};

#[derive(Parser)]
#[command(
  name = "hevy-planner",
  about = "Plan today's hypertrophy routine from your Hevy history",
  long_about = "Analyzes Hevy workout history, plans a progressive upper-body routine and publishes it back to Hevy."
)]
struct Cli {
  #[command(subcommand)]
  command: Command,

  /// Path to the JSON config file
  #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
  config: PathBuf,

  /// Enable debug logging
  #[arg(long, short = 'v', global = true)]
  verbose: bool,
}

#[derive(Subcommand)]
enum Command {
  /// Plan today's routine and publish it to Hevy
  Plan {
    /// Print the routine without sending it
    #[arg(long)]
    dry_run: bool,

    /// Planning date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Target session length in minutes
    #[arg(long)]
    duration: Option<u32>,

    /// Routine folder to publish into, created when missing (default: AI Routines)
    #[arg(long)]
    folder: Option<String>,

    /// Seed for reproducible exercise selection
    #[arg(long)]
    seed: Option<u64>,
  },

  /// Show analyzed stats for exercises matching the focus muscles
  Stats {
    /// Number of exercises to show
    #[arg(long, default_value = "30")]
    limit: usize,

    /// End of the history window (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
  },

  /// List existing routines and folders
  Routines,
}

fn init_logging(verbose: bool) {
  let level = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();
}

async fn dispatch(command: Command, config: &AppConfig) -> Result<(), CommandError> {
  match command {
    Command::Plan {
      dry_run,
      date,
      duration,
      folder,
      seed,
    } => {
      let args = PlanArgs {
        dry_run,
        date,
        duration,
        folder,
        seed,
      };
      commands::plan::run(config, args).await?;
    }
    Command::Stats { limit, date } => {
      commands::stats::run(config, limit, date).await?;
    }
    Command::Routines => commands::routines::run(config).await?,
  }
  Ok(())
}

pub fn run() -> Result<(), CommandError> {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  let cli = Cli::parse();
  init_logging(cli.verbose);

  let config = AppConfig::load(&cli.config)?;

  let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
  runtime.block_on(dispatch(cli.command, &config))
}
