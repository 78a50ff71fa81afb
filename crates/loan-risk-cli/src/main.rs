mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::reconcile::ReconcileArgs;
use commands::score::ScoreArgs;

/// Offline loan risk scoring
#[derive(Parser)]
#[command(
    name = "lrs",
    version,
    about = "Offline loan risk scoring",
    long_about = "Scores loan applications against the risk and grade model artifacts \
                  and reconciles the two severities into a final prediction. Nothing \
                  is written to the warehouse."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one application from a JSON file or stdin
    Score(ScoreArgs),
    /// Map model codes to labels and reconcile them
    Reconcile(ReconcileArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Score(args) => commands::score::run_score(args),
        Commands::Reconcile(args) => commands::reconcile::run_reconcile(args),
        Commands::Version => {
            println!("lrs {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
