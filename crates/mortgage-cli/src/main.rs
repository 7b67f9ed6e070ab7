mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::calculate::{CalculateArgs, ScheduleArgs};
use commands::compare::CompareArgs;

/// Mortgage amortization and valuation calculations
#[derive(Parser)]
#[command(
    name = "mort",
    version,
    about = "Mortgage amortization and valuation calculations",
    long_about = "A CLI for computing mortgage amortization schedules and \
                  valuation metrics with decimal precision. Supports \
                  conventional, adjustable-rate, interest-only, and hybrid \
                  interest-only loans, plus side-by-side scenario comparison."
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
    /// Run a full loan calculation (schedule plus valuation metrics)
    Calculate(CalculateArgs),
    /// Print only the amortization schedule rows
    Schedule(ScheduleArgs),
    /// Calculate several scenarios and compare them side by side
    Compare(CompareArgs),
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
        Commands::Calculate(args) => commands::calculate::run_calculate(args),
        Commands::Schedule(args) => commands::calculate::run_schedule(args),
        Commands::Compare(args) => commands::compare::run_compare(args),
        Commands::Version => {
            println!("mort {}", env!("CARGO_PKG_VERSION"));
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
