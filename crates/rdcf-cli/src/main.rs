mod commands;
mod config;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::company::CompanyArgs;
use commands::scenarios::SensitivityArgs;
use commands::valuation::{IntrinsicPeArgs, OvervaluationArgs, ScheduleArgs, ValueArgs};
use commands::Context;
use config::Config;
use input::units::RateUnits;
use telemetry::LogFormat;

/// Reverse-DCF intrinsic P/E and overvaluation analysis
#[derive(Parser)]
#[command(
    name = "rdcf",
    version,
    about = "Reverse-DCF intrinsic P/E and overvaluation analysis",
    long_about = "Computes the P/E multiple a company deserves from a three-phase earnings \
                  model (high growth, linear fade, perpetual terminal growth) and scores \
                  observed market multiples against it, using decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Read rate flags as percentages (10 = 10%)
    #[arg(long, global = true)]
    percent: bool,

    /// Path to a TOML config file (default: ./rdcf.toml if present)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log filter, e.g. "debug" or "rdcf_core=trace"
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Decimal places for displayed multiples and percentages
    #[arg(long, global = true)]
    decimals: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the intrinsic P/E with its full breakdown
    IntrinsicPe(IntrinsicPeArgs),
    /// Print the year-by-year growth and discounting schedule
    Schedule(ScheduleArgs),
    /// Score observed P/E multiples against a known intrinsic P/E
    Overvaluation(OvervaluationArgs),
    /// Compute the intrinsic P/E and score observed multiples against it
    Value(ValueArgs),
    /// Value companies from a metrics file
    Company(CompanyArgs),
    /// Sweep one or two model inputs and tabulate the intrinsic P/E
    Sensitivity(SensitivityArgs),
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

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", "error".red().bold(), message);
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    let config = Config::resolve(cli.config.as_deref()).unwrap_or_else(|e| fail(e));

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.telemetry.log_level.clone());
    let format = if config.telemetry.json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    if let Err(e) = telemetry::init_logging(&level, format) {
        fail(e);
    }

    let ctx = Context {
        units: RateUnits::from_flag(cli.percent || config.display.percent_inputs),
        decimals: cli.decimals.unwrap_or(config.display.decimals),
        config,
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::IntrinsicPe(args) => commands::valuation::run_intrinsic_pe(args, &ctx),
        Commands::Schedule(args) => commands::valuation::run_schedule(args, &ctx),
        Commands::Overvaluation(args) => commands::valuation::run_overvaluation(args, &ctx),
        Commands::Value(args) => commands::valuation::run_value(args, &ctx),
        Commands::Company(args) => commands::company::run_company(args, &ctx),
        Commands::Sensitivity(args) => commands::scenarios::run_sensitivity(args, &ctx),
        Commands::Version => {
            println!("rdcf {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            fail(e);
        }
    }
}
