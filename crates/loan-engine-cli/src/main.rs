mod commands;
mod config;
mod input;
mod output;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::prelude::*;

use commands::benchmark::{ScoreArgs, ScorecardArgs};
use commands::portfolio::PortfolioArgs;
use commands::projection::ProjectArgs;
use config::CliConfig;

/// Loan balance projection, portfolio totals and industry benchmark scoring
#[derive(Parser)]
#[command(
    name = "loanctl",
    version,
    about = "Loan balance projection, portfolio totals and industry benchmark scoring",
    long_about = "A CLI over the loan engine: projects monthly and fiscal-year balances \
                  for fixed-instalment loans, classifies and totals a company's loan \
                  portfolio, and scores financial ratios against industry benchmarks."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Config file (YAML, or JSON by extension); falls back to $LOANCTL_CONFIG
    #[arg(long, global = true)]
    config: Option<String>,

    /// Reference date (YYYY-MM-DD); defaults to today
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Project balances and interest for a single loan
    Project(ProjectArgs),
    /// Classify, total and group a company's loans
    Portfolio(PortfolioArgs),
    /// Score one indicator value against a benchmark table
    Score(ScoreArgs),
    /// Compute a fiscal year's ratios and score them against a benchmark table
    Scorecard(ScorecardArgs),
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

fn init_tracing(config: &CliConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.log_level;
        format!("loan_engine_core={level},loanctl={level}").into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if config.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };
    subscriber.with(fmt_layer).init();
}

fn fail(e: Box<dyn std::error::Error>) -> ! {
    eprintln!("{}: {}", "error".red().bold(), e);
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    let config = config::load(cli.config.as_deref()).unwrap_or_else(|e| fail(e));
    init_tracing(&config);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Project(args) => commands::projection::run_project(args, cli.as_of),
        Commands::Portfolio(args) => commands::portfolio::run_portfolio(args, cli.as_of),
        Commands::Score(args) => commands::benchmark::run_score(args, &config.engine),
        Commands::Scorecard(args) => commands::benchmark::run_scorecard(args, &config.engine),
        Commands::Version => {
            println!("loanctl {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => fail(e),
    }
}
