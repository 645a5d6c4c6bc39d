use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_engine_core::benchmark::{
    score_indicator, BenchmarkTable, CompanySize, Indicator, IndustrySegment, ScoreRequest,
};
use loan_engine_core::ratios::{score_fiscal_year, ScorecardInput};
use loan_engine_core::EngineSettings;

use crate::input;

/// Arguments for scoring a single indicator value
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScoreArgs {
    /// Path to the benchmark table (JSON array of ranges)
    #[arg(long)]
    pub benchmarks: String,

    /// Path to JSON score request (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Industry classification code
    #[arg(long)]
    pub industry: Option<String>,

    /// Industry subclassification code
    #[arg(long)]
    pub subclass: Option<String>,

    /// Company size: s, m or l
    #[arg(long)]
    pub size: Option<CompanySize>,

    /// Fiscal year the value belongs to
    #[arg(long)]
    pub year: Option<i32>,

    /// Indicator name, e.g. operating_profit_margin
    #[arg(long)]
    pub indicator: Option<Indicator>,

    /// Indicator value
    #[arg(long)]
    pub value: Option<Decimal>,

    /// EBITDA behind an EBITDA / debt ratio
    #[arg(long)]
    pub ebitda: Option<Decimal>,
}

/// Arguments for a full fiscal-year scorecard
#[derive(Args)]
pub struct ScorecardArgs {
    /// Path to the benchmark table (JSON array of ranges)
    #[arg(long)]
    pub benchmarks: String,

    /// Path to JSON input: {"segment": {...}, "summary": {...}, "previous_sales"?: ...}
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_score(args: ScoreArgs, settings: &EngineSettings) -> Result<Value, Box<dyn std::error::Error>> {
    let table: BenchmarkTable = input::file::read_json(&args.benchmarks)?;

    let request: ScoreRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::piped_json()? {
        serde_json::from_value(data)?
    } else {
        ScoreRequest {
            segment: IndustrySegment {
                industry_classification: args
                    .industry
                    .ok_or("--industry is required (or provide --input)")?,
                industry_subclassification: args
                    .subclass
                    .ok_or("--subclass is required (or provide --input)")?,
                company_size: args.size.ok_or("--size is required (or provide --input)")?,
            },
            year: args.year.ok_or("--year is required (or provide --input)")?,
            indicator: args
                .indicator
                .ok_or("--indicator is required (or provide --input)")?,
            value: args.value.ok_or("--value is required (or provide --input)")?,
            ebitda: args.ebitda,
        }
    };

    let output = score_indicator(&table, &request, settings)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_scorecard(
    args: ScorecardArgs,
    settings: &EngineSettings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let table: BenchmarkTable = input::file::read_json(&args.benchmarks)?;
    if table.is_empty() {
        return Err(format!("benchmark table '{}' is empty", args.benchmarks).into());
    }
    let scorecard_input: ScorecardInput = input::read_request(args.input.as_deref(), "scorecard")?;

    let output = score_fiscal_year(&scorecard_input, &table, settings)?;
    Ok(serde_json::to_value(output)?)
}
