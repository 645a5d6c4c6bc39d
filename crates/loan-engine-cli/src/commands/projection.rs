use chrono::NaiveDate;
use clap::Args;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use loan_engine_core::amortization::schedule::repayment_schedule;
use loan_engine_core::amortization::{project_loan, CompanyProfile, Loan, ProjectionInput};

use super::resolve_as_of;
use crate::input;

/// Arguments for a single-loan projection
#[derive(Args)]
pub struct ProjectArgs {
    /// Path to JSON input file: {"loan": {...}, "company": {...}, "as_of"?: "YYYY-MM-DD"}
    #[arg(long)]
    pub input: Option<String>,

    /// Append a month-by-month schedule of this many months
    #[arg(long)]
    pub schedule_months: Option<u32>,
}

#[derive(Deserialize)]
struct ProjectRequest {
    loan: Loan,
    company: CompanyProfile,
    #[serde(default)]
    as_of: Option<NaiveDate>,
}

pub fn run_project(
    args: ProjectArgs,
    as_of: Option<NaiveDate>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request: ProjectRequest = input::read_request(args.input.as_deref(), "project")?;
    request.loan.validate()?;
    request.company.validate()?;

    let projection_input = ProjectionInput {
        as_of: resolve_as_of(as_of, request.as_of),
        loan: request.loan,
        company: request.company,
    };
    debug!(loan_id = %projection_input.loan.id, as_of = %projection_input.as_of, "projecting loan");

    let output = project_loan(&projection_input)?;
    let mut value = serde_json::to_value(&output)?;

    if let Some(months) = args.schedule_months {
        let rows = repayment_schedule(&projection_input.loan, projection_input.as_of, months)?;
        value["result"]["schedule"] = serde_json::to_value(rows)?;
    }
    Ok(value)
}
