use chrono::NaiveDate;
use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use loan_engine_core::amortization::{CompanyProfile, Loan};
use loan_engine_core::portfolio::{aggregate_portfolio, LoanFilter, PortfolioInput};

use super::resolve_as_of;
use crate::input;

/// Arguments for portfolio aggregation
#[derive(Args)]
pub struct PortfolioArgs {
    /// Path to JSON input file: {"company": {...}, "loans": [...], "filter"?: {...}}
    #[arg(long)]
    pub input: Option<String>,

    /// Case-insensitive search over lender and guarantee type names
    #[arg(long)]
    pub search: Option<String>,

    /// Only loans from this lender (exact name)
    #[arg(long)]
    pub lender: Option<String>,

    /// Only loans with this guarantee type (exact name)
    #[arg(long)]
    pub guarantee_type: Option<String>,

    /// Only collateralised loans
    #[arg(long)]
    pub collateraled: bool,

    /// Only loans secured by management
    #[arg(long)]
    pub securedby_management: bool,
}

#[derive(Deserialize)]
struct PortfolioRequest {
    company: CompanyProfile,
    #[serde(default)]
    loans: Vec<Loan>,
    #[serde(default)]
    filter: Option<LoanFilter>,
    #[serde(default)]
    as_of: Option<NaiveDate>,
}

impl PortfolioArgs {
    /// Merge command-line filters over the filter from the request file.
    fn apply_to(&self, filter: Option<LoanFilter>) -> Option<LoanFilter> {
        let flags_given = self.search.is_some()
            || self.lender.is_some()
            || self.guarantee_type.is_some()
            || self.collateraled
            || self.securedby_management;
        if !flags_given {
            return filter;
        }

        let mut filter = filter.unwrap_or_default();
        if let Some(search) = &self.search {
            filter.search = Some(search.clone());
        }
        if let Some(lender) = &self.lender {
            filter.lender = Some(lender.clone());
        }
        if let Some(guarantee_type) = &self.guarantee_type {
            filter.guarantee_type = Some(guarantee_type.clone());
        }
        if self.collateraled {
            filter.is_collateraled = Some(true);
        }
        if self.securedby_management {
            filter.is_securedby_management = Some(true);
        }
        Some(filter)
    }
}

pub fn run_portfolio(
    args: PortfolioArgs,
    as_of: Option<NaiveDate>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request: PortfolioRequest = input::read_request(args.input.as_deref(), "portfolio")?;
    let filter = args.apply_to(request.filter);
    validate_projected(&request.loans, filter.as_ref())?;

    let portfolio_input = PortfolioInput {
        company: request.company,
        as_of: resolve_as_of(as_of, request.as_of),
        loans: request.loans,
        filter,
    };

    let output = aggregate_portfolio(&portfolio_input)?;
    Ok(serde_json::to_value(output)?)
}

/// Validate the loans aggregation will project. Hidden, rescheduled and
/// filtered-out loans are only listed, so their terms are not checked.
fn validate_projected(loans: &[Loan], filter: Option<&LoanFilter>) -> Result<(), String> {
    loans
        .iter()
        .filter(|loan| !loan.is_nodisplay && !loan.is_rescheduled)
        .filter(|loan| filter.map_or(true, |f| f.matches(loan)))
        .try_for_each(|loan| {
            loan.validate()
                .map_err(|e| format!("loan '{}': {}", loan.id, e))
        })
}
