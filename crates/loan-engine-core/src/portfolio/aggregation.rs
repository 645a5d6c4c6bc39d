use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::checked_sum;
use super::filter::LoanFilter;
use super::grouping::{group_by, GroupKey, LoanGroup};
use crate::amortization::projection::{project, remaining_months, ProjectionResult};
use crate::amortization::{CompanyProfile, Loan};
use crate::{types::*, LoanEngineError, LoanEngineResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioInput {
    pub company: CompanyProfile,
    pub as_of: NaiveDate,
    pub loans: Vec<Loan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<LoanFilter>,
}

/// Mutually exclusive portfolio classification, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Hidden,
    Rescheduled,
    Finished,
    Active,
}

/// An active loan together with its projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveLoan {
    pub loan: Loan,
    pub projection: ProjectionResult,
}

/// Sums over the active bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTotals {
    pub total_principal: Money,
    pub total_monthly_repayment: Money,
    pub total_balances_monthly: [Money; PROJECTION_MONTHS],
    pub total_interest_amount_monthly: [Money; PROJECTION_MONTHS],
    pub total_balance_fy1: Money,
    pub total_balance_fy2: Money,
    pub total_balance_fy3: Money,
    pub total_balance_fy4: Money,
    pub total_balance_fy5: Money,
}

/// Loans split into buckets, with totals over the active one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Sorted by (lender, guarantee type).
    pub active: Vec<ActiveLoan>,
    pub hidden: Vec<Loan>,
    pub rescheduled: Vec<Loan>,
    pub finished: Vec<Loan>,
    pub totals: PortfolioTotals,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub company: String,
    pub as_of: NaiveDate,
    #[serde(flatten)]
    pub summary: PortfolioSummary,
    /// Only slot 0 (current month) is computed; the rest are zero.
    pub weighted_average_interest: [Percent; PROJECTION_MONTHS],
    pub by_lender: Vec<LoanGroup>,
    pub by_guarantee_type: Vec<LoanGroup>,
    pub by_lender_and_guarantee_type: Vec<LoanGroup>,
    /// Loans dropped by the filter before classification.
    pub filtered_out: usize,
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

impl Default for PortfolioTotals {
    fn default() -> Self {
        Self {
            total_principal: Decimal::ZERO,
            total_monthly_repayment: Decimal::ZERO,
            total_balances_monthly: [Decimal::ZERO; PROJECTION_MONTHS],
            total_interest_amount_monthly: [Decimal::ZERO; PROJECTION_MONTHS],
            total_balance_fy1: Decimal::ZERO,
            total_balance_fy2: Decimal::ZERO,
            total_balance_fy3: Decimal::ZERO,
            total_balance_fy4: Decimal::ZERO,
            total_balance_fy5: Decimal::ZERO,
        }
    }
}

impl PortfolioTotals {
    /// Add one active loan. Overflow is an error, never a saturated total.
    pub fn accumulate(&mut self, loan: &Loan, projection: &ProjectionResult) -> LoanEngineResult<()> {
        let context = "portfolio totals";
        self.total_principal = checked_sum(self.total_principal, loan.principal, context)?;
        self.total_monthly_repayment =
            checked_sum(self.total_monthly_repayment, loan.monthly_repayment, context)?;
        for i in 0..PROJECTION_MONTHS {
            self.total_balances_monthly[i] = checked_sum(
                self.total_balances_monthly[i],
                projection.balances_monthly[i],
                context,
            )?;
            self.total_interest_amount_monthly[i] = checked_sum(
                self.total_interest_amount_monthly[i],
                projection.interest_amount_monthly[i],
                context,
            )?;
        }
        self.total_balance_fy1 = checked_sum(self.total_balance_fy1, projection.balance_fy1, context)?;
        self.total_balance_fy2 = checked_sum(self.total_balance_fy2, projection.balance_fy2, context)?;
        self.total_balance_fy3 = checked_sum(self.total_balance_fy3, projection.balance_fy3, context)?;
        self.total_balance_fy4 = checked_sum(self.total_balance_fy4, projection.balance_fy4, context)?;
        self.total_balance_fy5 = checked_sum(self.total_balance_fy5, projection.balance_fy5, context)?;
        Ok(())
    }

    pub fn total_balances_fiscal_years(&self) -> [Money; FISCAL_YEARS] {
        [
            self.total_balance_fy1,
            self.total_balance_fy2,
            self.total_balance_fy3,
            self.total_balance_fy4,
            self.total_balance_fy5,
        ]
    }

    /// Combine the totals of two disjoint loan sets.
    pub fn checked_add(&self, other: &Self) -> LoanEngineResult<Self> {
        let context = "combined portfolio totals";
        let mut combined = Self {
            total_principal: checked_sum(self.total_principal, other.total_principal, context)?,
            total_monthly_repayment: checked_sum(
                self.total_monthly_repayment,
                other.total_monthly_repayment,
                context,
            )?,
            total_balance_fy1: checked_sum(self.total_balance_fy1, other.total_balance_fy1, context)?,
            total_balance_fy2: checked_sum(self.total_balance_fy2, other.total_balance_fy2, context)?,
            total_balance_fy3: checked_sum(self.total_balance_fy3, other.total_balance_fy3, context)?,
            total_balance_fy4: checked_sum(self.total_balance_fy4, other.total_balance_fy4, context)?,
            total_balance_fy5: checked_sum(self.total_balance_fy5, other.total_balance_fy5, context)?,
            ..Self::default()
        };
        for i in 0..PROJECTION_MONTHS {
            combined.total_balances_monthly[i] = checked_sum(
                self.total_balances_monthly[i],
                other.total_balances_monthly[i],
                context,
            )?;
            combined.total_interest_amount_monthly[i] = checked_sum(
                self.total_interest_amount_monthly[i],
                other.total_interest_amount_monthly[i],
                context,
            )?;
        }
        Ok(combined)
    }
}

/// Totals over already-projected active loans.
pub fn totals_of(active: &[ActiveLoan]) -> LoanEngineResult<PortfolioTotals> {
    let mut totals = PortfolioTotals::default();
    for entry in active {
        totals.accumulate(&entry.loan, &entry.projection)?;
    }
    Ok(totals)
}

/// Annualised weighted average rate for the current month, in percent.
///
/// 12 * interest[0] / balance[0] * 100. Slots 1..12 stay zero: the vector is
/// consumed positionally by a 12-column display grid.
pub fn weighted_average_interest(
    totals: &PortfolioTotals,
) -> LoanEngineResult<[Percent; PROJECTION_MONTHS]> {
    let mut rates = [Decimal::ZERO; PROJECTION_MONTHS];
    let balance = totals.total_balances_monthly[0];
    if !balance.is_zero() {
        rates[0] = totals.total_interest_amount_monthly[0]
            .checked_mul(dec!(12))
            .and_then(|v| v.checked_div(balance))
            .and_then(|v| v.checked_mul(dec!(100)))
            .ok_or_else(|| LoanEngineError::ArithmeticOverflow {
                context: "weighted average interest".into(),
            })?;
    }
    Ok(rates)
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Bucket for one loan: hidden, then rescheduled, then finished, else active.
pub fn classify(loan: &Loan, as_of: NaiveDate) -> LoanEngineResult<Bucket> {
    if loan.is_nodisplay {
        return Ok(Bucket::Hidden);
    }
    if loan.is_rescheduled {
        return Ok(Bucket::Rescheduled);
    }
    if remaining_months(loan, as_of)? < 1 {
        return Ok(Bucket::Finished);
    }
    Ok(Bucket::Active)
}

/// Classify every loan once and sum the active bucket.
pub fn summarize(
    loans: &[Loan],
    company: &CompanyProfile,
    as_of: NaiveDate,
) -> LoanEngineResult<PortfolioSummary> {
    let mut active: Vec<ActiveLoan> = Vec::new();
    let mut hidden = Vec::new();
    let mut rescheduled = Vec::new();
    let mut finished = Vec::new();
    let mut totals = PortfolioTotals::default();

    for loan in loans {
        let bucket = classify(loan, as_of)?;
        debug!(loan_id = %loan.id, ?bucket, "classified loan");
        match bucket {
            Bucket::Hidden => hidden.push(loan.clone()),
            Bucket::Rescheduled => rescheduled.push(loan.clone()),
            Bucket::Finished => finished.push(loan.clone()),
            Bucket::Active => {
                let projection = project(loan, company, as_of)?;
                totals.accumulate(loan, &projection)?;
                active.push(ActiveLoan {
                    loan: loan.clone(),
                    projection,
                });
            }
        }
    }

    active.sort_by(|a, b| {
        (a.loan.lender.as_str(), a.loan.guarantee_type.as_str())
            .cmp(&(b.loan.lender.as_str(), b.loan.guarantee_type.as_str()))
    });

    Ok(PortfolioSummary {
        active,
        hidden,
        rescheduled,
        finished,
        totals,
    })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Classify, total and group a company's loans as of a reference date.
#[instrument(skip_all, fields(company = %input.company.name, loans = input.loans.len()))]
pub fn aggregate_portfolio(
    input: &PortfolioInput,
) -> LoanEngineResult<ComputationOutput<PortfolioReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.company.validate()?;

    let loans: Vec<Loan> = match &input.filter {
        Some(filter) => input
            .loans
            .iter()
            .filter(|loan| filter.matches(loan))
            .cloned()
            .collect(),
        None => input.loans.clone(),
    };
    let filtered_out = input.loans.len() - loans.len();

    let summary = summarize(&loans, &input.company, input.as_of)?;

    if summary.active.is_empty() {
        warnings.push("No active loans; all totals are zero.".into());
    }
    let approximate: Vec<&str> = summary
        .active
        .iter()
        .filter(|a| !a.loan.debt_type.has_dedicated_projection())
        .map(|a| a.loan.id.as_str())
        .collect();
    if !approximate.is_empty() {
        warn!(loans = ?approximate, "approximate projections in portfolio totals");
        warnings.push(format!(
            "Loans {} are not monthly certificates; their balances are approximate.",
            approximate.join(", ")
        ));
    }

    let weighted_average_interest = weighted_average_interest(&summary.totals)?;
    let by_lender = group_by(&summary.active, GroupKey::Lender)?;
    let by_guarantee_type = group_by(&summary.active, GroupKey::GuaranteeType)?;
    let by_lender_and_guarantee_type = group_by(&summary.active, GroupKey::LenderAndGuaranteeType)?;

    info!(
        active = summary.active.len(),
        hidden = summary.hidden.len(),
        rescheduled = summary.rescheduled.len(),
        finished = summary.finished.len(),
        filtered_out,
        "aggregated portfolio"
    );

    let report = PortfolioReport {
        company: input.company.name.clone(),
        as_of: input.as_of,
        summary,
        weighted_average_interest,
        by_lender,
        by_guarantee_type,
        by_lender_and_guarantee_type,
        filtered_out,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "classification_order": ["hidden", "rescheduled", "finished", "active"],
        "totals_scope": "active loans only",
        "active_sort": "lender, guarantee_type",
        "weighted_average_interest": "current month only: 12 * interest / balance * 100",
    });

    Ok(with_metadata(
        "Loan portfolio classification and aggregation",
        &assumptions,
        warnings,
        elapsed,
        report,
    ))
}
