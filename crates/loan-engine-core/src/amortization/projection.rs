//! Date-relative repayment projection for a single loan.
//!
//! Every loan is treated as fully amortising at a flat `monthly_repayment`:
//! 1. **Payment terms** -- floor((principal + adjustments) / monthly) + grace months.
//! 2. **Elapsed months** -- 1-indexed from the start month, <= 0 before it.
//! 3. **Balance after n months** -- principal - (monthly * n + first adjustment),
//!    clamped to [0, principal].
//! 4. **Interest** -- simple monthly accrual: balance * rate / 12 / 100.
//!
//! "Now" is always passed in; nothing here reads a clock.

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument, warn};

use super::loan::{CompanyProfile, DebtType, Loan};
use crate::calendar::{check_month, months_between};
use crate::{types::*, LoanEngineError, LoanEngineResult};

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionInput {
    pub loan: Loan,
    pub company: CompanyProfile,
    /// Reference date standing in for "now".
    pub as_of: NaiveDate,
}

/// Which formula produced the numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionBasis {
    MonthlyAmortization,
    /// Non-certificate debt run through the monthly formula.
    ApproximateMonthlyAmortization,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub loan_id: String,
    pub debt_type: DebtType,
    pub projection_basis: ProjectionBasis,
    pub months_suspended: Months,
    pub payment_terms: Months,
    pub elapsed_months: Months,
    pub remaining_months: Months,
    pub repayment_started: bool,
    pub months_to_fiscal_year_end: Months,
    pub balances_monthly: [Money; PROJECTION_MONTHS],
    pub interest_amount_monthly: [Money; PROJECTION_MONTHS],
    pub balance_fy1: Money,
    pub balance_fy2: Money,
    pub balance_fy3: Money,
    pub balance_fy4: Money,
    pub balance_fy5: Money,
}

impl ProjectionResult {
    pub fn balances_fiscal_years(&self) -> [Money; FISCAL_YEARS] {
        [
            self.balance_fy1,
            self.balance_fy2,
            self.balance_fy3,
            self.balance_fy4,
            self.balance_fy5,
        ]
    }
}

// ---------------------------------------------------------------------------
// Projector primitives
// ---------------------------------------------------------------------------

/// Grace months between drawdown and the first repayment.
pub fn months_suspended(loan: &Loan) -> Months {
    months_between(loan.issue_date, loan.start_date)
}

/// Total number of instalments, grace months included.
pub fn payment_terms(loan: &Loan) -> LoanEngineResult<Months> {
    if loan.monthly_repayment.is_zero() {
        return Err(LoanEngineError::DivisionByZero {
            context: format!("payment terms of loan {}", loan.id),
        });
    }
    let instalments = loan
        .principal
        .checked_add(loan.adjusted_amount_first)
        .and_then(|total| total.checked_add(loan.adjusted_amount_last))
        .and_then(|total| total.checked_div(loan.monthly_repayment))
        .and_then(|terms| terms.floor().to_i32())
        .ok_or_else(|| overflow(loan, "payment terms"))?;
    Ok(instalments + months_suspended(loan))
}

/// Months since repayment start; the start month counts as 1.
pub fn elapsed_months(loan: &Loan, as_of: NaiveDate) -> Months {
    months_between(loan.start_date, as_of) + 1
}

pub fn remaining_months(loan: &Loan, as_of: NaiveDate) -> LoanEngineResult<Months> {
    Ok((payment_terms(loan)? - elapsed_months(loan, as_of)).max(0))
}

/// Outstanding balance after `months` repayments, clamped to [0, principal].
pub fn balance_after_months(loan: &Loan, months: Months) -> LoanEngineResult<Money> {
    if months == 0 {
        return Ok(loan.principal);
    }
    let balance = loan
        .monthly_repayment
        .checked_mul(Decimal::from(months))
        .and_then(|repaid| repaid.checked_add(loan.adjusted_amount_first))
        .and_then(|repaid| loan.principal.checked_sub(repaid))
        .ok_or_else(|| overflow(loan, "balance"))?;
    Ok(balance.clamp(Decimal::ZERO, loan.principal))
}

/// Simple (non-compounding) monthly interest on a balance.
pub fn monthly_interest(loan: &Loan, balance: Money) -> LoanEngineResult<Money> {
    balance
        .checked_mul(loan.interest_rate)
        .and_then(|v| v.checked_div(MONTHS_PER_YEAR))
        .and_then(|v| v.checked_div(PERCENT))
        .ok_or_else(|| overflow(loan, "monthly interest"))
}

pub fn interest_after_months(loan: &Loan, months: Months) -> LoanEngineResult<Money> {
    monthly_interest(loan, balance_after_months(loan, months)?)
}

/// Balances for the 12 months starting at the current elapsed month.
pub fn balances_monthly(
    loan: &Loan,
    as_of: NaiveDate,
) -> LoanEngineResult<[Money; PROJECTION_MONTHS]> {
    let start = elapsed_months(loan, as_of);
    let mut balances = [Decimal::ZERO; PROJECTION_MONTHS];
    for (i, slot) in balances.iter_mut().enumerate() {
        *slot = balance_after_months(loan, start + i as Months)?;
    }
    Ok(balances)
}

pub fn interest_amount_monthly(
    loan: &Loan,
    as_of: NaiveDate,
) -> LoanEngineResult<[Money; PROJECTION_MONTHS]> {
    let start = elapsed_months(loan, as_of);
    let mut interest = [Decimal::ZERO; PROJECTION_MONTHS];
    for (i, slot) in interest.iter_mut().enumerate() {
        *slot = interest_after_months(loan, start + i as Months)?;
    }
    Ok(interest)
}

fn overflow(loan: &Loan, what: &str) -> LoanEngineError {
    LoanEngineError::ArithmeticOverflow {
        context: format!("{what} of loan {}", loan.id),
    }
}

/// Months from `as_of` to the company's next fiscal year end (0 in the closing month).
pub fn fiscal_year_offset(fiscal_month: u32, as_of: NaiveDate) -> LoanEngineResult<Months> {
    check_month("fiscal_month", fiscal_month)?;
    let current = as_of.month() as Months;
    let fiscal = fiscal_month as Months;
    Ok(if current <= fiscal {
        fiscal - current
    } else {
        12 - current + fiscal
    })
}

/// Balances at the next five fiscal year ends.
pub fn balances_fiscal_years(
    loan: &Loan,
    fiscal_month: u32,
    as_of: NaiveDate,
) -> LoanEngineResult<[Money; FISCAL_YEARS]> {
    let first = elapsed_months(loan, as_of) + fiscal_year_offset(fiscal_month, as_of)?;
    let mut balances = [Decimal::ZERO; FISCAL_YEARS];
    for (k, slot) in balances.iter_mut().enumerate() {
        *slot = balance_after_months(loan, first + 12 * k as Months)?;
    }
    Ok(balances)
}

/// Run every projector primitive for one loan.
pub fn project(
    loan: &Loan,
    company: &CompanyProfile,
    as_of: NaiveDate,
) -> LoanEngineResult<ProjectionResult> {
    let months_to_fiscal_year_end = fiscal_year_offset(company.fiscal_month, as_of)?;
    let payment_terms = payment_terms(loan)?;
    let elapsed = elapsed_months(loan, as_of);
    let fy = balances_fiscal_years(loan, company.fiscal_month, as_of)?;

    let projection_basis = if loan.debt_type.has_dedicated_projection() {
        ProjectionBasis::MonthlyAmortization
    } else {
        ProjectionBasis::ApproximateMonthlyAmortization
    };

    debug!(
        loan_id = %loan.id,
        payment_terms,
        elapsed_months = elapsed,
        "projected loan"
    );

    Ok(ProjectionResult {
        loan_id: loan.id.clone(),
        debt_type: loan.debt_type,
        projection_basis,
        months_suspended: months_suspended(loan),
        payment_terms,
        elapsed_months: elapsed,
        remaining_months: (payment_terms - elapsed).max(0),
        repayment_started: elapsed > 0,
        months_to_fiscal_year_end,
        balances_monthly: balances_monthly(loan, as_of)?,
        interest_amount_monthly: interest_amount_monthly(loan, as_of)?,
        balance_fy1: fy[0],
        balance_fy2: fy[1],
        balance_fy3: fy[2],
        balance_fy4: fy[3],
        balance_fy5: fy[4],
    })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project one loan's balances, interest and fiscal-year-end balances.
///
/// Assumes the loan already passed [`Loan::validate`].
#[instrument(skip_all, fields(loan_id = %input.loan.id))]
pub fn project_loan(
    input: &ProjectionInput,
) -> LoanEngineResult<ComputationOutput<ProjectionResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let result = project(&input.loan, &input.company, input.as_of)?;

    if result.projection_basis == ProjectionBasis::ApproximateMonthlyAmortization {
        warn!(
            loan_id = %input.loan.id,
            debt_type = %input.loan.debt_type,
            "no dedicated projection for debt type"
        );
        warnings.push(format!(
            "Debt type '{}' has no dedicated projection; balances use the monthly \
             amortization formula and are approximate.",
            input.loan.debt_type
        ));
    }
    if !result.repayment_started {
        warnings.push(format!(
            "Repayment has not started yet (elapsed months {}); balances show the full principal.",
            result.elapsed_months
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "as_of": input.as_of,
        "fiscal_month": input.company.fiscal_month,
        "interest": "balance * annual_rate / 12 / 100, simple",
        "balance_clamp": "[0, principal]",
    });

    Ok(with_metadata(
        "Flat monthly amortization projection",
        &assumptions,
        warnings,
        elapsed,
        result,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn twelve_month_loan() -> Loan {
        Loan {
            id: "L-12".into(),
            lender: "Shoko Chukin".into(),
            lender_short_name: None,
            guarantee_type: "Proper".into(),
            principal: dec!(1_200_000),
            issue_date: date(2025, 1, 10),
            start_date: date(2025, 1, 31),
            interest_rate: dec!(1.2),
            monthly_repayment: dec!(100_000),
            adjusted_amount_first: Decimal::ZERO,
            adjusted_amount_last: Decimal::ZERO,
            debt_type: DebtType::Certificate,
            repayment_months: vec![],
            is_rescheduled: false,
            reschedule_date: None,
            reschedule_balance: None,
            is_nodisplay: false,
            is_securedby_management: false,
            is_collateraled: false,
        }
    }

    fn company(fiscal_month: u32) -> CompanyProfile {
        CompanyProfile {
            name: "Acme KK".into(),
            fiscal_month,
        }
    }

    #[test]
    fn test_payment_terms_without_grace() {
        assert_eq!(payment_terms(&twelve_month_loan()).unwrap(), 12);
    }

    #[test]
    fn test_payment_terms_adds_grace_months() {
        let mut loan = twelve_month_loan();
        loan.issue_date = date(2024, 10, 1);
        assert_eq!(months_suspended(&loan), 3);
        assert_eq!(payment_terms(&loan).unwrap(), 15);
    }

    #[test]
    fn test_payment_terms_floors_partial_instalment() {
        let mut loan = twelve_month_loan();
        loan.adjusted_amount_last = dec!(50_000);
        // 1_250_000 / 100_000 = 12.5 -> 12
        assert_eq!(payment_terms(&loan).unwrap(), 12);
    }

    #[test]
    fn test_payment_terms_zero_repayment_fails_loudly() {
        let mut loan = twelve_month_loan();
        loan.monthly_repayment = Decimal::ZERO;
        assert!(matches!(
            payment_terms(&loan),
            Err(LoanEngineError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_elapsed_months_counts_start_month_as_one() {
        let loan = twelve_month_loan();
        assert_eq!(elapsed_months(&loan, date(2025, 1, 1)), 1);
        assert_eq!(elapsed_months(&loan, date(2025, 12, 15)), 12);
        assert_eq!(elapsed_months(&loan, date(2024, 11, 30)), -1);
    }

    #[test]
    fn test_remaining_months_never_negative() {
        let loan = twelve_month_loan();
        assert_eq!(remaining_months(&loan, date(2025, 1, 5)).unwrap(), 11);
        assert_eq!(remaining_months(&loan, date(2027, 6, 1)).unwrap(), 0);
    }

    #[test]
    fn test_balance_after_months_end_to_end() {
        let loan = twelve_month_loan();
        assert_eq!(balance_after_months(&loan, 0).unwrap(), dec!(1_200_000));
        assert_eq!(balance_after_months(&loan, 1).unwrap(), dec!(1_100_000));
        assert_eq!(balance_after_months(&loan, 12).unwrap(), Decimal::ZERO);
        assert_eq!(balance_after_months(&loan, 30).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_balance_applies_first_adjustment() {
        let mut loan = twelve_month_loan();
        loan.adjusted_amount_first = dec!(20_000);
        assert_eq!(balance_after_months(&loan, 1).unwrap(), dec!(1_080_000));
        assert_eq!(balance_after_months(&loan, 0).unwrap(), dec!(1_200_000));
    }

    #[test]
    fn test_negative_offsets_clamp_to_principal() {
        let loan = twelve_month_loan();
        assert_eq!(balance_after_months(&loan, -4).unwrap(), dec!(1_200_000));
    }

    #[test]
    fn test_monthly_interest_is_simple_accrual() {
        let loan = twelve_month_loan();
        // 1_100_000 * 1.2 / 12 / 100 = 1_100
        assert_eq!(interest_after_months(&loan, 1).unwrap(), dec!(1_100));
    }

    #[test]
    fn test_balances_monthly_start_at_elapsed_month() {
        let loan = twelve_month_loan();
        let balances = balances_monthly(&loan, date(2025, 3, 10)).unwrap();
        // elapsed = 3
        assert_eq!(balances[0], dec!(900_000));
        assert_eq!(balances[8], dec!(100_000));
        assert_eq!(balances[9], Decimal::ZERO);
        assert_eq!(balances[11], Decimal::ZERO);
    }

    #[test]
    fn test_balances_before_start_show_principal() {
        let mut loan = twelve_month_loan();
        loan.issue_date = date(2024, 12, 1);
        loan.start_date = date(2025, 6, 30);
        let balances = balances_monthly(&loan, date(2025, 3, 1)).unwrap();
        // elapsed = -2: offsets -2, -1, 0 all principal, then repayment begins
        assert_eq!(balances[0], dec!(1_200_000));
        assert_eq!(balances[2], dec!(1_200_000));
        assert_eq!(balances[3], dec!(1_100_000));
    }

    #[test]
    fn test_fiscal_year_offset_before_and_after_close() {
        assert_eq!(fiscal_year_offset(3, date(2025, 1, 15)).unwrap(), 2);
        assert_eq!(fiscal_year_offset(3, date(2025, 3, 15)).unwrap(), 0);
        assert_eq!(fiscal_year_offset(3, date(2025, 4, 15)).unwrap(), 11);
        assert!(fiscal_year_offset(0, date(2025, 4, 15)).is_err());
    }

    #[test]
    fn test_fiscal_year_balances() {
        let mut loan = twelve_month_loan();
        loan.principal = dec!(6_000_000);
        // elapsed at 2025-01 = 1, fiscal month 3 -> offset 2 -> fy1 at 3 months
        let fy = balances_fiscal_years(&loan, 3, date(2025, 1, 20)).unwrap();
        assert_eq!(fy[0], dec!(5_700_000));
        assert_eq!(fy[1], dec!(4_500_000));
        assert_eq!(fy[2], dec!(3_300_000));
        assert_eq!(fy[3], dec!(2_100_000));
        assert_eq!(fy[4], dec!(900_000));
    }

    #[test]
    fn test_project_loan_envelope() {
        let input = ProjectionInput {
            loan: twelve_month_loan(),
            company: company(3),
            as_of: date(2025, 1, 20),
        };
        let output = project_loan(&input).unwrap();
        let r = &output.result;
        assert_eq!(r.payment_terms, 12);
        assert_eq!(r.elapsed_months, 1);
        assert_eq!(r.remaining_months, 11);
        assert!(r.repayment_started);
        assert_eq!(r.months_to_fiscal_year_end, 2);
        assert_eq!(r.balances_monthly[0], dec!(1_100_000));
        assert_eq!(r.interest_amount_monthly[0], dec!(1_100));
        assert_eq!(r.balance_fy1, dec!(900_000));
        assert_eq!(r.projection_basis, ProjectionBasis::MonthlyAmortization);
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_non_certificate_projection_is_flagged() {
        let mut loan = twelve_month_loan();
        loan.debt_type = DebtType::PromissoryNote;
        let input = ProjectionInput {
            loan,
            company: company(3),
            as_of: date(2025, 1, 20),
        };
        let output = project_loan(&input).unwrap();
        assert_eq!(
            output.result.projection_basis,
            ProjectionBasis::ApproximateMonthlyAmortization
        );
        assert_eq!(output.warnings.len(), 1);
        assert!(output.warnings[0].contains("promissory_note"));
    }

    #[test]
    fn test_interest_overflow_is_an_error_not_a_panic() {
        let mut loan = twelve_month_loan();
        loan.principal = dec!(10_000_000_000_000_000_000_000_000_000);
        loan.monthly_repayment = dec!(1_000_000_000_000_000_000_000_000);
        loan.interest_rate = dec!(10);
        assert!(loan.validate().is_ok());
        assert!(matches!(
            monthly_interest(&loan, loan.principal),
            Err(LoanEngineError::ArithmeticOverflow { .. })
        ));
        let input = ProjectionInput {
            loan,
            company: company(3),
            as_of: date(2025, 1, 20),
        };
        assert!(matches!(
            project_loan(&input),
            Err(LoanEngineError::ArithmeticOverflow { .. })
        ));
    }
}
