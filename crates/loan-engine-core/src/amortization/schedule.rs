use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::loan::Loan;
use super::projection::{balance_after_months, elapsed_months, monthly_interest};
use crate::calendar::{month_label, shift_month};
use crate::{types::*, LoanEngineResult};

/// One calendar month of a forward repayment schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// `YYYY-MM` of the row, counted from `as_of`.
    pub period: String,
    /// Repayment month index the balance was evaluated at.
    pub month_offset: Months,
    pub balance: Money,
    pub interest: Money,
}

/// Month-by-month balances and interest for `months` months from `as_of`.
///
/// The first 12 rows match `balances_monthly` / `interest_amount_monthly`.
pub fn repayment_schedule(
    loan: &Loan,
    as_of: NaiveDate,
    months: u32,
) -> LoanEngineResult<Vec<ScheduleRow>> {
    let start = elapsed_months(loan, as_of);
    (0..months as Months)
        .map(|i| {
            let balance = balance_after_months(loan, start + i)?;
            Ok(ScheduleRow {
                period: month_label(shift_month(as_of, i)?),
                month_offset: start + i,
                balance,
                interest: monthly_interest(loan, balance)?,
            })
        })
        .collect()
}
