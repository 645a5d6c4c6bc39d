use chrono::{Datelike, NaiveDate};

use crate::error::LoanEngineError;
use crate::types::Months;
use crate::LoanEngineResult;

/// Whole calendar months from `from` to `to`. Day of month is ignored.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> Months {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

/// First day of the month `months` away from `date`'s month.
pub fn shift_month(date: NaiveDate, months: Months) -> LoanEngineResult<NaiveDate> {
    let index = date.year() * 12 + date.month0() as i32 + months;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        LoanEngineError::DateError(format!("cannot shift {date} by {months} months"))
    })
}

/// `YYYY-MM` label for a month.
pub fn month_label(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Reject calendar months outside 1..=12.
pub fn check_month(field: &str, month: u32) -> LoanEngineResult<()> {
    if !(1..=12).contains(&month) {
        return Err(LoanEngineError::DateError(format!(
            "{field} must be between 1 and 12, got {month}"
        )));
    }
    Ok(())
}
