pub mod benchmark;
pub mod portfolio;
pub mod projection;

use chrono::NaiveDate;

/// `--as-of` wins over a date in the request file; otherwise today.
pub fn resolve_as_of(flag: Option<NaiveDate>, from_request: Option<NaiveDate>) -> NaiveDate {
    flag.or(from_request)
        .unwrap_or_else(|| chrono::Local::now().date_naive())
}
