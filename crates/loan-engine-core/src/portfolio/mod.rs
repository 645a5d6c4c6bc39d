pub mod aggregation;
pub mod filter;
pub mod grouping;

pub use aggregation::{
    aggregate_portfolio, classify, summarize, totals_of, weighted_average_interest, ActiveLoan,
    Bucket, PortfolioInput, PortfolioReport, PortfolioSummary, PortfolioTotals,
};
pub use filter::{DateRange, LoanFilter};
pub use grouping::{group_by, GroupKey, LoanGroup};

use crate::{LoanEngineError, LoanEngineResult, Money};

fn checked_sum(a: Money, b: Money, context: &str) -> LoanEngineResult<Money> {
    a.checked_add(b)
        .ok_or_else(|| LoanEngineError::ArithmeticOverflow {
            context: context.to_string(),
        })
}
