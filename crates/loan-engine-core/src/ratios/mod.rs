pub mod fiscal;
pub mod scorecard;

pub use fiscal::{compute_ratios, FiscalRatios, FiscalSummary};
pub use scorecard::{score_fiscal_year, FinanceScorecard, ScorecardInput};
