use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All yen amounts. Whole yen, but kept in Decimal so accruals stay exact.
pub type Money = Decimal;

/// Annual rates and ratio values expressed in percent (1.5 = 1.5%).
pub type Percent = Decimal;

/// Signed calendar month counts. Negative before repayment starts.
pub type Months = i32;

/// Number of forward months in every monthly projection vector.
pub const PROJECTION_MONTHS: usize = 12;

/// Number of upcoming fiscal-year-end balances projected per loan.
pub const FISCAL_YEARS: usize = 5;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
