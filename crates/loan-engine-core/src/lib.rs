pub mod calendar;
pub mod error;
pub mod settings;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "portfolio")]
pub mod portfolio;

#[cfg(feature = "benchmark")]
pub mod benchmark;

#[cfg(feature = "ratios")]
pub mod ratios;

pub use error::LoanEngineError;
pub use settings::EngineSettings;
pub use types::*;

/// Standard result type for all loan-engine operations
pub type LoanEngineResult<T> = Result<T, LoanEngineError>;
