pub mod loan;
pub mod projection;
pub mod schedule;

pub use loan::{CompanyProfile, DebtType, Loan};
pub use projection::{project, project_loan, ProjectionBasis, ProjectionInput, ProjectionResult};
