use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::check_month;
use crate::{types::*, LoanEngineError, LoanEngineResult};

// ---------------------------------------------------------------------------
// Loan terms
// ---------------------------------------------------------------------------

/// How the loan is repaid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtType {
    /// Loan on deed, repaid in equal monthly instalments.
    #[default]
    Certificate,
    /// Repaid only in the designated `repayment_months`.
    CorporateBond,
    /// Single bullet repayment at maturity.
    PromissoryNote,
}

impl DebtType {
    /// Whether the projector has a formula written for this repayment style.
    ///
    /// Only monthly-amortising certificates do; the other two are projected
    /// with the certificate formula and flagged as approximate.
    pub fn has_dedicated_projection(&self) -> bool {
        matches!(self, DebtType::Certificate)
    }
}

impl std::fmt::Display for DebtType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DebtType::Certificate => "certificate",
            DebtType::CorporateBond => "corporate_bond",
            DebtType::PromissoryNote => "promissory_note",
        };
        write!(f, "{}", s)
    }
}

/// One borrowing contract. The engine only ever reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    /// Lender name, used for sorting and grouping.
    pub lender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lender_short_name: Option<String>,
    /// Guarantee-type label (credit guarantee association, proper, ...).
    pub guarantee_type: String,
    pub principal: Money,
    pub issue_date: NaiveDate,
    /// First repayment month.
    pub start_date: NaiveDate,
    /// Annual rate in percent.
    pub interest_rate: Percent,
    pub monthly_repayment: Money,
    /// Difference between the first repayment and a regular one.
    #[serde(default)]
    pub adjusted_amount_first: Money,
    /// Difference between the last repayment and a regular one.
    #[serde(default)]
    pub adjusted_amount_last: Money,
    #[serde(default)]
    pub debt_type: DebtType,
    /// Months (1-12) a corporate bond repays in.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repayment_months: Vec<u32>,
    #[serde(default)]
    pub is_rescheduled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reschedule_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reschedule_balance: Option<Money>,
    /// Archived; hidden from the active list.
    #[serde(default)]
    pub is_nodisplay: bool,
    #[serde(default)]
    pub is_securedby_management: bool,
    #[serde(default)]
    pub is_collateraled: bool,
}

/// The borrowing company, as far as projections care.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    /// Month (1-12) the fiscal year closes in.
    pub fiscal_month: u32,
}

impl CompanyProfile {
    pub fn validate(&self) -> LoanEngineResult<()> {
        check_month("fiscal_month", self.fiscal_month)
    }
}

// ---------------------------------------------------------------------------
// Data-entry validation
// ---------------------------------------------------------------------------

impl Loan {
    /// Check the loan terms before they reach the projector.
    ///
    /// The projector itself does not re-check these on every call.
    pub fn validate(&self) -> LoanEngineResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(invalid("principal", "Principal must be positive."));
        }
        if self.monthly_repayment <= Decimal::ZERO {
            return Err(invalid(
                "monthly_repayment",
                "Monthly repayment must be positive.",
            ));
        }
        for (field, amount) in [
            ("principal", self.principal),
            ("monthly_repayment", self.monthly_repayment),
            ("adjusted_amount_first", self.adjusted_amount_first),
            ("adjusted_amount_last", self.adjusted_amount_last),
        ] {
            if !amount.fract().is_zero() {
                return Err(invalid(field, "Amounts must be whole yen."));
            }
        }
        if self.issue_date > self.start_date {
            return Err(invalid(
                "issue_date",
                "Issue date must be on or before the repayment start date.",
            ));
        }
        if self.interest_rate < Decimal::ZERO {
            return Err(invalid("interest_rate", "Interest rate cannot be negative."));
        }
        if !repayment_positive(self.monthly_repayment, self.adjusted_amount_first) {
            return Err(invalid(
                "adjusted_amount_first",
                "First repayment (monthly repayment + adjustment) must be positive.",
            ));
        }
        if !repayment_positive(self.monthly_repayment, self.adjusted_amount_last) {
            return Err(invalid(
                "adjusted_amount_last",
                "Last repayment (monthly repayment + adjustment) must be positive.",
            ));
        }
        if let Some(month) = self.repayment_months.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(invalid(
                "repayment_months",
                &format!("Repayment month {month} is outside 1-12."),
            ));
        }
        if self.debt_type == DebtType::CorporateBond && self.repayment_months.is_empty() {
            return Err(invalid(
                "repayment_months",
                "Corporate bonds need at least one repayment month.",
            ));
        }
        if self.is_rescheduled {
            if self.reschedule_date.is_none() {
                return Err(invalid(
                    "reschedule_date",
                    "Rescheduled loans need the reschedule date.",
                ));
            }
            match self.reschedule_balance {
                None => {
                    return Err(invalid(
                        "reschedule_balance",
                        "Rescheduled loans need the balance at rescheduling.",
                    ))
                }
                Some(b) if b < Decimal::ZERO => {
                    return Err(invalid(
                        "reschedule_balance",
                        "Balance at rescheduling cannot be negative.",
                    ))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> LoanEngineError {
    LoanEngineError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}

/// Monthly repayment is already positive here, so an overflowing sum is positive too.
fn repayment_positive(monthly: Money, adjustment: Money) -> bool {
    monthly
        .checked_add(adjustment)
        .map_or(true, |amount| amount > Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_loan() -> Loan {
        Loan {
            id: "L-001".into(),
            lender: "Shinkin Bank".into(),
            lender_short_name: Some("Shinkin".into()),
            guarantee_type: "Prefectural guarantee".into(),
            principal: dec!(10_000_000),
            issue_date: NaiveDate::from_ymd_opt(2024, 3, 25).unwrap(),
            start_date: NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
            interest_rate: dec!(1.5),
            monthly_repayment: dec!(100_000),
            adjusted_amount_first: Decimal::ZERO,
            adjusted_amount_last: Decimal::ZERO,
            debt_type: DebtType::Certificate,
            repayment_months: vec![],
            is_rescheduled: false,
            reschedule_date: None,
            reschedule_balance: None,
            is_nodisplay: false,
            is_securedby_management: true,
            is_collateraled: false,
        }
    }

    fn rejected_field(loan: &Loan) -> String {
        match loan.validate() {
            Err(LoanEngineError::InvalidInput { field, .. }) => field,
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_loan_passes() {
        assert!(sample_loan().validate().is_ok());
    }

    #[test]
    fn test_reject_non_positive_principal() {
        let mut loan = sample_loan();
        loan.principal = Decimal::ZERO;
        assert_eq!(rejected_field(&loan), "principal");
    }

    #[test]
    fn test_reject_zero_monthly_repayment() {
        let mut loan = sample_loan();
        loan.monthly_repayment = Decimal::ZERO;
        assert_eq!(rejected_field(&loan), "monthly_repayment");
    }

    #[test]
    fn test_reject_fractional_yen() {
        let mut loan = sample_loan();
        loan.adjusted_amount_last = dec!(0.5);
        assert_eq!(rejected_field(&loan), "adjusted_amount_last");
    }

    #[test]
    fn test_reject_issue_after_start() {
        let mut loan = sample_loan();
        loan.issue_date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(rejected_field(&loan), "issue_date");
    }

    #[test]
    fn test_reject_adjustment_wiping_first_repayment() {
        let mut loan = sample_loan();
        loan.adjusted_amount_first = dec!(-100_000);
        assert_eq!(rejected_field(&loan), "adjusted_amount_first");
    }

    #[test]
    fn test_negative_adjustment_smaller_than_repayment_is_fine() {
        let mut loan = sample_loan();
        loan.adjusted_amount_last = dec!(-40_000);
        assert!(loan.validate().is_ok());
    }

    #[test]
    fn test_corporate_bond_needs_repayment_months() {
        let mut loan = sample_loan();
        loan.debt_type = DebtType::CorporateBond;
        assert_eq!(rejected_field(&loan), "repayment_months");
        loan.repayment_months = vec![3, 9];
        assert!(loan.validate().is_ok());
        loan.repayment_months = vec![3, 13];
        assert_eq!(rejected_field(&loan), "repayment_months");
    }

    #[test]
    fn test_rescheduled_loan_needs_date_and_balance() {
        let mut loan = sample_loan();
        loan.is_rescheduled = true;
        assert_eq!(rejected_field(&loan), "reschedule_date");
        loan.reschedule_date = NaiveDate::from_ymd_opt(2025, 1, 31);
        assert_eq!(rejected_field(&loan), "reschedule_balance");
        loan.reschedule_balance = Some(dec!(6_000_000));
        assert!(loan.validate().is_ok());
    }

    #[test]
    fn test_company_fiscal_month_bounds() {
        let company = CompanyProfile {
            name: "Acme KK".into(),
            fiscal_month: 13,
        };
        assert!(matches!(
            company.validate(),
            Err(LoanEngineError::DateError(_))
        ));
    }

    #[test]
    fn test_loan_deserialises_with_defaults() {
        let json = r#"{
            "id": "L-9",
            "lender": "Mizuho",
            "guarantee_type": "Proper",
            "principal": 3000000,
            "issue_date": "2024-01-10",
            "start_date": "2024-02-10",
            "interest_rate": "1.2",
            "monthly_repayment": 50000
        }"#;
        let loan: Loan = serde_json::from_str(json).unwrap();
        assert_eq!(loan.debt_type, DebtType::Certificate);
        assert_eq!(loan.adjusted_amount_first, Decimal::ZERO);
        assert!(!loan.is_nodisplay);
        assert_eq!(loan.interest_rate, dec!(1.2));
    }
}
