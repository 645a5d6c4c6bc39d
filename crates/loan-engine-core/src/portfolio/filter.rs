use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::amortization::Loan;

/// Inclusive date range; a missing bound is open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Narrows a company's loans before classification. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanFilter {
    /// Case-insensitive substring of lender, lender short name or guarantee type.
    pub search: Option<String>,
    pub lender: Option<String>,
    pub guarantee_type: Option<String>,
    pub is_rescheduled: Option<bool>,
    pub is_nodisplay: Option<bool>,
    pub is_securedby_management: Option<bool>,
    pub is_collateraled: Option<bool>,
    pub issue_date: Option<DateRange>,
    pub start_date: Option<DateRange>,
}

impl LoanFilter {
    pub fn matches(&self, loan: &Loan) -> bool {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let hit = loan.lender.to_lowercase().contains(&needle)
                || loan
                    .lender_short_name
                    .as_deref()
                    .is_some_and(|s| s.to_lowercase().contains(&needle))
                || loan.guarantee_type.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        if self.lender.as_ref().is_some_and(|l| *l != loan.lender) {
            return false;
        }
        if self
            .guarantee_type
            .as_ref()
            .is_some_and(|g| *g != loan.guarantee_type)
        {
            return false;
        }

        let flags = [
            (self.is_rescheduled, loan.is_rescheduled),
            (self.is_nodisplay, loan.is_nodisplay),
            (self.is_securedby_management, loan.is_securedby_management),
            (self.is_collateraled, loan.is_collateraled),
        ];
        if flags
            .iter()
            .any(|(wanted, actual)| wanted.is_some_and(|w| w != *actual))
        {
            return false;
        }

        self.issue_date
            .as_ref()
            .map_or(true, |r| r.contains(loan.issue_date))
            && self
                .start_date
                .as_ref()
                .map_or(true, |r| r.contains(loan.start_date))
    }
}
