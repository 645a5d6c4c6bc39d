use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::aggregation::ActiveLoan;
use super::checked_sum;
use crate::{types::*, LoanEngineResult};

/// What to group active loans by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Lender,
    GuaranteeType,
    LenderAndGuaranteeType,
}

/// Sums for one group of active loans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guarantee_type: Option<String>,
    pub principal: Money,
    pub monthly_repayment: Money,
    pub balances_monthly: [Money; PROJECTION_MONTHS],
    pub balance_fy1: Money,
}

impl LoanGroup {
    fn empty(lender: Option<String>, guarantee_type: Option<String>) -> Self {
        Self {
            lender,
            guarantee_type,
            principal: Decimal::ZERO,
            monthly_repayment: Decimal::ZERO,
            balances_monthly: [Decimal::ZERO; PROJECTION_MONTHS],
            balance_fy1: Decimal::ZERO,
        }
    }

    fn accumulate(&mut self, active: &ActiveLoan) -> LoanEngineResult<()> {
        let context = "loan group totals";
        self.principal = checked_sum(self.principal, active.loan.principal, context)?;
        self.monthly_repayment =
            checked_sum(self.monthly_repayment, active.loan.monthly_repayment, context)?;
        self.balance_fy1 = checked_sum(self.balance_fy1, active.projection.balance_fy1, context)?;
        for (total, value) in self
            .balances_monthly
            .iter_mut()
            .zip(active.projection.balances_monthly.iter())
        {
            *total = checked_sum(*total, *value, context)?;
        }
        Ok(())
    }
}

/// Group active loans by `key`.
///
/// Groups come out in order of first appearance, so a list already sorted by
/// (lender, guarantee type) yields groups in that order.
pub fn group_by(active: &[ActiveLoan], key: GroupKey) -> LoanEngineResult<Vec<LoanGroup>> {
    let mut groups: Vec<LoanGroup> = Vec::new();
    let mut index: HashMap<(Option<&str>, Option<&str>), usize> = HashMap::new();

    for entry in active {
        let lender = matches!(key, GroupKey::Lender | GroupKey::LenderAndGuaranteeType)
            .then_some(entry.loan.lender.as_str());
        let guarantee_type =
            matches!(key, GroupKey::GuaranteeType | GroupKey::LenderAndGuaranteeType)
                .then_some(entry.loan.guarantee_type.as_str());

        let slot = *index.entry((lender, guarantee_type)).or_insert_with(|| {
            groups.push(LoanGroup::empty(
                lender.map(str::to_string),
                guarantee_type.map(str::to_string),
            ));
            groups.len() - 1
        });
        groups[slot].accumulate(entry)?;
    }

    Ok(groups)
}
