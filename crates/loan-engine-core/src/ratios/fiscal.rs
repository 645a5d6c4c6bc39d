//! Fiscal-year ratios feeding the benchmark scorer.
//!
//! Inputs are thousand-yen statement lines. Ratios are quantised half-up to
//! the configured number of decimal places. A ratio whose denominator is zero
//! is either `None` (cannot be computed) or zero, depending on the ratio.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::benchmark::Indicator;
use crate::types::*;

const HUNDRED: Decimal = dec!(100);
const MONTHS_PER_YEAR: Decimal = dec!(12);

/// One company fiscal year, in thousand yen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiscalSummary {
    pub year: i32,
    // Balance sheet
    pub accounts_receivable: Money,
    pub inventory: Money,
    pub total_current_assets: Money,
    pub total_fixed_assets: Money,
    pub total_assets: Money,
    pub accounts_payable: Money,
    pub short_term_loans_payable: Money,
    pub total_current_liabilities: Money,
    pub long_term_loans_payable: Money,
    pub total_long_term_liabilities: Money,
    pub total_net_assets: Money,
    // Income statement
    pub sales: Money,
    pub gross_profit: Money,
    pub depreciation_cogs: Money,
    pub depreciation_expense: Money,
    pub other_amortization_expense: Money,
    pub directors_compensation: Money,
    pub payroll_expense: Money,
    pub operating_profit: Money,
    pub non_operating_amortization_expense: Money,
    pub interest_expense: Money,
    pub ordinary_profit: Money,
    pub number_of_employees: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalRatios {
    pub ebitda: Money,
    pub interest_bearing_debt: Money,
    pub sales_growth_rate: Option<Percent>,
    pub operating_profit_margin: Percent,
    pub labor_productivity: Option<Money>,
    pub ebitda_interest_bearing_debt_ratio: Option<Decimal>,
    /// Months.
    pub operating_working_capital_turnover_period: Option<Decimal>,
    pub equity_ratio: Percent,
    pub current_ratio: Percent,
    pub roa: Percent,
    pub gross_profit_margin: Percent,
    pub fixed_ratio: Option<Percent>,
    pub fixed_long_term_adequacy_ratio: Option<Percent>,
}

impl FiscalSummary {
    pub fn depreciation_amortization(&self) -> Money {
        self.depreciation_cogs
            + self.depreciation_expense
            + self.other_amortization_expense
            + self.non_operating_amortization_expense
    }

    pub fn ebitda(&self) -> Money {
        self.operating_profit + self.depreciation_amortization()
    }

    /// Operating profit + labor costs + depreciation + interest.
    pub fn value_added(&self) -> Money {
        self.operating_profit
            + self.payroll_expense
            + self.directors_compensation
            + self.depreciation_amortization()
            + self.interest_expense
    }

    pub fn interest_bearing_debt(&self) -> Money {
        self.short_term_loans_payable + self.long_term_loans_payable
    }

    pub fn operating_working_capital(&self) -> Money {
        self.accounts_receivable + self.inventory - self.accounts_payable
    }
}

impl FiscalRatios {
    /// Value of a benchmarked indicator, if it could be computed.
    pub fn value(&self, indicator: Indicator) -> Option<Decimal> {
        match indicator {
            Indicator::SalesGrowthRate => self.sales_growth_rate,
            Indicator::OperatingProfitMargin => Some(self.operating_profit_margin),
            Indicator::LaborProductivity => self.labor_productivity,
            Indicator::EbitdaInterestBearingDebtRatio => self.ebitda_interest_bearing_debt_ratio,
            Indicator::OperatingWorkingCapitalTurnoverPeriod => {
                self.operating_working_capital_turnover_period
            }
            Indicator::EquityRatio => Some(self.equity_ratio),
        }
    }
}

/// Compute every ratio for one year. `previous_sales` is last year's sales.
pub fn compute_ratios(
    summary: &FiscalSummary,
    previous_sales: Option<Money>,
    decimal_places: u32,
) -> FiscalRatios {
    let q = |d: Decimal| d.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero);
    let ratio = |num: Decimal, den: Decimal, scale: Decimal| {
        (!den.is_zero()).then(|| q(num / den * scale))
    };

    let ebitda = summary.ebitda();
    let debt = summary.interest_bearing_debt();
    let employees = Decimal::from(summary.number_of_employees);

    FiscalRatios {
        ebitda,
        interest_bearing_debt: debt,
        sales_growth_rate: previous_sales
            .and_then(|prev| ratio(summary.sales - prev, prev, HUNDRED)),
        operating_profit_margin: ratio(summary.operating_profit, summary.sales, HUNDRED)
            .unwrap_or(Decimal::ZERO),
        labor_productivity: ratio(summary.value_added(), employees, Decimal::ONE),
        ebitda_interest_bearing_debt_ratio: ratio(debt, ebitda, Decimal::ONE),
        operating_working_capital_turnover_period: ratio(
            summary.operating_working_capital(),
            summary.sales,
            MONTHS_PER_YEAR,
        ),
        equity_ratio: ratio(summary.total_net_assets, summary.total_assets, HUNDRED)
            .unwrap_or(Decimal::ZERO),
        current_ratio: ratio(
            summary.total_current_assets,
            summary.total_current_liabilities,
            HUNDRED,
        )
        .unwrap_or(Decimal::ZERO),
        roa: ratio(summary.ordinary_profit, summary.total_assets, HUNDRED)
            .unwrap_or(Decimal::ZERO),
        gross_profit_margin: ratio(summary.gross_profit, summary.sales, HUNDRED)
            .unwrap_or(Decimal::ZERO),
        fixed_ratio: ratio(summary.total_fixed_assets, summary.total_net_assets, HUNDRED),
        fixed_long_term_adequacy_ratio: ratio(
            summary.total_fixed_assets,
            summary.total_net_assets + summary.total_long_term_liabilities,
            HUNDRED,
        ),
    }
}
