use serde::{Deserialize, Serialize};

/// Financial indicators that industry benchmarks are published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Indicator {
    #[serde(rename = "sales_growth_rate")]
    SalesGrowthRate,
    #[serde(rename = "operating_profit_margin")]
    OperatingProfitMargin,
    #[serde(rename = "labor_productivity")]
    LaborProductivity,
    #[serde(rename = "EBITDA_interest_bearing_debt_ratio")]
    EbitdaInterestBearingDebtRatio,
    #[serde(rename = "operating_working_capital_turnover_period")]
    OperatingWorkingCapitalTurnoverPeriod,
    #[serde(rename = "equity_ratio")]
    EquityRatio,
}

/// Which direction of an indicator is favourable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorGroup {
    /// Group A: sales growth, operating margin, labor productivity, equity ratio.
    HigherIsBetter,
    /// Group B: working-capital turnover period, EBITDA / debt ratio.
    LowerIsBetter,
}

impl Indicator {
    pub const ALL: [Indicator; 6] = [
        Indicator::SalesGrowthRate,
        Indicator::OperatingProfitMargin,
        Indicator::LaborProductivity,
        Indicator::EbitdaInterestBearingDebtRatio,
        Indicator::OperatingWorkingCapitalTurnoverPeriod,
        Indicator::EquityRatio,
    ];

    pub fn group(&self) -> IndicatorGroup {
        match self {
            Indicator::SalesGrowthRate
            | Indicator::OperatingProfitMargin
            | Indicator::LaborProductivity
            | Indicator::EquityRatio => IndicatorGroup::HigherIsBetter,
            Indicator::OperatingWorkingCapitalTurnoverPeriod
            | Indicator::EbitdaInterestBearingDebtRatio => IndicatorGroup::LowerIsBetter,
        }
    }

    /// Name used by the benchmark dataset.
    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::SalesGrowthRate => "sales_growth_rate",
            Indicator::OperatingProfitMargin => "operating_profit_margin",
            Indicator::LaborProductivity => "labor_productivity",
            Indicator::EbitdaInterestBearingDebtRatio => "EBITDA_interest_bearing_debt_ratio",
            Indicator::OperatingWorkingCapitalTurnoverPeriod => {
                "operating_working_capital_turnover_period"
            }
            Indicator::EquityRatio => "equity_ratio",
        }
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Indicator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Indicator::ALL
            .into_iter()
            .find(|i| i.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown indicator '{s}'"))
    }
}

/// Company size band benchmarks are split by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanySize {
    #[serde(rename = "s")]
    Small,
    #[serde(rename = "m")]
    Medium,
    #[serde(rename = "l")]
    Large,
}

impl std::str::FromStr for CompanySize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s" | "small" => Ok(CompanySize::Small),
            "m" | "medium" => Ok(CompanySize::Medium),
            "l" | "large" => Ok(CompanySize::Large),
            _ => Err(format!("unknown company size '{s}' (expected s, m or l)")),
        }
    }
}

/// Industry and size a company is benchmarked against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndustrySegment {
    pub industry_classification: String,
    pub industry_subclassification: String,
    pub company_size: CompanySize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups() {
        let lower: Vec<Indicator> = Indicator::ALL
            .into_iter()
            .filter(|i| i.group() == IndicatorGroup::LowerIsBetter)
            .collect();
        assert_eq!(
            lower,
            vec![
                Indicator::EbitdaInterestBearingDebtRatio,
                Indicator::OperatingWorkingCapitalTurnoverPeriod,
            ]
        );
    }

    #[test]
    fn test_dataset_names_round_trip_through_serde() {
        for indicator in Indicator::ALL {
            let json = serde_json::to_string(&indicator).unwrap();
            assert_eq!(json, format!("\"{}\"", indicator.as_str()));
        }
    }

    #[test]
    fn test_parse_indicator_and_size() {
        assert_eq!(
            "ebitda_interest_bearing_debt_ratio".parse::<Indicator>().unwrap(),
            Indicator::EbitdaInterestBearingDebtRatio
        );
        assert!("roe".parse::<Indicator>().is_err());
        assert_eq!("M".parse::<CompanySize>().unwrap(), CompanySize::Medium);
    }
}
