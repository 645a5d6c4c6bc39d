use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, instrument};

use super::fiscal::{compute_ratios, FiscalRatios, FiscalSummary};
use crate::benchmark::scoring::{is_forced_lowest, score_request, IndicatorScore, ScoreRequest, MIN_SCORE};
use crate::benchmark::{BenchmarkSource, Indicator, IndustrySegment};
use crate::settings::EngineSettings;
use crate::{types::*, LoanEngineResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorecardInput {
    pub segment: IndustrySegment,
    pub summary: FiscalSummary,
    /// Sales of the previous fiscal year, for the growth rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_sales: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceScorecard {
    pub year: i32,
    pub ratios: FiscalRatios,
    /// One entry per benchmarked indicator, in a fixed order.
    pub scores: Vec<IndicatorScore>,
}

impl FinanceScorecard {
    pub fn score(&self, indicator: Indicator) -> Option<u8> {
        self.scores
            .iter()
            .find(|s| s.indicator == indicator)
            .and_then(|s| s.score)
    }
}

fn score_one(
    source: &dyn BenchmarkSource,
    input: &ScorecardInput,
    ratios: &FiscalRatios,
    indicator: Indicator,
    settings: &EngineSettings,
) -> IndicatorScore {
    let value = ratios.value(indicator);
    match value {
        Some(value) => score_request(
            source,
            &ScoreRequest {
                segment: input.segment.clone(),
                year: input.summary.year,
                indicator,
                value,
                ebitda: Some(ratios.ebitda),
            },
            settings,
        ),
        None => {
            let forced = is_forced_lowest(indicator, None, Some(ratios.ebitda));
            IndicatorScore {
                indicator,
                value: None,
                score: forced.then_some(MIN_SCORE),
                forced,
                benchmark_year: None,
                fallback: None,
            }
        }
    }
}

/// Compute a year's ratios and score the six benchmarked indicators.
#[instrument(skip_all, fields(year = input.summary.year))]
pub fn score_fiscal_year(
    input: &ScorecardInput,
    source: &dyn BenchmarkSource,
    settings: &EngineSettings,
) -> LoanEngineResult<ComputationOutput<FinanceScorecard>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let ratios = compute_ratios(&input.summary, input.previous_sales, settings.decimal_places);
    let scores: Vec<IndicatorScore> = Indicator::ALL
        .into_iter()
        .map(|indicator| score_one(source, input, &ratios, indicator, settings))
        .collect();

    for s in &scores {
        match (s.value, s.score) {
            (None, None) => warnings.push(format!("{} could not be computed.", s.indicator)),
            (Some(_), None) => warnings.push(format!("{} has no benchmark; unscored.", s.indicator)),
            _ => {}
        }
    }
    if ratios.ebitda <= Decimal::ZERO {
        warnings.push("Non-positive EBITDA; EBITDA / debt ratio scored 1.".into());
    }

    info!(
        scored = scores.iter().filter(|s| s.score.is_some()).count(),
        "scored fiscal year"
    );

    let result = FinanceScorecard {
        year: input.summary.year,
        ratios,
        scores,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "units": "thousand yen",
        "rounding": format!("half-up to {} dp", settings.decimal_places),
        "benchmark_fallback_year": settings.benchmark_fallback_year,
    });

    Ok(with_metadata(
        "Fiscal ratio scoring against industry benchmarks",
        &assumptions,
        warnings,
        elapsed,
        result,
    ))
}
