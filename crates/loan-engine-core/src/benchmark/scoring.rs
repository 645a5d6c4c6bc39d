use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument};

use super::indicator::{Indicator, IndicatorGroup, IndustrySegment};
use super::source::{resolve_benchmark, BenchmarkFallback, BenchmarkKey, BenchmarkRange, BenchmarkSource};
use crate::settings::EngineSettings;
use crate::{types::*, LoanEngineResult};

/// Lowest score; also the forced score for non-positive EBITDA.
pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub segment: IndustrySegment,
    pub year: i32,
    pub indicator: Indicator,
    pub value: Decimal,
    /// EBITDA behind an EBITDA / debt ratio, when the caller has it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ebitda: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorScore {
    pub indicator: Indicator,
    pub value: Option<Decimal>,
    /// 1-5, or `None` when no benchmark could be found.
    pub score: Option<u8>,
    /// Score forced to 1 by non-positive EBITDA.
    pub forced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<BenchmarkFallback>,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Map a value onto 1-5 using the four thresholds of `range`.
///
/// Higher-is-better: `<= iv` -> 1, `<= iii` -> 2, `<= ii` -> 3, `<= i` -> 4, else 5.
/// Lower-is-better: `>= iv` -> 1, `>= iii` -> 2, `>= ii` -> 3, `>= i` -> 4, else 5.
pub fn score_value(indicator: Indicator, value: Decimal, range: &BenchmarkRange) -> u8 {
    let thresholds = [range.range_iv, range.range_iii, range.range_ii, range.range_i];
    let band = match indicator.group() {
        IndicatorGroup::HigherIsBetter => thresholds.iter().position(|t| value <= *t),
        IndicatorGroup::LowerIsBetter => thresholds.iter().position(|t| value >= *t),
    };
    band.map_or(MAX_SCORE, |b| b as u8 + MIN_SCORE)
}

/// Negative EBITDA makes the EBITDA / debt ratio look excellent; it scores 1.
pub fn is_forced_lowest(indicator: Indicator, value: Option<Decimal>, ebitda: Option<Money>) -> bool {
    indicator == Indicator::EbitdaInterestBearingDebtRatio
        && (value.is_some_and(|v| v < Decimal::ZERO)
            || ebitda.is_some_and(|e| e <= Decimal::ZERO))
}

/// Score one value with benchmark lookup and fallback.
pub fn score_request(
    source: &dyn BenchmarkSource,
    request: &ScoreRequest,
    settings: &EngineSettings,
) -> IndicatorScore {
    let mut result = IndicatorScore {
        indicator: request.indicator,
        value: Some(request.value),
        score: None,
        forced: false,
        benchmark_year: None,
        fallback: None,
    };

    if is_forced_lowest(request.indicator, Some(request.value), request.ebitda) {
        result.score = Some(MIN_SCORE);
        result.forced = true;
        return result;
    }

    let key = BenchmarkKey {
        year: request.year,
        segment: request.segment.clone(),
        indicator: request.indicator,
    };
    if let Some(resolved) = resolve_benchmark(source, &key, settings) {
        result.score = Some(score_value(request.indicator, request.value, &resolved.range));
        result.benchmark_year = Some(resolved.year_used);
        result.fallback = Some(resolved.fallback);
    }
    debug!(indicator = %request.indicator, score = ?result.score, "scored indicator");
    result
}

/// Integer score 1-5, or `None` when no benchmark is available.
pub fn finance_score(
    source: &dyn BenchmarkSource,
    request: &ScoreRequest,
    settings: &EngineSettings,
) -> Option<u8> {
    score_request(source, request, settings).score
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

#[instrument(skip_all, fields(indicator = %request.indicator, year = request.year))]
pub fn score_indicator(
    source: &dyn BenchmarkSource,
    request: &ScoreRequest,
    settings: &EngineSettings,
) -> LoanEngineResult<ComputationOutput<IndicatorScore>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let result = score_request(source, request, settings);

    match (result.score, result.fallback) {
        (None, _) => warnings.push(format!(
            "No benchmark for {} in {}, {} or {}; indicator is unscored.",
            request.indicator,
            request.year,
            request.year - 1,
            settings.benchmark_fallback_year
        )),
        (Some(_), Some(fallback)) if fallback != BenchmarkFallback::RequestedYear => {
            warnings.push(format!(
                "Benchmark for {} taken from {} instead of {}.",
                request.indicator,
                result.benchmark_year.unwrap_or(request.year),
                request.year
            ))
        }
        _ => {}
    }
    if result.forced {
        warnings.push("Non-positive EBITDA; score forced to 1.".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "direction": format!("{:?}", request.indicator.group()),
        "fallback_chain": [request.year, request.year - 1, settings.benchmark_fallback_year],
    });

    Ok(with_metadata(
        "Industry benchmark quintile scoring",
        &assumptions,
        warnings,
        elapsed,
        result,
    ))
}
