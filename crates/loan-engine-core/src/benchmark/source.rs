use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::indicator::{Indicator, IndustrySegment};
use crate::settings::EngineSettings;

/// Published thresholds for one (year, segment, indicator).
///
/// `range_iv` is the boundary of the worst band and `range_i` of the best; the
/// scorer decides the direction from the indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRange {
    pub year: i32,
    #[serde(flatten)]
    pub segment: IndustrySegment,
    pub indicator: Indicator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_deviation: Option<Decimal>,
    pub range_iv: Decimal,
    pub range_iii: Decimal,
    pub range_ii: Decimal,
    pub range_i: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BenchmarkKey {
    pub year: i32,
    pub segment: IndustrySegment,
    pub indicator: Indicator,
}

/// Benchmark data access, supplied by the caller.
pub trait BenchmarkSource {
    fn find(&self, segment: &IndustrySegment, year: i32, indicator: Indicator)
        -> Option<BenchmarkRange>;

    /// Every indicator published for a segment in one year.
    fn find_year(&self, segment: &IndustrySegment, year: i32) -> Vec<BenchmarkRange>;
}

/// In-memory benchmark dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BenchmarkTable {
    entries: Vec<BenchmarkRange>,
}

impl BenchmarkTable {
    pub fn new(entries: Vec<BenchmarkRange>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, range: BenchmarkRange) {
        self.entries.push(range);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BenchmarkSource for BenchmarkTable {
    fn find(
        &self,
        segment: &IndustrySegment,
        year: i32,
        indicator: Indicator,
    ) -> Option<BenchmarkRange> {
        self.entries
            .iter()
            .find(|r| r.year == year && r.indicator == indicator && r.segment == *segment)
            .cloned()
    }

    fn find_year(&self, segment: &IndustrySegment, year: i32) -> Vec<BenchmarkRange> {
        self.entries
            .iter()
            .filter(|r| r.year == year && r.segment == *segment)
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Fallback resolution
// ---------------------------------------------------------------------------

/// Which step of the fallback chain produced a benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkFallback {
    RequestedYear,
    PreviousYear,
    FixedYear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedBenchmark {
    pub range: BenchmarkRange,
    pub year_used: i32,
    pub fallback: BenchmarkFallback,
}

/// Look up a benchmark: requested year, then the year before, then the fixed
/// fallback year. `None` means the indicator cannot be scored.
pub fn resolve_benchmark(
    source: &dyn BenchmarkSource,
    key: &BenchmarkKey,
    settings: &EngineSettings,
) -> Option<ResolvedBenchmark> {
    let chain = [
        (key.year, BenchmarkFallback::RequestedYear),
        (key.year - 1, BenchmarkFallback::PreviousYear),
        (settings.benchmark_fallback_year, BenchmarkFallback::FixedYear),
    ];
    for (year, fallback) in chain {
        if let Some(range) = source.find(&key.segment, year, key.indicator) {
            if fallback != BenchmarkFallback::RequestedYear {
                warn!(
                    indicator = %key.indicator,
                    requested = key.year,
                    year_used = year,
                    "benchmark fell back to another year"
                );
            }
            return Some(ResolvedBenchmark {
                range,
                year_used: year,
                fallback,
            });
        }
    }
    debug!(indicator = %key.indicator, year = key.year, "no benchmark available");
    None
}

/// Whole benchmark set for a segment: the newest year at or before `year`
/// (down to the floor year), else the fixed fallback year, else empty.
pub fn benchmark_index(
    source: &dyn BenchmarkSource,
    segment: &IndustrySegment,
    year: i32,
    settings: &EngineSettings,
) -> Vec<BenchmarkRange> {
    for candidate in (settings.benchmark_floor_year..=year).rev() {
        let ranges = source.find_year(segment, candidate);
        if !ranges.is_empty() {
            return ranges;
        }
    }
    source.find_year(segment, settings.benchmark_fallback_year)
}
