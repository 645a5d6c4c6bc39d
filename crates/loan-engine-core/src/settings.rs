use serde::{Deserialize, Serialize};

/// Year tried after the requested year and the year before it.
pub const DEFAULT_BENCHMARK_FALLBACK_YEAR: i32 = 2022;

/// Oldest year the benchmark index scan walks back to.
pub const DEFAULT_BENCHMARK_FLOOR_YEAR: i32 = 2000;

/// Decimal places fiscal ratios are quantised to.
pub const DEFAULT_DECIMAL_PLACES: u32 = 2;

/// Tunables shared by the benchmark and ratio modules.
///
/// Every field has a default, so a partial config file deserialises cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub benchmark_fallback_year: i32,
    pub benchmark_floor_year: i32,
    pub decimal_places: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            benchmark_fallback_year: DEFAULT_BENCHMARK_FALLBACK_YEAR,
            benchmark_floor_year: DEFAULT_BENCHMARK_FLOOR_YEAR,
            decimal_places: DEFAULT_DECIMAL_PLACES,
        }
    }
}
