pub mod indicator;
pub mod scoring;
pub mod source;

pub use indicator::{CompanySize, Indicator, IndicatorGroup, IndustrySegment};
pub use scoring::{
    finance_score, is_forced_lowest, score_indicator, score_request, score_value,
    IndicatorScore, ScoreRequest,
};
pub use source::{
    benchmark_index, resolve_benchmark, BenchmarkFallback, BenchmarkKey, BenchmarkRange,
    BenchmarkSource, BenchmarkTable, ResolvedBenchmark,
};
