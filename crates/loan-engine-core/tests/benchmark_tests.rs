use loan_engine_core::benchmark::{
    benchmark_index, finance_score, resolve_benchmark, score_indicator, BenchmarkFallback,
    BenchmarkKey, BenchmarkRange, BenchmarkTable, CompanySize, Indicator, IndustrySegment,
    ScoreRequest,
};
use loan_engine_core::EngineSettings;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

fn segment() -> IndustrySegment {
    IndustrySegment {
        industry_classification: "I".into(),
        industry_subclassification: "I56".into(),
        company_size: CompanySize::Small,
    }
}

fn range(year: i32, indicator: Indicator, thresholds: [Decimal; 4]) -> BenchmarkRange {
    BenchmarkRange {
        year,
        segment: segment(),
        indicator,
        median: None,
        standard_deviation: None,
        range_iv: thresholds[0],
        range_iii: thresholds[1],
        range_ii: thresholds[2],
        range_i: thresholds[3],
    }
}

fn margin_thresholds() -> [Decimal; 4] {
    [dec!(0), dec!(5), dec!(10), dec!(15)]
}

fn request(year: i32, indicator: Indicator, value: Decimal) -> ScoreRequest {
    ScoreRequest {
        segment: segment(),
        year,
        indicator,
        value,
        ebitda: None,
    }
}

// ===========================================================================
// Scoring against a table
// ===========================================================================

#[test]
fn test_margin_boundaries_through_the_table() {
    let table = BenchmarkTable::new(vec![range(
        2024,
        Indicator::OperatingProfitMargin,
        margin_thresholds(),
    )]);
    let settings = EngineSettings::default();
    let score = |v| finance_score(&table, &request(2024, Indicator::OperatingProfitMargin, v), &settings);

    assert_eq!(score(dec!(10)), Some(3));
    assert_eq!(score(dec!(15)), Some(4));
    assert_eq!(score(dec!(15.01)), Some(5));
}

#[test]
fn test_fallback_chain_year_previous_fixed_none() {
    let settings = EngineSettings::default();
    let indicator = Indicator::EquityRatio;
    let key = BenchmarkKey {
        year: 2025,
        segment: segment(),
        indicator,
    };

    let mut table = BenchmarkTable::default();
    assert_eq!(resolve_benchmark(&table, &key, &settings), None);

    table.push(range(2022, indicator, margin_thresholds()));
    let resolved = resolve_benchmark(&table, &key, &settings).unwrap();
    assert_eq!((resolved.year_used, resolved.fallback), (2022, BenchmarkFallback::FixedYear));

    table.push(range(2024, indicator, margin_thresholds()));
    let resolved = resolve_benchmark(&table, &key, &settings).unwrap();
    assert_eq!(
        (resolved.year_used, resolved.fallback),
        (2024, BenchmarkFallback::PreviousYear)
    );

    table.push(range(2025, indicator, margin_thresholds()));
    let resolved = resolve_benchmark(&table, &key, &settings).unwrap();
    assert_eq!(
        (resolved.year_used, resolved.fallback),
        (2025, BenchmarkFallback::RequestedYear)
    );
}

#[test]
fn test_two_years_back_is_not_searched() {
    // 2023 exists but the chain is 2025, 2024, 2022 only.
    let table = BenchmarkTable::new(vec![range(2023, Indicator::EquityRatio, margin_thresholds())]);
    let settings = EngineSettings::default();
    assert_eq!(
        finance_score(&table, &request(2025, Indicator::EquityRatio, dec!(20)), &settings),
        None
    );
}

#[test]
fn test_configured_fallback_year() {
    let table = BenchmarkTable::new(vec![range(2019, Indicator::EquityRatio, margin_thresholds())]);
    let settings = EngineSettings {
        benchmark_fallback_year: 2019,
        ..Default::default()
    };
    assert_eq!(
        finance_score(&table, &request(2025, Indicator::EquityRatio, dec!(7)), &settings),
        Some(3)
    );
}

#[test]
fn test_lookup_is_segment_specific() {
    let table = BenchmarkTable::new(vec![range(2024, Indicator::EquityRatio, margin_thresholds())]);
    let mut other = request(2024, Indicator::EquityRatio, dec!(7));
    other.segment.company_size = CompanySize::Large;
    assert_eq!(finance_score(&table, &other, &EngineSettings::default()), None);
}

#[test]
fn test_negative_ebitda_ratio_scores_one_without_benchmark() {
    let table = BenchmarkTable::default();
    let settings = EngineSettings::default();
    let req = request(2024, Indicator::EbitdaInterestBearingDebtRatio, dec!(-4.2));

    let output = score_indicator(&table, &req, &settings).unwrap();
    assert_eq!(output.result.score, Some(1));
    assert!(output.result.forced);
    assert_eq!(output.result.benchmark_year, None);
    assert_eq!(output.warnings, vec!["Non-positive EBITDA; score forced to 1.".to_string()]);
}

#[test]
fn test_ebitda_ratio_is_lower_is_better() {
    let table = BenchmarkTable::new(vec![range(
        2024,
        Indicator::EbitdaInterestBearingDebtRatio,
        [dec!(15), dec!(10), dec!(5), dec!(2)],
    )]);
    let settings = EngineSettings::default();
    let score = |v| {
        finance_score(
            &table,
            &request(2024, Indicator::EbitdaInterestBearingDebtRatio, v),
            &settings,
        )
    };
    assert_eq!(score(dec!(20)), Some(1));
    assert_eq!(score(dec!(6)), Some(3));
    assert_eq!(score(dec!(1.5)), Some(5));
}

#[test]
fn test_unscored_indicator_warns() {
    let output = score_indicator(
        &BenchmarkTable::default(),
        &request(2024, Indicator::SalesGrowthRate, dec!(3)),
        &EngineSettings::default(),
    )
    .unwrap();
    assert_eq!(output.result.score, None);
    assert_eq!(output.warnings.len(), 1);
    assert!(output.warnings[0].starts_with("No benchmark for sales_growth_rate"));
}

// ===========================================================================
// Whole-index lookup
// ===========================================================================

#[test]
fn test_benchmark_index_scans_back_to_newest_year() {
    let table = BenchmarkTable::new(vec![
        range(2020, Indicator::EquityRatio, margin_thresholds()),
        range(2020, Indicator::SalesGrowthRate, margin_thresholds()),
        range(2017, Indicator::EquityRatio, margin_thresholds()),
    ]);
    let settings = EngineSettings::default();

    let index = benchmark_index(&table, &segment(), 2025, &settings);
    assert_eq!(index.len(), 2);
    assert!(index.iter().all(|r| r.year == 2020));

    let index = benchmark_index(&table, &segment(), 2019, &settings);
    assert_eq!(index.len(), 1);
    assert_eq!(index[0].year, 2017);
}

#[test]
fn test_benchmark_index_falls_back_to_fixed_year() {
    // Nothing at or before 1999 down to the floor; 2022 is the last resort.
    let table = BenchmarkTable::new(vec![range(2022, Indicator::EquityRatio, margin_thresholds())]);
    let settings = EngineSettings::default();
    assert_eq!(benchmark_index(&table, &segment(), 1999, &settings)[0].year, 2022);
    assert!(benchmark_index(&BenchmarkTable::default(), &segment(), 2025, &settings).is_empty());
}

#[test]
fn test_table_loads_from_dataset_json() {
    let json = r#"[
        {
            "year": 2024,
            "industry_classification": "I",
            "industry_subclassification": "I56",
            "company_size": "s",
            "indicator": "EBITDA_interest_bearing_debt_ratio",
            "median": "6.1",
            "range_iv": "15",
            "range_iii": "10",
            "range_ii": "5",
            "range_i": "2"
        }
    ]"#;
    let table: BenchmarkTable = serde_json::from_str(json).unwrap();
    assert_eq!(table.len(), 1);
    let settings = EngineSettings::default();
    assert_eq!(
        finance_score(
            &table,
            &request(2024, Indicator::EbitdaInterestBearingDebtRatio, dec!(3)),
            &settings
        ),
        Some(4)
    );
}

// ===========================================================================
// Properties
// ===========================================================================

fn arb_thresholds() -> impl Strategy<Value = [Decimal; 4]> {
    prop::collection::vec(-500i64..500, 4).prop_map(|mut v| {
        v.sort();
        [v[0], v[1], v[2], v[3]].map(|x| Decimal::new(x, 1))
    })
}

proptest! {
    #[test]
    fn score_is_within_one_to_five(
        thresholds in arb_thresholds(),
        value in -1_000i64..1_000,
        higher in any::<bool>(),
    ) {
        let indicator = if higher { Indicator::EquityRatio } else { Indicator::OperatingWorkingCapitalTurnoverPeriod };
        let mut t = thresholds;
        if !higher {
            t.reverse();
        }
        let table = BenchmarkTable::new(vec![range(2024, indicator, t)]);
        let score = finance_score(&table, &request(2024, indicator, Decimal::new(value, 1)), &EngineSettings::default());
        prop_assert!(matches!(score, Some(1..=5)));
    }

    #[test]
    fn better_values_never_score_lower(
        thresholds in arb_thresholds(),
        a in -1_000i64..1_000,
        b in -1_000i64..1_000,
    ) {
        let table = BenchmarkTable::new(vec![range(2024, Indicator::EquityRatio, thresholds)]);
        let settings = EngineSettings::default();
        let (lo, hi) = (a.min(b), a.max(b));
        let score = |v: i64| finance_score(&table, &request(2024, Indicator::EquityRatio, Decimal::new(v, 1)), &settings);
        prop_assert!(score(lo) <= score(hi));
    }
}
