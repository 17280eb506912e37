use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use rstest::rstest;
use stock_trend::analyzer::{Analyzer, TrendAnalyzer};
use stock_trend::model::{AnalysisError, MonthKey, PriceSeries, TrendDirection};
use std::collections::BTreeMap;

fn daily_series(start: NaiveDate, values: &[f64]) -> PriceSeries {
    PriceSeries::from_rows(
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (start + Duration::days(i as i64), v))
            .collect(),
    )
    .unwrap()
}

fn simple(values: &[f64]) -> PriceSeries {
    daily_series(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), values)
}

#[test]
fn moving_average_matches_hand_computed_values() {
    let ma = TrendAnalyzer::new()
        .moving_average(&simple(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3)
        .unwrap();
    assert_eq!(ma, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
}

#[rstest]
#[case(1)]
#[case(5)]
#[case(17)]
#[case(40)]
fn moving_average_alignment(#[case] window: i64) {
    let values: Vec<f64> = (0..40).map(|i| ((i * 7) % 11) as f64 + 0.5).collect();
    let ma = TrendAnalyzer::new()
        .moving_average(&simple(&values), window)
        .unwrap();

    let w = window as usize;
    assert_eq!(ma.len(), values.len());
    assert!(ma[..w - 1].iter().all(Option::is_none));
    for i in (w - 1)..values.len() {
        let expected = values[i + 1 - w..=i].iter().sum::<f64>() / window as f64;
        assert_relative_eq!(ma[i].unwrap(), expected, epsilon = 1e-12);
    }
}

#[test]
fn window_larger_than_series_is_all_missing() {
    let ma = TrendAnalyzer::new()
        .moving_average(&simple(&[1.0, 2.0, 3.0]), 4)
        .unwrap();
    assert_eq!(ma, vec![None; 3]);
}

#[test]
fn monthly_grouping_is_complete_and_exact() {
    // 2019-12-20 through 2020-03-10, daily
    let start = NaiveDate::from_ymd_opt(2019, 12, 20).unwrap();
    let values: Vec<f64> = (0..82).map(|i| 100.0 + (i as f64).sin() * 5.0).collect();
    let series = daily_series(start, &values);

    let monthly = TrendAnalyzer::new().monthly_average(&series).unwrap();

    let mut expected: BTreeMap<MonthKey, Vec<f64>> = BTreeMap::new();
    for point in series.points() {
        expected.entry(MonthKey::of(point.date)).or_default().push(point.value);
    }

    assert_eq!(monthly.len(), expected.len());
    assert_eq!(monthly.len(), 4);
    for (entry, (month, vals)) in monthly.iter().zip(&expected) {
        assert_eq!(entry.month, *month);
        assert_eq!(entry.observations, vals.len());
        assert_relative_eq!(
            entry.average,
            vals.iter().sum::<f64>() / vals.len() as f64,
            epsilon = 1e-9
        );
    }
}

#[test]
fn monthly_average_is_idempotent() {
    let analyzer = TrendAnalyzer::new();
    let series = simple(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0]);
    let first = analyzer.monthly_average(&series).unwrap();
    let second = analyzer.monthly_average(&series).unwrap();
    assert_eq!(first, second);
    assert_eq!(series.values(), vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0]);
}

#[test]
fn run_detection_rising_and_falling() {
    let analyzer = TrendAnalyzer::new();
    let rising = analyzer
        .consecutive_run(&simple(&[1.0, 2.0, 3.0, 4.0, 5.0]), 2, TrendDirection::Rising)
        .unwrap();
    assert_eq!(rising, vec![false, false, true, true, true]);

    let falling = analyzer
        .consecutive_run(&simple(&[5.0, 4.0, 3.0, 2.0, 1.0]), 2, TrendDirection::Falling)
        .unwrap();
    assert_eq!(falling, vec![false, false, true, true, true]);

    let opposite = analyzer
        .consecutive_run(&simple(&[5.0, 4.0, 3.0, 2.0, 1.0]), 2, TrendDirection::Rising)
        .unwrap();
    assert!(opposite.iter().all(|&hit| !hit));
}

#[rstest]
#[case(TrendDirection::Rising)]
#[case(TrendDirection::Falling)]
fn tie_in_window_breaks_run(#[case] direction: TrendDirection) {
    let mask = TrendAnalyzer::new()
        .consecutive_run(&simple(&[1.0, 2.0, 2.0, 3.0]), 2, direction)
        .unwrap();
    assert!(!mask[2]);
}

#[test]
fn regression_on_linear_input() {
    let analyzer = TrendAnalyzer::new();
    let slice = analyzer
        .trailing_slice(&simple(&[2.0, 4.0, 6.0, 8.0, 10.0]), 5)
        .unwrap();
    assert_eq!(slice.xs, vec![0.0, 1.0, 2.0, 3.0, 4.0]);

    let line = analyzer.fit_line(&slice).unwrap();
    assert_eq!(line.slope, 2.0);
    assert_eq!(line.intercept, 2.0);
}

#[test]
fn regression_over_trailing_window_only() {
    let analyzer = TrendAnalyzer::new();
    // noisy history, then a clean rise over the last three days
    let series = simple(&[9.0, 1.0, 7.0, 3.0, 4.0, 5.0]);
    let slice = analyzer.trailing_slice(&series, 3).unwrap();
    assert_eq!(
        slice.label_dates,
        vec![
            NaiveDate::from_ymd_opt(2020, 1, 4).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 5).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 6).unwrap(),
        ]
    );
    let line = analyzer.fit_line(&slice).unwrap();
    assert_relative_eq!(line.slope, 1.0);
    assert_relative_eq!(line.intercept, 3.0);
}

#[test]
fn error_contract() {
    let analyzer = TrendAnalyzer::new();
    let series = simple(&[1.0, 2.0, 3.0]);

    assert_eq!(
        analyzer.moving_average(&series, 0),
        Err(AnalysisError::InvalidWindow(0))
    );
    assert_eq!(
        analyzer.consecutive_run(&series, -1, TrendDirection::Rising),
        Err(AnalysisError::InvalidWindow(-1))
    );
    assert_eq!(
        analyzer.consecutive_run_named(&series, 2, "sideways"),
        Err(AnalysisError::InvalidDirection("sideways".into()))
    );
    assert!(matches!(
        analyzer.trailing_slice(&simple(&[1.0]), 90),
        Err(AnalysisError::InsufficientData { required: 2, actual: 1 })
    ));
}
