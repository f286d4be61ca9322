//! Behavior-driven tests for the rolling average engine
//!
//! These tests verify the trailing-mean contract over whole series: alignment,
//! warm-up gaps, window bounds and the handling of missing closes.

use stockdash_core::{rolling_mean, Bar, BarSeries, DerivedSeries, RollingWindow, Symbol, TradingDate};

fn closes(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(Some).collect()
}

fn series_of(values: &[Option<f64>]) -> BarSeries {
    let symbol = Symbol::parse("TCS.NS").expect("valid");
    let start = TradingDate::parse("2024-01-01").expect("valid date");
    let bars = values
        .iter()
        .enumerate()
        .map(|(offset, close)| {
            let date = start.saturating_add_days(offset as i64);
            match close {
                Some(close) => Bar::new(date, Some(*close), Some(*close), Some(*close), Some(*close), None)
                    .expect("valid bar"),
                None => Bar::missing(date, None),
            }
        })
        .collect();
    BarSeries::from_provider_rows(symbol, bars)
}

// =============================================================================
// Rolling Average: Documented examples
// =============================================================================

#[test]
fn when_window_is_three_system_averages_each_trailing_triple() {
    // Given: Five closes
    let input = closes(&[10.0, 20.0, 30.0, 40.0, 50.0]);

    // When: A three-wide trailing mean is computed
    let output = rolling_mean(&input, 3);

    // Then: The first two positions are undefined and the rest are exact
    assert_eq!(output, vec![None, None, Some(20.0), Some(30.0), Some(40.0)]);
}

#[test]
fn when_series_is_shorter_than_window_system_returns_all_undefined() {
    // Given: Four closes and the minimum window
    let input = closes(&[1.0, 2.0, 3.0, 4.0]);

    // When: The mean is computed with a window of five
    let output = rolling_mean(&input, RollingWindow::MIN);

    // Then: Nothing is defined, but alignment is kept
    assert_eq!(output.len(), 4);
    assert!(output.iter().all(Option::is_none));
}

#[test]
fn when_series_is_empty_system_returns_empty_output() {
    assert!(rolling_mean(&[], RollingWindow::DEFAULT).is_empty());
}

// =============================================================================
// Rolling Average: Properties across the supported window range
// =============================================================================

#[test]
fn for_every_supported_window_output_is_aligned_with_warm_up_gap() {
    let input: Vec<Option<f64>> = (1..=120).map(|day| Some(f64::from(day) * 1.5)).collect();

    for window in RollingWindow::MIN..=RollingWindow::MAX {
        let output = rolling_mean(&input, window);

        assert_eq!(output.len(), input.len(), "window {window}");
        assert!(
            output[..window - 1].iter().all(Option::is_none),
            "window {window} defined a value before warm-up"
        );
        for (index, value) in output.iter().enumerate().skip(window - 1) {
            let expected: f64 = input[index + 1 - window..=index]
                .iter()
                .map(|close| close.expect("present"))
                .sum::<f64>()
                / window as f64;
            let actual = value.expect("defined after warm-up");
            assert!(
                (actual - expected).abs() < 1e-9,
                "window {window} index {index}: {actual} != {expected}"
            );
        }
    }
}

#[test]
fn constant_series_has_the_constant_as_its_mean() {
    let input = closes(&[42.0; 30]);

    for window in [RollingWindow::MIN, RollingWindow::DEFAULT] {
        let output = rolling_mean(&input, window);
        assert!(output[window - 1..].iter().all(|value| *value == Some(42.0)));
    }
}

#[test]
fn recomputing_with_the_same_inputs_is_deterministic() {
    let input = closes(&[3.2, 8.1, 5.5, 9.9, 1.4, 7.7, 6.0, 2.8]);

    let first = rolling_mean(&input, 5);
    let second = rolling_mean(&input, 5);

    assert_eq!(first, second);
}

// =============================================================================
// Rolling Average: Missing closes
// =============================================================================

#[test]
fn when_a_close_is_missing_system_leaves_every_window_covering_it_undefined() {
    // Given: Ten closes with the fourth one missing
    let mut input = closes(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
    input[3] = None;

    // When: A five-wide mean is computed
    let output = rolling_mean(&input, 5);

    // Then: Windows ending at indices 4..=7 contain the gap
    assert!(output[4..=7].iter().all(Option::is_none));
    assert_eq!(output[8], Some(7.0));
    assert_eq!(output[9], Some(8.0));
}

#[test]
fn when_a_close_is_not_finite_system_treats_it_as_missing() {
    let mut input = closes(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    input[5] = Some(f64::NAN);

    let output = rolling_mean(&input, 5);

    assert_eq!(output[4], Some(3.0));
    assert_eq!(output[5], None);
}

// =============================================================================
// Rolling Average: Window bounds and derived series
// =============================================================================

#[test]
fn when_window_is_outside_the_supported_range_system_clamps_it() {
    assert_eq!(RollingWindow::new(0).get(), RollingWindow::MIN);
    assert_eq!(RollingWindow::new(4).get(), RollingWindow::MIN);
    assert_eq!(RollingWindow::new(35).get(), 35);
    assert_eq!(RollingWindow::new(500).get(), RollingWindow::MAX);
    assert_eq!(RollingWindow::default().get(), RollingWindow::DEFAULT);
}

#[test]
fn derived_series_carries_the_bar_dates() {
    // Given: Six daily bars with a missing session in the middle
    let series = series_of(&[Some(10.0), Some(20.0), None, Some(40.0), Some(50.0), Some(60.0)]);

    // When: The derived series is built with the minimum window
    let derived = DerivedSeries::from_series(&series, RollingWindow::new(5));

    // Then: Every bar has a point on the same date and no window is complete
    assert_eq!(derived.len(), series.len());
    for (point, bar) in derived.points().iter().zip(series.bars()) {
        assert_eq!(point.date, bar.date);
    }
    assert!(!derived.has_values());
}
