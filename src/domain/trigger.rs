//! Volatility trigger detection on the benchmark series.
//!
//! A trigger fires at return index i (i >= window) when
//! returns[i] > threshold * STDDEV(returns[i - window .. i]).
//! Only upside moves qualify; large negative returns never fire.

use crate::domain::price::PriceSeries;
use crate::domain::returns::daily_returns;
use crate::domain::stats::sample_stddev;
use chrono::NaiveDate;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    /// Index into the benchmark return series.
    pub index: usize,
    /// Date of the benchmark close at `index + 1`.
    pub date: NaiveDate,
    pub benchmark_return: f64,
    pub volatility: f64,
}

/// Indices of every qualifying return, in ascending order.
pub fn detect_trigger_indices(returns: &[f64], window: usize, threshold: f64) -> Vec<usize> {
    if window == 0 {
        return Vec::new();
    }
    (window..returns.len())
        .filter(|&i| returns[i] > threshold * sample_stddev(&returns[i - window..i]))
        .collect()
}

pub fn detect_triggers(benchmark: &PriceSeries, window: usize, threshold: f64) -> Vec<Trigger> {
    let returns = daily_returns(&benchmark.closes());

    let mut triggers = Vec::new();
    for i in detect_trigger_indices(&returns, window, threshold) {
        // returns[i] ends on price i + 1, which always exists.
        let Some(point) = benchmark.get(i + 1) else {
            continue;
        };
        let volatility = sample_stddev(&returns[i - window..i]);
        info!(
            date = %point.date,
            benchmark_return = returns[i],
            volatility,
            "trigger detected"
        );
        triggers.push(Trigger {
            index: i,
            date: point.date,
            benchmark_return: returns[i],
            volatility,
        });
    }
    triggers
}
