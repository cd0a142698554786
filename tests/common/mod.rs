#![allow(dead_code)]

use chrono::NaiveDate;
use shocktrader::domain::backtest::BacktestConfig;
use shocktrader::domain::error::ShocktraderError;
pub use shocktrader::domain::price::{PricePoint, PriceSeries, PriceTable};
use shocktrader::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_points(mut self, ticker: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(ticker.to_string(), points);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, ShocktraderError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(ShocktraderError::Database {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.date >= start_date && p.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_tickers(&self) -> Result<Vec<String>, ShocktraderError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, ShocktraderError> {
        match self.data.get(ticker) {
            Some(points) if !points.is_empty() => {
                let min = points.iter().map(|p| p.date).min().unwrap();
                let max = points.iter().map(|p| p.date).max().unwrap();
                Ok(Some((min, max, points.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn day(i: usize) -> NaiveDate {
    date(2024, 1, 1) + chrono::Duration::days(i as i64)
}

/// One point per consecutive calendar day starting 2024-01-01.
pub fn points_from_closes(ticker: &str, closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint {
            date: day(i),
            ticker: ticker.to_string(),
            close,
        })
        .collect()
}

/// Compounds `returns` from a starting close of 100.
pub fn closes_from_returns(returns: &[f64]) -> Vec<f64> {
    let mut close = 100.0;
    let mut out = vec![close];
    for r in returns {
        close *= 1.0 + r;
        out.push(close);
    }
    out
}

/// Deterministic, non-constant return pattern with period three.
pub fn wave_returns(n: usize, amplitude: f64, phase: usize) -> Vec<f64> {
    (0..n)
        .map(|i| match (i + phase) % 3 {
            0 => amplitude,
            1 => -amplitude / 2.0,
            _ => -amplitude / 4.0,
        })
        .collect()
}

pub fn table_from(series: &[(&str, Vec<f64>)]) -> PriceTable {
    let points = series
        .iter()
        .flat_map(|(ticker, closes)| points_from_closes(ticker, closes))
        .collect();
    PriceTable::from_points(points).unwrap()
}

pub fn test_config(pool: &[&str]) -> BacktestConfig {
    BacktestConfig {
        benchmark_ticker: "BM".into(),
        asset_pool: pool.iter().map(|s| s.to_string()).collect(),
        ..BacktestConfig::default()
    }
}
