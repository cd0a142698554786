//! Ticker lists: parsing the configured pool and loading the price table.
//!
//! Pool tickers with no rows are left out of the table and simply never rank.
//! A failing data source aborts the load.

use crate::domain::error::ShocktraderError;
use crate::domain::price::{PriceSeries, PriceTable};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{info, warn};

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),
}

/// Comma-separated list, trimmed and uppercased. Order is preserved since it
/// breaks ties when ranking.
pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateTicker(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

#[derive(Debug, Clone)]
pub struct LoadSummary {
    pub loaded: Vec<(String, usize)>,
    pub missing: Vec<String>,
}

pub fn load_price_table(
    data_port: &dyn DataPort,
    tickers: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<(PriceTable, LoadSummary), ShocktraderError> {
    let mut table = PriceTable::new();
    let mut summary = LoadSummary {
        loaded: Vec::new(),
        missing: Vec::new(),
    };

    for ticker in tickers {
        let points = data_port.fetch_closes(ticker, start_date, end_date)?;
        if points.is_empty() {
            warn!(ticker = %ticker, "no price data found");
            summary.missing.push(ticker.clone());
            continue;
        }

        let series = PriceSeries::new(ticker.clone(), points)?;
        info!(
            ticker = %ticker,
            prices = series.len(),
            first = ?series.first_date(),
            last = ?series.last_date(),
            "loaded"
        );
        summary.loaded.push((ticker.clone(), series.len()));
        table.insert(series);
    }

    Ok((table, summary))
}
