//! Backtest engine: one linear sweep over benchmark triggers.
//!
//! prices -> benchmark returns -> triggers -> ranking per trigger ->
//! trades for the top picks. Trades are appended by trigger index, then by
//! rank within the trigger.

use crate::domain::error::ShocktraderError;
use crate::domain::metrics::BacktestReport;
use crate::domain::price::PriceTable;
use crate::domain::ranking::rank_assets;
use crate::domain::simulator::{simulate_trade, Trade};
use crate::domain::skip::{SkipReason, SkippedCandidate};
use crate::domain::trigger::{detect_triggers, Trigger};
use chrono::NaiveDate;
use tracing::info;

pub const DEFAULT_BENCHMARK: &str = "DX-Y.NYB";
pub const DEFAULT_ASSET_POOL: [&str; 5] =
    ["600406.SS", "002028.SZ", "002270.SZ", "688676.SS", "159326.SZ"];

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub benchmark_ticker: String,
    pub asset_pool: Vec<String>,
    pub volatility_window: usize,
    pub correlation_window: usize,
    pub holding_period: usize,
    pub trigger_threshold: f64,
    pub friction_cost: f64,
    pub num_assets_to_pick: usize,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            benchmark_ticker: DEFAULT_BENCHMARK.to_string(),
            asset_pool: DEFAULT_ASSET_POOL.iter().map(|s| s.to_string()).collect(),
            volatility_window: 20,
            correlation_window: 30,
            holding_period: 5,
            trigger_threshold: 1.5,
            friction_cost: 0.0015,
            num_assets_to_pick: 3,
            start_date: None,
            end_date: None,
        }
    }
}

impl BacktestConfig {
    /// Benchmark first, then the pool in configured order.
    pub fn tickers(&self) -> Vec<String> {
        let mut tickers = vec![self.benchmark_ticker.clone()];
        tickers.extend(self.asset_pool.iter().cloned());
        tickers
    }
}

#[derive(Debug, Clone, Default)]
pub struct BacktestResult {
    pub triggers: Vec<Trigger>,
    /// Discovery order.
    pub trades: Vec<Trade>,
    pub skipped: Vec<SkippedCandidate>,
}

impl BacktestResult {
    pub fn report(&self) -> BacktestReport {
        BacktestReport::compute(&self.trades)
    }

    pub fn skipped_count(&self, pred: impl Fn(&SkipReason) -> bool) -> usize {
        self.skipped.iter().filter(|s| pred(&s.reason)).count()
    }
}

pub fn run_backtest(
    table: &PriceTable,
    config: &BacktestConfig,
) -> Result<BacktestResult, ShocktraderError> {
    let benchmark = table
        .get(&config.benchmark_ticker)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ShocktraderError::NoData {
            ticker: config.benchmark_ticker.clone(),
        })?;

    let mut result = BacktestResult {
        triggers: detect_triggers(
            benchmark,
            config.volatility_window,
            config.trigger_threshold,
        ),
        ..Default::default()
    };

    for trigger in &result.triggers {
        let ranking = rank_assets(
            table,
            benchmark,
            trigger.date,
            &config.asset_pool,
            config.correlation_window,
        );
        result.skipped.extend(ranking.skipped.iter().cloned());

        for pick in ranking.top(config.num_assets_to_pick) {
            let Some(series) = table.get(&pick.ticker) else {
                continue;
            };
            match simulate_trade(
                series,
                trigger.date,
                config.holding_period,
                config.friction_cost,
            ) {
                Ok(trade) => result.trades.push(trade),
                Err(reason) => result.skipped.push(SkippedCandidate {
                    trigger_date: trigger.date,
                    ticker: pick.ticker.clone(),
                    reason,
                }),
            }
        }
    }

    info!(
        triggers = result.triggers.len(),
        trades = result.trades.len(),
        skipped = result.skipped.len(),
        "backtest complete"
    );

    Ok(result)
}
