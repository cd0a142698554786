//! Performance summary over the trade list.

use super::simulator::Trade;
use super::stats::{mean, sample_stddev};
use serde::Serialize;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub total_trades: usize,
    pub mean_return: f64,
    pub win_rate: f64,
    pub sharpe_ratio: f64,
    /// Non-positive fraction, e.g. -0.5 for a 50% peak-to-trough decline.
    pub max_drawdown: f64,
}

impl BacktestReport {
    pub fn compute(trades: &[Trade]) -> Self {
        let returns: Vec<f64> = trades.iter().map(|t| t.trade_return).collect();

        let total_trades = returns.len();
        let winners = returns.iter().filter(|&&r| r > 0.0).count();
        let win_rate = if total_trades > 0 {
            winners as f64 / total_trades as f64
        } else {
            0.0
        };

        BacktestReport {
            total_trades,
            mean_return: mean(&returns),
            win_rate,
            sharpe_ratio: compute_sharpe(&returns),
            max_drawdown: compute_max_drawdown(&returns),
        }
    }
}

/// mean / stddev * sqrt(252); 0 with fewer than two returns or zero spread.
fn compute_sharpe(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let stddev = sample_stddev(returns);
    if stddev == 0.0 {
        return 0.0;
    }
    mean(returns) / stddev * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Compounds returns in the order given, starting from 1.0. Trades that
/// overlap in time still chain one after another on this path.
fn compute_max_drawdown(returns: &[f64]) -> f64 {
    let mut value = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut max_dd = 0.0_f64;

    for r in returns {
        value *= 1.0 + r;
        if value > peak {
            peak = value;
        }
        let dd = (peak - value) / peak;
        if dd > max_dd {
            max_dd = dd;
        }
    }

    if max_dd > 0.0 { -max_dd } else { 0.0 }
}
