//! Fixed-horizon trade simulation.
//!
//! Entry at the close on the trigger date, exit `holding_period` rows later in
//! the same ticker's series. Friction is charged once per trade.

use crate::domain::price::PriceSeries;
use crate::domain::skip::SkipReason;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub ticker: String,
    pub entry_price: f64,
    pub exit_price: f64,
    #[serde(rename = "return")]
    pub trade_return: f64,
}

/// (exit / entry - 1) - friction
pub fn net_return(entry_price: f64, exit_price: f64, friction_cost: f64) -> f64 {
    (exit_price / entry_price - 1.0) - friction_cost
}

pub fn simulate_trade(
    series: &PriceSeries,
    trigger_date: NaiveDate,
    holding_period: usize,
    friction_cost: f64,
) -> Result<Trade, SkipReason> {
    let Some(entry_index) = series.index_of(trigger_date) else {
        warn!(ticker = %series.ticker, date = %trigger_date, "no price on trigger date, trade skipped");
        return Err(SkipReason::MissingObservation);
    };

    let exit_index = entry_index + holding_period;
    let (Some(entry), Some(exit)) = (series.get(entry_index), series.get(exit_index)) else {
        debug!(
            ticker = %series.ticker,
            date = %trigger_date,
            exit_index,
            available = series.len(),
            "exit beyond available history, trade dropped"
        );
        return Err(SkipReason::IncompleteTrade {
            entry_index,
            exit_index,
            available: series.len(),
        });
    };

    Ok(Trade {
        entry_date: entry.date,
        exit_date: exit.date,
        ticker: series.ticker.clone(),
        entry_price: entry.close,
        exit_price: exit.close,
        trade_return: net_return(entry.close, exit.close, friction_cost),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::PricePoint;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn day(i: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() + chrono::Duration::days(i as i64)
    }

    fn series(closes: &[f64]) -> PriceSeries {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: day(i),
                ticker: "AAA".into(),
                close,
            })
            .collect();
        PriceSeries::new("AAA".into(), points).unwrap()
    }

    #[test]
    fn net_return_deducts_friction_once() {
        assert_abs_diff_eq!(net_return(100.0, 105.0, 0.0015), 0.0485, epsilon = 1e-12);
    }

    #[test]
    fn trade_uses_close_holding_period_rows_later() {
        let s = series(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0]);
        let trade = simulate_trade(&s, day(0), 5, 0.0015).unwrap();

        assert_eq!(trade.entry_date, day(0));
        assert_eq!(trade.exit_date, day(5));
        assert_eq!(trade.entry_price, 100.0);
        assert_eq!(trade.exit_price, 105.0);
        assert_abs_diff_eq!(trade.trade_return, 0.0485, epsilon = 1e-12);
    }

    #[test]
    fn exit_on_last_row_is_kept() {
        let s = series(&[100.0, 101.0, 102.0, 103.0, 104.0, 95.0]);
        let trade = simulate_trade(&s, day(0), 5, 0.0).unwrap();
        assert_abs_diff_eq!(trade.trade_return, -0.05, epsilon = 1e-12);
    }

    #[test]
    fn exit_past_history_is_incomplete() {
        let s = series(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        let err = simulate_trade(&s, day(1), 5, 0.0015).unwrap_err();
        assert_eq!(
            err,
            SkipReason::IncompleteTrade {
                entry_index: 1,
                exit_index: 6,
                available: 5
            }
        );
    }

    #[test]
    fn missing_trigger_date_is_skipped() {
        let s = series(&[100.0, 101.0]);
        let err = simulate_trade(&s, day(10), 1, 0.0).unwrap_err();
        assert_eq!(err, SkipReason::MissingObservation);
    }

    proptest! {
        #[test]
        fn never_exits_past_series_end(len in 1usize..40, entry in 0usize..40, hold in 1usize..10) {
            let closes: Vec<f64> = (0..len).map(|i| 100.0 + i as f64).collect();
            let s = series(&closes);
            if let Ok(trade) = simulate_trade(&s, day(entry), hold, 0.0) {
                let exit_index = s.index_of(trade.exit_date).unwrap();
                prop_assert!(exit_index < s.len());
                prop_assert_eq!(exit_index, s.index_of(trade.entry_date).unwrap() + hold);
            }
        }
    }
}
