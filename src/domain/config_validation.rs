//! Configuration validation.
//!
//! Checks every `[backtest]` and `[data]` field before any prices are loaded.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::ShocktraderError;
use crate::domain::universe::parse_codes;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), ShocktraderError> {
    validate_windows(config)?;
    validate_holding_period(config)?;
    validate_threshold(config)?;
    validate_friction(config)?;
    validate_picks(config)?;
    validate_tickers(config)?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), ShocktraderError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "csv".to_string());
    let key = match source.to_lowercase().as_str() {
        "csv" => "csv_path",
        "sqlite" => "sqlite_path",
        _ => {
            return Err(invalid(
                "data",
                "source",
                format!("unknown source '{}', expected csv or sqlite", source),
            ));
        }
    };
    if config.get_string("data", key).is_none() {
        return Err(ShocktraderError::ConfigMissing {
            section: "data".to_string(),
            key: key.to_string(),
        });
    }
    if key == "sqlite_path" {
        parse_pool_size(config)?;
    }
    Ok(())
}

pub const DEFAULT_POOL_SIZE: u32 = 4;

/// `[data] pool_size`, a positive connection count.
pub fn parse_pool_size(config: &dyn ConfigPort) -> Result<u32, ShocktraderError> {
    let raw = config.get_int("data", "pool_size", i64::from(DEFAULT_POOL_SIZE));
    u32::try_from(raw)
        .ok()
        .filter(|&n| n >= 1)
        .ok_or_else(|| invalid("data", "pool_size", format!("pool_size must be at least 1, got {}", raw)))
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> ShocktraderError {
    ShocktraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), ShocktraderError> {
    for (key, default) in [("volatility_window", 20), ("correlation_window", 30)] {
        if config.get_int("backtest", key, default) < 2 {
            return Err(invalid("backtest", key, format!("{} must be at least 2", key)));
        }
    }
    Ok(())
}

fn validate_holding_period(config: &dyn ConfigPort) -> Result<(), ShocktraderError> {
    if config.get_int("backtest", "holding_period", 5) < 1 {
        return Err(invalid(
            "backtest",
            "holding_period",
            "holding_period must be at least 1",
        ));
    }
    Ok(())
}

fn validate_threshold(config: &dyn ConfigPort) -> Result<(), ShocktraderError> {
    let value = config.get_double("backtest", "trigger_threshold", 1.5);
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(
            "backtest",
            "trigger_threshold",
            "trigger_threshold must be non-negative",
        ));
    }
    Ok(())
}

fn validate_friction(config: &dyn ConfigPort) -> Result<(), ShocktraderError> {
    let value = config.get_double("backtest", "friction_cost", 0.0015);
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "backtest",
            "friction_cost",
            "friction_cost must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_picks(config: &dyn ConfigPort) -> Result<(), ShocktraderError> {
    if config.get_int("backtest", "num_assets_to_pick", 3) < 1 {
        return Err(invalid(
            "backtest",
            "num_assets_to_pick",
            "num_assets_to_pick must be at least 1",
        ));
    }
    Ok(())
}

/// `benchmark` and `asset_pool` are optional and fall back to the
/// `BacktestConfig` defaults; whatever ends up in effect must be consistent.
fn validate_tickers(config: &dyn ConfigPort) -> Result<(), ShocktraderError> {
    let defaults = BacktestConfig::default();

    let benchmark = config
        .get_string("backtest", "benchmark")
        .map(|s| s.to_uppercase())
        .unwrap_or(defaults.benchmark_ticker);

    let pool = match config.get_string("backtest", "asset_pool") {
        Some(s) => parse_codes(&s).map_err(|e| invalid("backtest", "asset_pool", e.to_string()))?,
        None => defaults.asset_pool,
    };

    if pool.contains(&benchmark) {
        return Err(invalid(
            "backtest",
            "asset_pool",
            format!("benchmark {} must not be in the asset pool", benchmark),
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), ShocktraderError> {
    let start = parse_optional_date(config, "start_date")?;
    let end = parse_optional_date(config, "end_date")?;

    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(invalid(
                "backtest",
                "start_date",
                "start_date must be before end_date",
            ));
        }
    }
    Ok(())
}

pub fn parse_optional_date(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<NaiveDate>, ShocktraderError> {
    config
        .get_string("backtest", key)
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| {
                invalid(
                    "backtest",
                    key,
                    format!("invalid {} format, expected YYYY-MM-DD", key),
                )
            })
        })
        .transpose()
}
