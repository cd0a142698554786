//! CSV trade log, CSV report summary and plain-text console summary.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::ShocktraderError;
use crate::domain::metrics::BacktestReport;
use crate::ports::report_port::ReportPort;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Writes the trade log, one row per trade with columns
/// `entry_date,exit_date,ticker,entry_price,exit_price,return`, and a
/// one-row summary with the `BacktestReport` field names.
///
/// The summary goes to `summary_path` when set, otherwise next to the trade
/// log as `<stem>_summary.csv`.
#[derive(Debug, Clone, Default)]
pub struct CsvReportAdapter {
    summary_path: Option<PathBuf>,
}

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_summary_path(mut self, path: PathBuf) -> Self {
        self.summary_path = Some(path);
        self
    }

    pub fn summary_path_for(&self, trades_path: &Path) -> PathBuf {
        self.summary_path
            .clone()
            .unwrap_or_else(|| default_summary_path(trades_path))
    }

    pub fn trades_to_string(result: &BacktestResult) -> Result<String, ShocktraderError> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_trades(&mut wtr, result)?;
        into_string(wtr)
    }

    pub fn report_to_string(report: &BacktestReport) -> Result<String, ShocktraderError> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_report(&mut wtr, report)?;
        into_string(wtr)
    }
}

/// `trades.csv` -> `trades_summary.csv` in the same directory.
pub fn default_summary_path(trades_path: &Path) -> PathBuf {
    let stem = trades_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "trades".to_string());
    trades_path.with_file_name(format!("{}_summary.csv", stem))
}

fn into_string(wtr: csv::Writer<Vec<u8>>) -> Result<String, ShocktraderError> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| ShocktraderError::Io(std::io::Error::other(e.to_string())))?;
    String::from_utf8(bytes).map_err(|e| ShocktraderError::Io(std::io::Error::other(e)))
}

fn csv_err(e: csv::Error) -> ShocktraderError {
    ShocktraderError::Io(std::io::Error::other(e))
}

fn write_trades<W: std::io::Write>(
    wtr: &mut csv::Writer<W>,
    result: &BacktestResult,
) -> Result<(), ShocktraderError> {
    if result.trades.is_empty() {
        wtr.write_record([
            "entry_date",
            "exit_date",
            "ticker",
            "entry_price",
            "exit_price",
            "return",
        ])
        .map_err(csv_err)?;
    }
    for trade in &result.trades {
        wtr.serialize(trade).map_err(csv_err)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_report<W: std::io::Write>(
    wtr: &mut csv::Writer<W>,
    report: &BacktestReport,
) -> Result<(), ShocktraderError> {
    wtr.serialize(report).map_err(csv_err)?;
    wtr.flush()?;
    Ok(())
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        report: &BacktestReport,
        output_path: &Path,
    ) -> Result<(), ShocktraderError> {
        let mut trades = csv::Writer::from_path(output_path).map_err(csv_err)?;
        write_trades(&mut trades, result)?;

        let mut summary =
            csv::Writer::from_path(self.summary_path_for(output_path)).map_err(csv_err)?;
        write_report(&mut summary, report)
    }
}

/// Console summary, percentages to two decimals.
pub fn format_summary(report: &BacktestReport) -> String {
    if report.total_trades == 0 {
        return "No trades were executed.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "--- Backtest Report ---");
    let _ = writeln!(out, "Total Trades:          {}", report.total_trades);
    let _ = writeln!(
        out,
        "Mean Return per Trade: {:.2}%",
        report.mean_return * 100.0
    );
    let _ = writeln!(out, "Win Rate:              {:.2}%", report.win_rate * 100.0);
    let _ = writeln!(out, "Sharpe Ratio:          {:.2}", report.sharpe_ratio);
    let _ = writeln!(
        out,
        "Maximum Drawdown:      {:.2}%",
        report.max_drawdown * 100.0
    );
    let _ = writeln!(out, "-----------------------");
    out
}
