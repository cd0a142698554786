//! Report output port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::ShocktraderError;
use crate::domain::metrics::BacktestReport;
use std::path::Path;

/// Port for persisting a finished run.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        report: &BacktestReport,
        output_path: &Path,
    ) -> Result<(), ShocktraderError>;
}
