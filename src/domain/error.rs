//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for shocktrader.
#[derive(Debug, thiserror::Error)]
pub enum ShocktraderError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error("duplicate price for {ticker} on {date}")]
    DuplicateDate { ticker: String, date: NaiveDate },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ShocktraderError> for std::process::ExitCode {
    fn from(err: &ShocktraderError) -> Self {
        let code: u8 = match err {
            ShocktraderError::Io(_) => 1,
            ShocktraderError::ConfigParse { .. }
            | ShocktraderError::ConfigMissing { .. }
            | ShocktraderError::ConfigInvalid { .. } => 2,
            ShocktraderError::Database { .. } | ShocktraderError::DatabaseQuery { .. } => 3,
            ShocktraderError::NoData { .. } | ShocktraderError::DuplicateDate { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
