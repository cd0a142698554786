//! Non-fatal reasons a candidate is dropped during a run.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Fewer aligned return observations than the correlation window needs.
    InsufficientHistory { observations: usize, required: usize },
    /// Zero variance on either side of the correlation.
    DegenerateStatistics,
    /// No close on the trigger date.
    MissingObservation,
    /// Exit falls past the end of the series.
    IncompleteTrade {
        entry_index: usize,
        exit_index: usize,
        available: usize,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InsufficientHistory {
                observations,
                required,
            } => write!(
                f,
                "insufficient history ({} observations, {} required)",
                observations, required
            ),
            SkipReason::DegenerateStatistics => write!(f, "zero variance in window"),
            SkipReason::MissingObservation => write!(f, "no price on trigger date"),
            SkipReason::IncompleteTrade {
                exit_index,
                available,
                ..
            } => write!(
                f,
                "exit index {} beyond {} available prices",
                exit_index, available
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedCandidate {
    pub trigger_date: NaiveDate,
    pub ticker: String,
    pub reason: SkipReason,
}
