//! CSV file data adapter.
//!
//! Reads one long-format file holding every ticker, one row per ticker-day:
//! `Date,Ticker,Open,High,Low,Close,AdjClose,Volume`. Columns are located by
//! header name, case-insensitively, so only `Date`, `Ticker` and `Close` are
//! required. The file is parsed once, on first access, and kept grouped by
//! ticker for every later query.

use crate::domain::error::ShocktraderError;
use crate::domain::price::PricePoint;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Date-sorted rows per ticker.
type TickerRows = BTreeMap<String, Vec<PricePoint>>;

pub struct CsvAdapter {
    path: PathBuf,
    rows: OnceLock<TickerRows>,
}

struct Columns {
    date: usize,
    ticker: usize,
    close: usize,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            rows: OnceLock::new(),
        }
    }

    fn rows(&self) -> Result<&TickerRows, ShocktraderError> {
        if let Some(rows) = self.rows.get() {
            return Ok(rows);
        }
        let mut grouped = TickerRows::new();
        for point in self.read_all()? {
            grouped.entry(point.ticker.clone()).or_default().push(point);
        }
        for points in grouped.values_mut() {
            points.sort_by_key(|p| p.date);
        }
        Ok(self.rows.get_or_init(|| grouped))
    }

    fn locate_columns(headers: &csv::StringRecord) -> Result<Columns, ShocktraderError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| ShocktraderError::Database {
                    reason: format!("missing {} column", name),
                })
        };
        Ok(Columns {
            date: find("date")?,
            ticker: find("ticker")?,
            close: find("close")?,
        })
    }

    /// Every row in the file, in file order.
    pub fn read_all(&self) -> Result<Vec<PricePoint>, ShocktraderError> {
        let content = fs::read_to_string(&self.path).map_err(|e| ShocktraderError::Database {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| ShocktraderError::Database {
                reason: format!("CSV header error: {}", e),
            })?
            .clone();
        let cols = Self::locate_columns(&headers)?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| ShocktraderError::Database {
                reason: format!("CSV parse error: {}", e),
            })?;

            let field = |idx: usize, name: &str| {
                record.get(idx).ok_or_else(|| ShocktraderError::Database {
                    reason: format!("missing {} value", name),
                })
            };

            let date_str = field(cols.date, "date")?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                ShocktraderError::Database {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            let close: f64 = field(cols.close, "close")?
                .trim()
                .parse()
                .map_err(|e| ShocktraderError::Database {
                    reason: format!("invalid close value: {}", e),
                })?;

            points.push(PricePoint {
                date,
                ticker: field(cols.ticker, "ticker")?.trim().to_string(),
                close,
            });
        }

        Ok(points)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, ShocktraderError> {
        Ok(self
            .rows()?
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
        Ok(self.rows()?.keys().cloned().collect())
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, ShocktraderError> {
        Ok(self.rows()?.get(ticker).and_then(|points| {
            let first = points.first()?.date;
            let last = points.last()?.date;
            Some((first, last, points.len()))
        }))
    }
}
