//! SQLite data adapter over a `daily_prices` table.

use crate::domain::config_validation::parse_pool_size;
use crate::domain::error::ShocktraderError;
use crate::domain::price::PricePoint;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use chrono::{Datelike, NaiveDate};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_err(e: r2d2::Error) -> ShocktraderError {
    ShocktraderError::Database {
        reason: e.to_string(),
    }
}

fn query_err(e: rusqlite::Error) -> ShocktraderError {
    ShocktraderError::DatabaseQuery {
        reason: e.to_string(),
    }
}

/// Dates are stored as `YYYY-MM-DD` text, so open-ended bounds are pinned to
/// four-digit years to keep string comparison meaningful.
fn sql_date(date: NaiveDate) -> String {
    match date.year() {
        y if y < 0 => "0000-01-01".to_string(),
        y if y > 9999 => "9999-12-31".to_string(),
        _ => date.format("%Y-%m-%d").to_string(),
    }
}

fn parse_date(value: String) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            value.len(),
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ShocktraderError> {
        let db_path =
            config
                .get_string("data", "sqlite_path")
                .ok_or_else(|| ShocktraderError::ConfigMissing {
                    section: "data".into(),
                    key: "sqlite_path".into(),
                })?;
        let pool_size = parse_pool_size(config)?;
        Self::open(db_path, pool_size)
    }

    pub fn open<P: AsRef<Path>>(path: P, pool_size: u32) -> Result<Self, ShocktraderError> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .build(manager)
            .map_err(pool_err)?;
        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, ShocktraderError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_err)?;
        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, ShocktraderError> {
        self.pool.get().map_err(pool_err)
    }

    pub fn initialize_schema(&self) -> Result<(), ShocktraderError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS daily_prices (
                    date TEXT NOT NULL,
                    ticker TEXT NOT NULL,
                    close REAL NOT NULL,
                    PRIMARY KEY (ticker, date)
                );
                CREATE INDEX IF NOT EXISTS idx_daily_prices_date ON daily_prices(date);",
            )
            .map_err(query_err)
    }

    /// Upserts in one transaction; a later row for the same ticker-day wins.
    pub fn insert_points(&self, points: &[PricePoint]) -> Result<usize, ShocktraderError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO daily_prices (date, ticker, close)
                     VALUES (?1, ?2, ?3)",
                )
                .map_err(query_err)?;
            for p in points {
                stmt.execute(params![
                    p.date.format("%Y-%m-%d").to_string(),
                    p.ticker,
                    p.close
                ])
                .map_err(query_err)?;
            }
        }
        tx.commit().map_err(query_err)?;
        Ok(points.len())
    }
}

impl DataPort for SqliteAdapter {
    fn fetch_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, ShocktraderError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT date, ticker, close FROM daily_prices
                 WHERE ticker = ?1 AND date >= ?2 AND date <= ?3
                 ORDER BY date ASC",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map(
                params![
                    ticker,
                    sql_date(start_date),
                    sql_date(end_date)
                ],
                |row| {
                    Ok(PricePoint {
                        date: parse_date(row.get(0)?)?,
                        ticker: row.get(1)?,
                        close: row.get(2)?,
                    })
                },
            )
            .map_err(query_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }

    fn list_tickers(&self) -> Result<Vec<String>, ShocktraderError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT ticker FROM daily_prices ORDER BY ticker")
            .map_err(query_err)?;
        let rows = stmt.query_map([], |row| row.get(0)).map_err(query_err)?;
        rows.collect::<Result<Vec<String>, _>>().map_err(query_err)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, ShocktraderError> {
        let conn = self.conn()?;
        let (min, max, count): (Option<String>, Option<String>, i64) = conn
            .query_row(
                "SELECT MIN(date), MAX(date), COUNT(*) FROM daily_prices WHERE ticker = ?1",
                params![ticker],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(query_err)?;

        match (min, max) {
            (Some(min), Some(max)) if count > 0 => Ok(Some((
                parse_date(min).map_err(query_err)?,
                parse_date(max).map_err(query_err)?,
                count as usize,
            ))),
            _ => Ok(None),
        }
    }
}
