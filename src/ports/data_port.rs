//! Price data access port trait.

use crate::domain::error::ShocktraderError;
use crate::domain::price::PricePoint;
use chrono::NaiveDate;

pub trait DataPort {
    /// Closes for `ticker` within `[start_date, end_date]`, ascending by date.
    /// An unknown ticker yields an empty vector, not an error.
    fn fetch_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, ShocktraderError>;

    fn list_tickers(&self) -> Result<Vec<String>, ShocktraderError>;

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, ShocktraderError>;
}
