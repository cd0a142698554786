//! Daily closing prices: single points, per-ticker series and the loaded table.

use crate::domain::error::ShocktraderError;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub ticker: String,
    pub close: f64,
}

/// One ticker's closes, strictly ascending by date.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub ticker: String,
    points: Vec<PricePoint>,
    date_index: HashMap<NaiveDate, usize>,
}

impl PriceSeries {
    /// Sorts `points` by date and indexes them. Two points on the same date
    /// are rejected rather than silently merged.
    pub fn new(ticker: String, mut points: Vec<PricePoint>) -> Result<Self, ShocktraderError> {
        points.sort_by_key(|p| p.date);

        let mut date_index = HashMap::with_capacity(points.len());
        for (i, point) in points.iter().enumerate() {
            if date_index.insert(point.date, i).is_some() {
                return Err(ShocktraderError::DuplicateDate {
                    ticker,
                    date: point.date,
                });
            }
        }

        Ok(Self {
            ticker,
            points,
            date_index,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn get(&self, index: usize) -> Option<&PricePoint> {
        self.points.get(index)
    }

    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.date_index.get(&date).copied()
    }

    pub fn close_on(&self, date: NaiveDate) -> Option<f64> {
        self.index_of(date).map(|i| self.points[i].close)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

/// Every loaded series keyed by ticker. Read-only once a run starts.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    series: BTreeMap<String, PriceSeries>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups loose points by ticker and builds one series per ticker.
    pub fn from_points(points: Vec<PricePoint>) -> Result<Self, ShocktraderError> {
        let mut grouped: BTreeMap<String, Vec<PricePoint>> = BTreeMap::new();
        for point in points {
            grouped.entry(point.ticker.clone()).or_default().push(point);
        }

        let mut table = Self::new();
        for (ticker, points) in grouped {
            table.insert(PriceSeries::new(ticker, points)?);
        }
        Ok(table)
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.ticker.clone(), series);
    }

    pub fn get(&self, ticker: &str) -> Option<&PriceSeries> {
        self.series.get(ticker)
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn total_points(&self) -> usize {
        self.series.values().map(PriceSeries::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(ticker: &str, date: &str, close: f64) -> PricePoint {
        PricePoint {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            ticker: ticker.to_string(),
            close,
        }
    }

    #[test]
    fn series_sorts_and_indexes_by_date() {
        let series = PriceSeries::new(
            "SPY".into(),
            vec![
                point("SPY", "2024-01-03", 102.0),
                point("SPY", "2024-01-01", 100.0),
                point("SPY", "2024-01-02", 101.0),
            ],
        )
        .unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![100.0, 101.0, 102.0]);
        assert_eq!(
            series.index_of(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()),
            Some(2)
        );
        assert_eq!(
            series.first_date(),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
    }

    #[test]
    fn series_rejects_duplicate_dates() {
        let result = PriceSeries::new(
            "SPY".into(),
            vec![
                point("SPY", "2024-01-01", 100.0),
                point("SPY", "2024-01-01", 101.0),
            ],
        );
        assert!(matches!(
            result,
            Err(ShocktraderError::DuplicateDate { ticker, .. }) if ticker == "SPY"
        ));
    }

    #[test]
    fn close_on_missing_date_is_none() {
        let series =
            PriceSeries::new("SPY".into(), vec![point("SPY", "2024-01-01", 100.0)]).unwrap();
        assert!(
            series
                .close_on(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
                .is_none()
        );
    }

    #[test]
    fn table_groups_points_by_ticker() {
        let table = PriceTable::from_points(vec![
            point("B", "2024-01-02", 11.0),
            point("A", "2024-01-01", 1.0),
            point("B", "2024-01-01", 10.0),
        ])
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.total_points(), 3);
        assert_eq!(table.tickers().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(table.get("B").unwrap().closes(), vec![10.0, 11.0]);
        assert!(table.get("C").is_none());
    }
}
