//! Daily simple returns and date-keyed alignment of two price series.

use crate::domain::price::PriceSeries;
use chrono::NaiveDate;

/// r[i] = close[i+1] / close[i] - 1, or 0 when close[i] is zero.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|w| if w[0] != 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnPoint {
    /// Date of the closing price that ends the transition.
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone)]
pub struct ReturnSeries {
    pub ticker: String,
    pub points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub fn from_prices(series: &PriceSeries) -> Self {
        let values = daily_returns(&series.closes());
        let points = series
            .points()
            .iter()
            .skip(1)
            .zip(values)
            .map(|(p, value)| ReturnPoint {
                date: p.date,
                value,
            })
            .collect();
        Self {
            ticker: series.ticker.clone(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// Closes of two series paired on the calendar dates both of them carry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedCloses {
    pub dates: Vec<NaiveDate>,
    pub left: Vec<f64>,
    pub right: Vec<f64>,
}

impl AlignedCloses {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn left_returns(&self) -> Vec<f64> {
        daily_returns(&self.left)
    }

    pub fn right_returns(&self) -> Vec<f64> {
        daily_returns(&self.right)
    }
}

/// Joins `left` and `right` on `dates`, dropping any date missing from either.
pub fn aligned_closes(left: &PriceSeries, right: &PriceSeries, dates: &[NaiveDate]) -> AlignedCloses {
    let mut aligned = AlignedCloses::default();
    for &date in dates {
        if let (Some(l), Some(r)) = (left.close_on(date), right.close_on(date)) {
            aligned.dates.push(date);
            aligned.left.push(l);
            aligned.right.push(r);
        }
    }
    aligned
}
