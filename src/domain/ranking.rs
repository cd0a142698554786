//! Correlation ranking of the asset pool around a trigger date.
//!
//! The window covers the `window + 1` benchmark closes ending on the trigger
//! date, giving `window` returns. Each candidate is joined to those dates by
//! calendar date, so a candidate missing any of them falls short of the
//! required observations and is skipped.

use crate::domain::price::{PriceSeries, PriceTable};
use crate::domain::returns::aligned_closes;
use crate::domain::skip::{SkipReason, SkippedCandidate};
use crate::domain::stats::pearson;
use chrono::NaiveDate;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationScore {
    pub ticker: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Ranking {
    /// Every scored candidate, most negative first.
    pub scores: Vec<CorrelationScore>,
    pub skipped: Vec<SkippedCandidate>,
}

impl Ranking {
    pub fn top(&self, n: usize) -> &[CorrelationScore] {
        &self.scores[..n.min(self.scores.len())]
    }
}

/// Stable ascending sort; equal values keep their incoming order.
pub fn sort_by_correlation(scores: &mut [CorrelationScore]) {
    scores.sort_by(|a, b| a.value.total_cmp(&b.value));
}

pub fn rank_assets(
    table: &PriceTable,
    benchmark: &PriceSeries,
    trigger_date: NaiveDate,
    asset_pool: &[String],
    window: usize,
) -> Ranking {
    let mut ranking = Ranking::default();

    let trigger_idx = match benchmark.index_of(trigger_date) {
        Some(i) if i >= window => i,
        _ => {
            debug!(date = %trigger_date, window, "benchmark history too short for correlation window");
            return ranking;
        }
    };

    let dates: Vec<NaiveDate> = benchmark.points()[trigger_idx - window..=trigger_idx]
        .iter()
        .map(|p| p.date)
        .collect();

    for ticker in asset_pool {
        let skip = |reason: SkipReason| {
            debug!(ticker = %ticker, date = %trigger_date, %reason, "candidate not ranked");
            SkippedCandidate {
                trigger_date,
                ticker: ticker.clone(),
                reason,
            }
        };

        let Some(asset) = table.get(ticker) else {
            ranking.skipped.push(skip(SkipReason::InsufficientHistory {
                observations: 0,
                required: window,
            }));
            continue;
        };

        let aligned = aligned_closes(benchmark, asset, &dates);
        let bench_returns = aligned.left_returns();
        let asset_returns = aligned.right_returns();

        if asset_returns.len() < window {
            ranking.skipped.push(skip(SkipReason::InsufficientHistory {
                observations: asset_returns.len(),
                required: window,
            }));
            continue;
        }

        match pearson(&asset_returns, &bench_returns) {
            Some(value) => ranking.scores.push(CorrelationScore {
                ticker: ticker.clone(),
                value,
            }),
            None => ranking.skipped.push(skip(SkipReason::DegenerateStatistics)),
        }
    }

    sort_by_correlation(&mut ranking.scores);
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::PricePoint;
    use approx::assert_abs_diff_eq;

    fn day(i: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64)
    }

    fn series(ticker: &str, closes: &[f64]) -> PriceSeries {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: day(i),
                ticker: ticker.to_string(),
                close,
            })
            .collect();
        PriceSeries::new(ticker.to_string(), points).unwrap()
    }

    fn zigzag(n: usize, amplitude: f64) -> Vec<f64> {
        let mut close = 100.0;
        let mut out = vec![close];
        for i in 0..n - 1 {
            let r = if i % 3 == 0 { amplitude } else { -amplitude / 2.0 };
            close *= 1.0 + r;
            out.push(close);
        }
        out
    }

    fn mirrored(closes: &[f64]) -> Vec<f64> {
        let mut out = vec![100.0];
        for w in closes.windows(2) {
            let r = w[1] / w[0] - 1.0;
            let last = *out.last().unwrap();
            out.push(last * (1.0 - r));
        }
        out
    }

    fn score(ticker: &str, value: f64) -> CorrelationScore {
        CorrelationScore {
            ticker: ticker.into(),
            value,
        }
    }

    #[test]
    fn picks_lowest_correlations_first() {
        let mut scores = vec![score("A", 0.9), score("B", -0.8), score("C", 0.1)];
        sort_by_correlation(&mut scores);
        let ranking = Ranking {
            scores,
            skipped: vec![],
        };

        let picked: Vec<&str> = ranking.top(2).iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(picked, vec!["B", "C"]);
    }

    #[test]
    fn ties_keep_pool_order() {
        let mut scores = vec![score("X", 0.2), score("Y", -0.5), score("Z", 0.2), score("W", -0.5)];
        sort_by_correlation(&mut scores);
        let order: Vec<&str> = scores.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(order, vec!["Y", "W", "X", "Z"]);
    }

    #[test]
    fn top_caps_at_available_scores() {
        let ranking = Ranking {
            scores: vec![score("A", 0.0)],
            skipped: vec![],
        };
        assert_eq!(ranking.top(3).len(), 1);
    }

    #[test]
    fn ranks_pool_against_benchmark_window() {
        let bench_closes = zigzag(40, 0.02);
        let bench = series("BM", &bench_closes);
        let table = PriceTable::from_points(
            [
                series("SAME", &bench_closes),
                series("INV", &mirrored(&bench_closes)),
            ]
            .iter()
            .flat_map(|s| s.points().to_vec())
            .collect(),
        )
        .unwrap();

        let pool = vec!["SAME".to_string(), "INV".to_string()];
        let ranking = rank_assets(&table, &bench, day(35), &pool, 30);

        assert!(ranking.skipped.is_empty());
        assert_eq!(ranking.scores.len(), 2);
        assert_eq!(ranking.scores[0].ticker, "INV");
        assert_abs_diff_eq!(ranking.scores[0].value, -1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ranking.scores[1].value, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn short_or_missing_or_flat_candidates_are_skipped() {
        let bench_closes = zigzag(40, 0.02);
        let bench = series("BM", &bench_closes);

        // SHORT starts 20 days in, FLAT never moves, GHOST has no data at all.
        let short_points: Vec<PricePoint> = series("SHORT", &bench_closes)
            .points()
            .iter()
            .skip(20)
            .cloned()
            .collect();
        let mut points = short_points;
        points.extend(series("FLAT", &[50.0; 40]).points().to_vec());
        let table = PriceTable::from_points(points).unwrap();

        let pool = vec!["SHORT".to_string(), "FLAT".to_string(), "GHOST".to_string()];
        let ranking = rank_assets(&table, &bench, day(35), &pool, 30);

        assert!(ranking.scores.is_empty());
        assert_eq!(ranking.skipped.len(), 3);
        assert!(matches!(
            ranking.skipped[0].reason,
            SkipReason::InsufficientHistory { observations: 15, required: 30 }
        ));
        assert_eq!(ranking.skipped[1].reason, SkipReason::DegenerateStatistics);
        assert!(matches!(
            ranking.skipped[2].reason,
            SkipReason::InsufficientHistory { observations: 0, .. }
        ));
    }

    #[test]
    fn steady_one_percent_candidate_is_degenerate() {
        let bench_closes = zigzag(40, 0.02);
        let bench = series("BM", &bench_closes);
        let steady: Vec<f64> = (0..40).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let table = PriceTable::from_points(
            [series("STEADY", &steady), series("INV", &mirrored(&bench_closes))]
                .iter()
                .flat_map(|s| s.points().to_vec())
                .collect(),
        )
        .unwrap();

        let pool = vec!["STEADY".to_string(), "INV".to_string()];
        let ranking = rank_assets(&table, &bench, day(35), &pool, 30);

        let ranked: Vec<&str> = ranking.scores.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(ranked, vec!["INV"]);
        assert_eq!(ranking.skipped.len(), 1);
        assert_eq!(ranking.skipped[0].ticker, "STEADY");
        assert_eq!(ranking.skipped[0].reason, SkipReason::DegenerateStatistics);
    }

    #[test]
    fn missing_window_date_excludes_candidate() {
        let bench_closes = zigzag(40, 0.02);
        let bench = series("BM", &bench_closes);
        let holey: Vec<PricePoint> = series("HOLE", &mirrored(&bench_closes))
            .points()
            .iter()
            .filter(|p| p.date != day(20))
            .cloned()
            .collect();
        let table = PriceTable::from_points(holey).unwrap();

        let ranking = rank_assets(&table, &bench, day(35), &["HOLE".to_string()], 30);

        assert!(ranking.scores.is_empty());
        assert!(matches!(
            ranking.skipped[0].reason,
            SkipReason::InsufficientHistory { observations: 29, .. }
        ));
    }

    #[test]
    fn trigger_too_early_ranks_nothing() {
        let bench_closes = zigzag(40, 0.02);
        let bench = series("BM", &bench_closes);
        let table = PriceTable::from_points(bench.points().to_vec()).unwrap();

        let ranking = rank_assets(&table, &bench, day(29), &["BM".to_string()], 30);
        assert!(ranking.scores.is_empty());
        assert!(ranking.skipped.is_empty());
    }
}
