//! Sample statistics over plain `f64` slices.
//!
//! Standard deviation uses the sample (n - 1) denominator:
//! STDDEV(x) = sqrt(sum((x[i] - mean(x))^2) / (n - 1))

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Spread smaller than this fraction of the largest magnitude is rounding
/// noise from the mean, not variation in the data.
const RELATIVE_NOISE: f64 = 1e-10;

/// Returns 0 for fewer than two values or a constant series.
///
/// Two-pass with the compensating term `(sum(d)^2) / n` subtracted, so the
/// rounding error of the mean cancels.
pub fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let m = mean(values);
    let (sum_sq, comp) = values.iter().fold((0.0, 0.0), |(sq, c), v| {
        let diff = v - m;
        (sq + diff * diff, c + diff)
    });
    let variance = ((sum_sq - comp * comp / n) / (n - 1.0)).max(0.0);
    let stddev = variance.sqrt();

    let scale = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if stddev <= RELATIVE_NOISE * scale {
        0.0
    } else {
        stddev
    }
}

/// Pearson correlation of two equal-length series.
///
/// `None` when the lengths differ, there are fewer than two pairs, or either
/// side is constant.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    if sample_stddev(xs) == 0.0 || sample_stddev(ys) == 0.0 {
        return None;
    }

    let mx = mean(xs);
    let my = mean(ys);

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let r = cov / (var_x.sqrt() * var_y.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}
