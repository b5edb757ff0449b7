//! One-step-ahead extrapolation by least-squares polynomial fit.
//!
//! The independent variable is the day offset from the first observation.
//! Offsets are centred and scaled to [-1, 1] before building the Vandermonde
//! matrix, and the system is solved by Householder QR, so quadratic fits over
//! a year of data stay well conditioned.
//!
//! When the data cannot support the requested degree (fewer distinct offsets
//! than `degree + 1`, or a numerically rank-deficient design) the fit falls
//! back to the highest degree that can be solved.

use crate::types::{RatePoint, RateSeries};

pub const DEFAULT_DEGREE: usize = 2;

/// Relative size below which an R diagonal entry counts as zero.
const RANK_TOLERANCE: f64 = 1e-12;

/// Fitted polynomial in the scaled variable `t = (x - center) / scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyFit {
    /// Lowest power first.
    pub coefficients: Vec<f64>,
    pub center: f64,
    pub scale: f64,
}

impl PolyFit {
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    pub fn eval(&self, x: f64) -> f64 {
        let t = (x - self.center) / self.scale;
        // Horner
        self.coefficients.iter().rev().fold(0.0, |acc, c| acc * t + c)
    }
}

/// Predicted rate for the day after the last observation, rounded to 4 places.
///
/// `None` for fewer than two points or a non-finite result.
pub fn predict(series: &RateSeries, degree: usize) -> Option<f64> {
    predict_points(series.points(), degree)
}

/// Same as [`predict`] for a raw slice, which may be unsorted or hold
/// repeated dates. Offsets are taken from the first element.
pub fn predict_points(points: &[RatePoint], degree: usize) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let first = points[0].date;
    let xs: Vec<f64> = points
        .iter()
        .map(|p| (p.date - first).num_days() as f64)
        .collect();
    let ys: Vec<f64> = points.iter().map(|p| p.rate).collect();

    let fit = fit(&xs, &ys, degree)?;
    let next = xs[xs.len() - 1] + 1.0;
    let value = fit.eval(next);
    value.is_finite().then(|| round4(value))
}

/// Least-squares polynomial fit of at most `degree`.
pub fn fit(xs: &[f64], ys: &[f64], degree: usize) -> Option<PolyFit> {
    if xs.is_empty() || xs.len() != ys.len() {
        return None;
    }

    let mut distinct = xs.to_vec();
    distinct.sort_by(|a, b| a.total_cmp(b));
    distinct.dedup();
    let mut effective = degree.min(distinct.len() - 1);

    let center = xs.iter().sum::<f64>() / xs.len() as f64;
    let spread = xs.iter().map(|x| (x - center).abs()).fold(0.0, f64::max);
    let scale = if spread > 0.0 { spread } else { 1.0 };
    let ts: Vec<f64> = xs.iter().map(|x| (x - center) / scale).collect();

    loop {
        if let Some(coefficients) = solve_vandermonde(&ts, ys, effective + 1) {
            return Some(PolyFit { coefficients, center, scale });
        }
        if effective == 0 {
            return None;
        }
        effective -= 1;
    }
}

/// Solve `min ||A c - y||` with `A[i][j] = t_i^j`, `j < cols`.
/// Returns `None` when `A` is rank deficient.
fn solve_vandermonde(ts: &[f64], ys: &[f64], cols: usize) -> Option<Vec<f64>> {
    let rows = ts.len();
    if rows < cols {
        return None;
    }

    let mut a: Vec<Vec<f64>> = ts
        .iter()
        .map(|t| (0..cols).map(|j| t.powi(j as i32)).collect())
        .collect();
    let mut b = ys.to_vec();

    for k in 0..cols {
        let norm = (k..rows).map(|i| a[i][k] * a[i][k]).sum::<f64>().sqrt();
        if norm == 0.0 {
            return None;
        }
        let alpha = if a[k][k] > 0.0 { -norm } else { norm };

        let mut v: Vec<f64> = (k..rows).map(|i| a[i][k]).collect();
        v[0] -= alpha;
        let vv: f64 = v.iter().map(|x| x * x).sum();
        if vv == 0.0 {
            continue;
        }

        for j in k..cols {
            let s: f64 = (k..rows).map(|i| v[i - k] * a[i][j]).sum();
            let f = 2.0 * s / vv;
            for i in k..rows {
                a[i][j] -= f * v[i - k];
            }
        }
        let s: f64 = (k..rows).map(|i| v[i - k] * b[i]).sum();
        let f = 2.0 * s / vv;
        for i in k..rows {
            b[i] -= f * v[i - k];
        }
    }

    let r_max = (0..cols).map(|j| a[j][j].abs()).fold(0.0, f64::max);
    if r_max == 0.0 || (0..cols).any(|j| a[j][j].abs() <= r_max * RANK_TOLERANCE) {
        return None;
    }

    let mut c = vec![0.0; cols];
    for j in (0..cols).rev() {
        let tail: f64 = ((j + 1)..cols).map(|l| a[j][l] * c[l]).sum();
        c[j] = (b[j] - tail) / a[j][j];
    }
    Some(c)
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}
