// src/report.rs
use tracing::info;

use crate::types::{PointKey, PointRate, SeriesKey, SeriesOutcome};

fn span_days(outcome: &SeriesOutcome) -> Option<i64> {
    let first = outcome.series.first()?;
    let last = outcome.series.last()?;
    Some((last.date - first.date).num_days() + 1)
}

pub fn log_rate(key: &PointKey, rate: &PointRate) {
    info!(
        key = %key,
        base = %rate.base,
        quote = %rate.currency,
        rate = rate.rate,
        date = ?rate.date,
        "rate snapshot"
    );
}

pub fn log_series(key: &SeriesKey, outcome: &SeriesOutcome) {
    let rates = outcome.series.rates();
    let min = rates.iter().copied().reduce(f64::min);
    let max = rates.iter().copied().reduce(f64::max);
    let last = outcome.series.last().map(|p| p.rate);

    info!(
        key = %key,
        points = outcome.series.len(),
        span_days = ?span_days(outcome),
        min = ?min,
        max = ?max,
        last = ?last,
        forecast = ?outcome.forecast,
        "series snapshot"
    );
}
