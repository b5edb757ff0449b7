//! The two units of work the runner executes.
//!
//! Both measure elapsed time once, after the remote calls return. A slow
//! call is never interrupted; its result is thrown away instead.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures_util::stream::{self, StreamExt};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::engine::{forecast, validate};
use crate::error::TaskError;
use crate::report;
use crate::source::RateSource;
use crate::types::{Observation, PointKey, PointRate, RateSeries, SeriesKey, SeriesOutcome};

/// Knobs for one series request.
#[derive(Debug, Clone, Copy)]
pub struct SeriesPlan {
    pub thresholds: validate::Thresholds,
    /// `None` disables forecasting.
    pub forecast_degree: Option<usize>,
    pub timeout: Duration,
    /// Per-day requests in flight at once. 1 keeps the fetch sequential.
    pub concurrency: usize,
}

/// The `window_days` calendar days ending at `today`, oldest first.
pub fn window_dates(today: NaiveDate, window_days: u32) -> Vec<NaiveDate> {
    (0..window_days as i64)
        .rev()
        .map(|back| today - chrono::Duration::days(back))
        .collect()
}

pub async fn point_rate(
    source: Arc<dyn RateSource>,
    key: PointKey,
    timeout: Duration,
) -> Result<PointRate, TaskError> {
    let started = Instant::now();
    let fetched = source.fetch_point_rate(key.code()).await?;
    let Some(rate) = fetched else {
        return Err(TaskError::EmptyData(format!("no rate published for {}", key)));
    };

    let elapsed = started.elapsed();
    if elapsed > timeout {
        return Err(TaskError::Timeout { what: "rate", elapsed, limit: timeout });
    }

    report::log_rate(&key, &rate);
    Ok(rate)
}

pub async fn rate_series(
    source: Arc<dyn RateSource>,
    key: SeriesKey,
    today: NaiveDate,
    plan: SeriesPlan,
) -> Result<SeriesOutcome, TaskError> {
    let started = Instant::now();
    let code = key.code().to_string();
    let days = window_dates(today, key.window_days());

    let replies: Vec<_> = stream::iter(days)
        .map(|date| {
            let source = source.clone();
            let code = code.clone();
            async move { (date, source.fetch_day_rate(&code, date).await) }
        })
        .buffered(plan.concurrency.max(1))
        .collect()
        .await;

    let elapsed = started.elapsed();
    if elapsed > plan.timeout {
        return Err(TaskError::Timeout { what: "series", elapsed, limit: plan.timeout });
    }

    let mut observations = Vec::with_capacity(replies.len());
    let mut transport_failures = 0usize;
    let mut last_error = None;
    for (date, reply) in replies {
        let rate = match reply {
            Ok(Some(rate)) if rate.is_finite() => Some(rate),
            Ok(Some(rate)) => {
                warn!(currency = %code, %date, rate, "non-finite rate, skipping day");
                None
            }
            Ok(None) => {
                warn!(currency = %code, %date, "no rate for day, skipping");
                None
            }
            Err(e) => {
                warn!(currency = %code, %date, "day request failed, skipping: {e}");
                transport_failures += 1;
                last_error = Some(e.to_string());
                None
            }
        };
        observations.push(Observation::new(date, rate));
    }

    let series = RateSeries::from_observations(&observations);
    if series.is_empty() {
        if !observations.is_empty() && transport_failures == observations.len() {
            let cause = last_error.unwrap_or_default();
            return Err(TaskError::Transport(format!("every day failed for {}: {}", key, cause)));
        }
        return Err(TaskError::EmptyData(format!("{}", key)));
    }

    if let Err(failure) = validate::check(&observations, &plan.thresholds) {
        warn!(key = %key, usable = series.len(), requested = observations.len(), "series rejected: {failure}");
        return Err(TaskError::Validation(failure));
    }

    let forecast = plan
        .forecast_degree
        .and_then(|degree| forecast::predict(&series, degree));
    if plan.forecast_degree.is_some() && forecast.is_none() {
        debug!(key = %key, "series too short to forecast");
    }

    let outcome = SeriesOutcome { series, forecast };
    report::log_series(&key, &outcome);
    Ok(outcome)
}
