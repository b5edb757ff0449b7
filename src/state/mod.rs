pub mod cache;

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::TaskError;
use crate::exec::task::{Dispatch, TaskRunner, TaskState};
use crate::exec::work::{self, SeriesPlan};
use crate::source::RateSource;
use crate::types::{PointKey, PointRate, RequestKey, SeriesKey, SeriesOutcome};

use cache::{CacheKey, RequestCache};

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// One user's view of the rate service: a source, a cache and a runner.
///
/// Cloning shares the cache and the in-flight registry.
#[derive(Clone)]
pub struct RateSession {
    cfg: Arc<Config>,
    source: Arc<dyn RateSource>,
    runner: TaskRunner,
    clock: fn() -> NaiveDate,
}

impl RateSession {
    pub fn new(cfg: Arc<Config>, source: Arc<dyn RateSource>) -> Self {
        Self {
            cfg,
            source,
            runner: TaskRunner::new(Arc::new(RequestCache::new())),
            clock: local_today,
        }
    }

    /// Replace the calendar used to anchor history windows.
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn cache(&self) -> &Arc<RequestCache> {
        self.runner.cache()
    }

    pub fn runner(&self) -> &TaskRunner {
        &self.runner
    }

    pub fn state_of(&self, key: impl Into<RequestKey>) -> TaskState {
        self.runner.state(&key.into())
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    /// Drop every cached rate and series. Running tasks are unaffected and
    /// will still write their result when they finish.
    pub fn clear(&self) {
        let dropped = self.cache().len();
        self.cache().clear();
        info!(dropped, "cache cleared");
    }

    /// Today's rate of `code` against UAH.
    pub fn request_rate<S, F>(
        &self,
        code: &str,
        on_success: S,
        on_failure: F,
    ) -> Result<Dispatch<PointRate>, TaskError>
    where
        S: FnOnce(PointRate) + Send + 'static,
        F: FnOnce(TaskError) + Send + 'static,
    {
        let key = PointKey::new(code);
        let source = self.source.clone();
        let timeout = self.cfg.rate_timeout();
        let unit_key = key.clone();
        self.runner.dispatch(
            key,
            move || work::point_rate(source, unit_key, timeout),
            on_success,
            on_failure,
        )
    }

    /// Daily history of `code` over `window_days` ending today, with the
    /// next-day forecast when enabled.
    pub fn request_series<S, F>(
        &self,
        code: &str,
        window_days: u32,
        on_success: S,
        on_failure: F,
    ) -> Result<Dispatch<SeriesOutcome>, TaskError>
    where
        S: FnOnce(SeriesOutcome) + Send + 'static,
        F: FnOnce(TaskError) + Send + 'static,
    {
        let key = SeriesKey::new(code, window_days);
        let source = self.source.clone();
        let today = self.today();
        let plan = SeriesPlan {
            thresholds: self.cfg.thresholds,
            forecast_degree: self.cfg.forecast_degree(),
            timeout: self.cfg.series_timeout(),
            concurrency: self.cfg.fetch_concurrency,
        };
        let unit_key = key.clone();
        debug!(key = %key, %today, "series requested");
        self.runner.dispatch(
            key,
            move || work::rate_series(source, unit_key, today, plan),
            on_success,
            on_failure,
        )
    }

    /// [`request_rate`](Self::request_rate), awaiting the terminal outcome.
    pub async fn rate(&self, code: &str) -> Result<PointRate, TaskError> {
        let (on_success, on_failure, done) = completion::<PointKey>();
        match self.request_rate(code, on_success, on_failure)? {
            Dispatch::Cached(v) => Ok(v),
            Dispatch::Started(_) => done.wait().await,
        }
    }

    /// [`request_series`](Self::request_series), awaiting the terminal outcome.
    pub async fn series(&self, code: &str, window_days: u32) -> Result<SeriesOutcome, TaskError> {
        let (on_success, on_failure, done) = completion::<SeriesKey>();
        match self.request_series(code, window_days, on_success, on_failure)? {
            Dispatch::Cached(v) => Ok(v),
            Dispatch::Started(_) => done.wait().await,
        }
    }

    /// Codes the source publishes, excluding UAH.
    pub async fn currency_codes(&self) -> Result<BTreeSet<String>, TaskError> {
        Ok(self.source.list_currency_codes().await?)
    }
}

struct Completion<V> {
    rx: mpsc::UnboundedReceiver<Result<V, TaskError>>,
}

impl<V> Completion<V> {
    async fn wait(mut self) -> Result<V, TaskError> {
        self.rx
            .recv()
            .await
            .unwrap_or_else(|| Err(TaskError::Internal("task ended without a result".into())))
    }
}

/// Callback pair that forwards whichever fires into one receiver.
fn completion<K: CacheKey>() -> (
    impl FnOnce(K::Value) + Send + 'static,
    impl FnOnce(TaskError) + Send + 'static,
    Completion<K::Value>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let fail_tx = tx.clone();
    (
        move |v: K::Value| {
            let _ = tx.send(Ok(v));
        },
        move |e: TaskError| {
            let _ = fail_tx.send(Err(e));
        },
        Completion { rx },
    )
}
