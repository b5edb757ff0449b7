use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Semaphore;

use nbu_rates::{Config, PointRate, RateSession, RateSource};
use nbu_rs::NbuError;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
}

pub fn days_ago(n: i64) -> NaiveDate {
    today() - chrono::Duration::days(n)
}

/// In-memory source. Day rates climb by 0.05 per day towards `today()`.
pub struct FakeSource {
    pub missing: HashSet<NaiveDate>,
    pub zero: HashSet<NaiveDate>,
    pub broken: bool,
    pub delay: Duration,
    /// When set, every call waits for a permit before answering.
    pub gate: Option<Arc<Semaphore>>,
    pub point_calls: AtomicUsize,
    pub day_calls: AtomicUsize,
}

impl Default for FakeSource {
    fn default() -> Self {
        Self {
            missing: HashSet::new(),
            zero: HashSet::new(),
            broken: false,
            delay: Duration::ZERO,
            gate: None,
            point_calls: AtomicUsize::new(0),
            day_calls: AtomicUsize::new(0),
        }
    }
}

impl FakeSource {
    pub fn point_calls(&self) -> usize {
        self.point_calls.load(Ordering::SeqCst)
    }

    pub fn day_calls(&self) -> usize {
        self.day_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.unwrap();
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn outage() -> NbuError {
        NbuError::Http { status: 503, body: "Service Unavailable".into() }
    }
}

#[async_trait]
impl RateSource for FakeSource {
    async fn fetch_point_rate(&self, code: &str) -> Result<Option<PointRate>, NbuError> {
        self.point_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.broken {
            return Err(Self::outage());
        }
        if code == "XXX" {
            return Ok(None);
        }
        Ok(Some(PointRate {
            base: code.to_string(),
            currency: "UAH".into(),
            rate: 41.2542,
            date: Some(today()),
        }))
    }

    async fn fetch_day_rate(&self, _code: &str, date: NaiveDate) -> Result<Option<f64>, NbuError> {
        self.day_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.broken {
            return Err(Self::outage());
        }
        if self.missing.contains(&date) {
            return Ok(None);
        }
        if self.zero.contains(&date) {
            return Ok(Some(0.0));
        }
        let back = (today() - date).num_days() as f64;
        Ok(Some(42.0 - back * 0.05))
    }

    async fn list_currency_codes(&self) -> Result<BTreeSet<String>, NbuError> {
        Ok(["EUR", "PLN", "USD"].into_iter().map(String::from).collect())
    }
}

pub fn session(source: Arc<FakeSource>) -> RateSession {
    session_with(Config::default(), source)
}

pub fn session_with(cfg: Config, source: Arc<FakeSource>) -> RateSession {
    RateSession::new(Arc::new(cfg), source).with_clock(today)
}
