//! The remote side of every request.
//!
//! [`RateSource`] is what the pipeline needs from the outside world. The NBU
//! client implements it in `exec::http`; tests plug in fakes.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use nbu_rs::NbuError;

use crate::types::PointRate;

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Today's rate of `code` against UAH. `Ok(None)` when nothing is published.
    async fn fetch_point_rate(&self, code: &str) -> Result<Option<PointRate>, NbuError>;

    /// Rate of `code` on `date`. `Ok(None)` for an empty reply or a row
    /// without a rate.
    async fn fetch_day_rate(&self, code: &str, date: NaiveDate) -> Result<Option<f64>, NbuError>;

    /// Every known code except UAH.
    async fn list_currency_codes(&self) -> Result<BTreeSet<String>, NbuError>;
}
