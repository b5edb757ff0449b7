use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use nbu_rs::{NbuClient, NbuError};
use tracing::debug;

use crate::source::RateSource;
use crate::types::{PointRate, QUOTE_CURRENCY};

#[async_trait]
impl RateSource for NbuClient {
    async fn fetch_point_rate(&self, code: &str) -> Result<Option<PointRate>, NbuError> {
        let records = self.get_exchange_for(code).await?;
        let Some(rec) = records.into_iter().next() else {
            debug!(currency = %code, "no rate published");
            return Ok(None);
        };
        let date = rec.date();
        Ok(rec.rate.map(|rate| PointRate {
            base: rec.cc,
            currency: QUOTE_CURRENCY.to_string(),
            rate,
            date,
        }))
    }

    async fn fetch_day_rate(&self, code: &str, date: NaiveDate) -> Result<Option<f64>, NbuError> {
        let records = self.get_exchange_on(code, date).await?;
        Ok(records.first().and_then(|r| r.rate))
    }

    async fn list_currency_codes(&self) -> Result<BTreeSet<String>, NbuError> {
        self.get_symbols().await
    }
}
