//! Exchange module endpoints.
//!
//! This module implements the `/exchange` directory endpoints.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::client::NbuClient;
use crate::errors::NbuError;
use crate::exchange::models::{ExchangeQuery, ExchangeRecord, QUOTE_CURRENCY};


const GET_EXCHANGE: &str = "/exchange";


impl NbuClient {
    /// Get today's official rates for every published currency.
    ///
    /// **Endpoint:** `GET /exchange?json`
    pub async fn get_exchange(&self) -> Result<Vec<ExchangeRecord>, NbuError> {
        self.query_exchange(&ExchangeQuery::default()).await
    }


    /// Get today's official rate for one currency.
    ///
    /// **Endpoint:** `GET /exchange?valcode={code}&json`
    ///
    /// Unknown codes yield an empty list, not an error.
    pub async fn get_exchange_for(&self, code: &str) -> Result<Vec<ExchangeRecord>, NbuError> {
        self.query_exchange(&ExchangeQuery::for_currency(code)).await
    }


    /// Get the official rate for one currency on a given date.
    ///
    /// **Endpoint:** `GET /exchange?valcode={code}&date={yyyymmdd}&json`
    pub async fn get_exchange_on(
        &self,
        code: &str,
        date: NaiveDate,
    ) -> Result<Vec<ExchangeRecord>, NbuError> {
        self.query_exchange(&ExchangeQuery::on_date(code, date)).await
    }


    /// All currency codes the directory publishes today, excluding UAH.
    pub async fn get_symbols(&self) -> Result<BTreeSet<String>, NbuError> {
        let records = self.get_exchange().await?;
        Ok(symbols_from(&records))
    }


    /// Today's rates for the requested codes, fetched in a single call.
    ///
    /// Codes the directory does not know, or rows without a rate, are left out.
    pub async fn get_current_rates(
        &self,
        codes: &[&str],
    ) -> Result<BTreeMap<String, f64>, NbuError> {
        let records = self.get_exchange().await?;
        Ok(rates_for(&records, codes))
    }


    async fn query_exchange(&self, params: &ExchangeQuery) -> Result<Vec<ExchangeRecord>, NbuError> {
        let query = serde_urlencoded::to_string(params)
            .map_err(|e| NbuError::Other(
                format!("Failed to serialize params: {}", e),
            ))?;
        // The directory switches to JSON on a bare `json` flag.
        let url = if query.is_empty() {
            format!("{}?json", GET_EXCHANGE)
        } else {
            format!("{}?{}&json", GET_EXCHANGE, query)
        };
        let resp = self.get(&url).await?;
        parse_records(&resp)
    }
}


/// Parse an `/exchange` body. A blank body is treated as an empty list.
pub fn parse_records(body: &str) -> Result<Vec<ExchangeRecord>, NbuError> {
    if body.trim().is_empty() {
        return Ok(vec![]);
    }
    let data: Vec<ExchangeRecord> = serde_json::from_str(body)?;
    Ok(data)
}


pub fn symbols_from(records: &[ExchangeRecord]) -> BTreeSet<String> {
    records
        .iter()
        .filter(|r| r.cc != QUOTE_CURRENCY)
        .map(|r| r.cc.clone())
        .collect()
}


pub fn rates_for(records: &[ExchangeRecord], codes: &[&str]) -> BTreeMap<String, f64> {
    records
        .iter()
        .filter(|r| codes.contains(&r.cc.as_str()))
        .filter_map(|r| r.rate.map(|rate| (r.cc.clone(), rate)))
        .collect()
}
