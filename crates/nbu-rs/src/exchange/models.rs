//! Exchange module models.
//!
//! This module contains data structures for the official rate directory.

use chrono::NaiveDate;
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::helpers;


/// The directory quotes everything against this currency.
pub const QUOTE_CURRENCY: &str = "UAH";


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Display)]
#[display("{} {} ({})", cc, rate.map(|r| r.to_string()).unwrap_or_else(|| "-".into()), exchangedate)]


/// One row of `/exchange?json`.
///
/// `rate` is optional because the directory occasionally publishes a row
/// for a date without a value.
pub struct ExchangeRecord {
    #[serde(default)]
    pub r030: u32,
    #[serde(default)]
    pub txt: String,
    #[serde(default)]
    pub rate: Option<f64>,
    pub cc: String,
    #[serde(default)]
    pub exchangedate: String,
}


impl ExchangeRecord {
    /// `exchangedate` parsed from its `dd.mm.yyyy` form.
    pub fn date(&self) -> Option<NaiveDate> {
        helpers::parse_response_date(&self.exchangedate)
    }
}


#[derive(Debug, Default, Serialize)]
pub struct ExchangeQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valcode: Option<String>,
    /// `yyyymmdd`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}


impl ExchangeQuery {
    pub fn for_currency(code: &str) -> Self {
        Self { valcode: Some(code.to_string()), date: None }
    }

    pub fn on_date(code: &str, date: NaiveDate) -> Self {
        Self {
            valcode: Some(code.to_string()),
            date: Some(helpers::format_query_date(date)),
        }
    }
}
