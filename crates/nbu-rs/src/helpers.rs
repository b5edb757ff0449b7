use crate::errors::NbuError;
use chrono::NaiveDate;
use reqwest::Client;
/// Helper functions for HTTP requests and the directory's date formats
use url::Url;

/// Longest response body we keep in an error message
const MAX_ERROR_BODY: usize = 500;

/// Request date format, e.g. `20240301`
const QUERY_DATE_FORMAT: &str = "%Y%m%d";

/// Format of `exchangedate` in responses, e.g. `01.03.2024`
const RESPONSE_DATE_FORMAT: &str = "%d.%m.%Y";


/// Make a GET request against a public endpoint
pub(crate) async fn get(
    http_client: &Client,
    base_url: &str,
    path: &str,
) -> Result<String, NbuError> {
    let base = base_url.trim_end_matches('/');
    let url = format!("{}{}", base, path);
    let parsed = Url::parse(&url).map_err(|e| NbuError::Other(e.to_string()))?;
    let resp = http_client.get(parsed.as_str()).send().await?;
    let status = resp.status();
    let body: String = resp.text().await?;
    if !status.is_success() {
        let cut = truncate_at_char_boundary(&body, MAX_ERROR_BODY);
        return Err(NbuError::Http { status: status.as_u16(), body: cut.to_string() });
    }
    Ok(body)
}


fn truncate_at_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}


pub(crate) fn format_query_date(date: NaiveDate) -> String {
    date.format(QUERY_DATE_FORMAT).to_string()
}


pub(crate) fn parse_response_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), RESPONSE_DATE_FORMAT).ok()
}
