use crate::errors::NbuError;
use crate::helpers;
use reqwest::Client;


// NBU statistics directory base URL
const NBU_API: &str = "https://bank.gov.ua/NBUStatService/v1/statdirectory";


/// Client for the NBU exchange-rate directory.
///
/// Every endpoint is public, so there is no account or signing step. The
/// client never retries and installs no request timeout of its own; callers
/// that need a deadline measure it themselves.
///
/// # Available Endpoints
///
/// - [`get_exchange`](NbuClient::get_exchange) - all rates for today
/// - [`get_exchange_for`](NbuClient::get_exchange_for) - one currency, today
/// - [`get_exchange_on`](NbuClient::get_exchange_on) - one currency, given date
/// - [`get_symbols`](NbuClient::get_symbols) - currency codes except UAH
/// - [`get_current_rates`](NbuClient::get_current_rates) - several codes at once
///
/// # Example
/// ```no_run
/// use nbu_rs::NbuClient;
/// use chrono::NaiveDate;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = NbuClient::new();
/// let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let records = client.get_exchange_on("EUR", day).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NbuClient {
    pub(crate) http_client: Client,
    pub(crate) base_url: String,
}


impl NbuClient {
    /// Create a new NbuClient with the default API endpoint
    pub fn new() -> NbuClient {
        NbuClient {
            http_client: Client::new(),
            base_url: NBU_API.to_string(),
        }
    }


    /// Create a new NbuClient with a custom API endpoint
    /// Useful for testing against a local mirror
    pub fn new_with_config(configuration: Option<String>) -> NbuClient {
        NbuClient {
            http_client: Client::new(),
            base_url: configuration.unwrap_or_else(|| NBU_API.to_string()),
        }
    }


    pub fn base_url(&self) -> &str {
        &self.base_url
    }


    /// Wrapper for GET requests; returns the raw body of a 2xx response
    pub async fn get(&self, path: &str) -> Result<String, NbuError> {
        helpers::get(&self.http_client, &self.base_url, path).await
    }
}


impl Default for NbuClient {
    fn default() -> Self {
        Self::new()
    }
}
