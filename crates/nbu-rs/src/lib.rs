//! NBU Rust client
//!
//! Thin client for the public exchange-rate directory of the National Bank of
//! Ukraine (`bank.gov.ua/NBUStatService`). All rates are quoted against UAH.
//!
//! # Quick Start
//!
//! ```no_run
//! use nbu_rs::NbuClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = NbuClient::new();
//!
//! // Today's official USD rate
//! let records = client.get_exchange_for("USD").await?;
//! if let Some(r) = records.first() {
//!     println!("{}", r);
//! }
//!
//! // Every currency the directory publishes, minus UAH itself
//! let symbols = client.get_symbols().await?;
//! println!("{} currencies", symbols.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Main Components
//!
//! - [`NbuClient`] - HTTP client with the endpoint methods
//! - [`NbuError`] - error type returned by every call
//!
//! # API Endpoint Modules
//!
//! - [`exchange`] - daily official rates, per currency and per date

// Core modules
pub mod client;         // Main HTTP client
pub mod errors;         // Error types
pub(crate) mod helpers; // Internal HTTP helpers

// API endpoint modules
pub mod exchange;       // Official exchange rates

// Re-exports for convenient access
pub use client::NbuClient;
pub use errors::NbuError;
