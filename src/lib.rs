//! Official NBU exchange rates: fetch, cache, validate and forecast.
//!
//! A [`RateSession`] is the entry point. It checks the [`RequestCache`]
//! first and otherwise hands the request to the [`TaskRunner`], which runs
//! one background task per key and reports the outcome through exactly one
//! callback.

pub mod config;
pub mod engine;
pub mod error;
pub mod exec;
pub mod report;
pub mod settings;
pub mod source;
pub mod state;
pub mod types;

pub use config::Config;
pub use error::{FailureKind, SettingsError, TaskError};
pub use exec::task::{Dispatch, TaskHandle, TaskRunner, TaskState};
pub use settings::{ChartSettings, ChartType, SettingsStore};
pub use source::RateSource;
pub use state::RateSession;
pub use state::cache::RequestCache;
pub use types::{PointKey, PointRate, RateSeries, RequestKey, SeriesKey, SeriesOutcome};
