use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

use crate::engine::validate::Thresholds;
use crate::engine::forecast::DEFAULT_DEGREE;

/// Runtime tuning for the rate client.
///
/// Defaults match the public NBU service; every field can be overridden from
/// the environment (see [`Config::from_env`]).
#[derive(Debug, Clone)]
pub struct Config {
    // Override of the statdirectory root. `None` uses the public endpoint.
    pub base_url: Option<String>,

    // Limits checked after the remote calls return, not enforced mid-flight.
    pub rate_timeout_ms: u64,
    pub series_timeout_ms: u64,

    // History windows offered to the user, in days ending today.
    pub default_window_days: u32,
    pub window_choices: Vec<u32>,

    // Series acceptance rules.
    pub thresholds: Thresholds,

    // Next-day extrapolation.
    pub forecast: bool,
    pub forecast_degree: usize,

    // Per-day requests in flight during a history fetch. 1 = sequential.
    pub fetch_concurrency: usize,

    // Window for the optional moving-average overlay.
    pub sma_window: usize,

    // JSON settings blob (theme, chart prefs).
    pub settings_path: PathBuf,

    // Append logs here instead of stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,

            rate_timeout_ms: 10_000,
            series_timeout_ms: 30_000,

            default_window_days: 30,
            window_choices: vec![30, 90, 365],

            thresholds: Thresholds::default(),

            forecast: true,
            forecast_degree: DEFAULT_DEGREE,

            fetch_concurrency: 1,

            sma_window: 5,

            settings_path: PathBuf::from("cfgs/config.json"),

            log_file: None,
        }
    }
}

impl Config {
    /// Defaults overlaid with `NBU_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup.
    pub fn from_lookup<L>(lookup: L) -> anyhow::Result<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("NBU_BASE_URL") {
            cfg.base_url = Some(url.trim().to_string());
        }
        if let Some(v) = get("NBU_RATE_TIMEOUT_MS") {
            cfg.rate_timeout_ms = parse_num("NBU_RATE_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = get("NBU_SERIES_TIMEOUT_MS") {
            cfg.series_timeout_ms = parse_num("NBU_SERIES_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = get("NBU_FETCH_CONCURRENCY") {
            let n: usize = parse_num("NBU_FETCH_CONCURRENCY", &v)?;
            anyhow::ensure!(n >= 1, "NBU_FETCH_CONCURRENCY must be at least 1");
            cfg.fetch_concurrency = n;
        }
        if let Some(v) = get("NBU_FORECAST_DEGREE") {
            cfg.forecast_degree = parse_num("NBU_FORECAST_DEGREE", &v)?;
        }
        if let Some(v) = get("NBU_FORECAST") {
            cfg.forecast = !matches!(v.trim(), "0" | "false" | "off" | "no");
        }
        if let Some(v) = get("NBU_SETTINGS_PATH") {
            cfg.settings_path = PathBuf::from(v.trim());
        }
        if let Some(v) = get("NBU_LOG_FILE") {
            cfg.log_file = Some(PathBuf::from(v.trim()));
        }
        Ok(cfg)
    }

    pub fn rate_timeout(&self) -> Duration {
        Duration::from_millis(self.rate_timeout_ms)
    }

    pub fn series_timeout(&self) -> Duration {
        Duration::from_millis(self.series_timeout_ms)
    }

    /// Degree handed to the forecaster, or `None` when forecasting is off.
    pub fn forecast_degree(&self) -> Option<usize> {
        self.forecast.then_some(self.forecast_degree)
    }

    pub fn is_window_choice(&self, days: u32) -> bool {
        self.window_choices.contains(&days)
    }
}

fn parse_num<T>(name: &str, raw: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{name} must be a number, got {raw:?}"))
}
