use std::fmt;

use chrono::NaiveDate;

pub use nbu_rs::exchange::models::QUOTE_CURRENCY;

/// Trim and upper-case a currency code so "usd " and "USD" share a key.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// One day of a requested window, as the source answered it.
///
/// `rate` is `None` when the day was skipped (malformed reply, no rate,
/// transport failure). A zero rate is kept as `Some(0.0)`; the validator
/// counts both as missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub rate: Option<f64>,
}

impl Observation {
    pub fn new(date: NaiveDate, rate: Option<f64>) -> Self {
        Self { date, rate }
    }

    pub fn is_missing(&self) -> bool {
        match self.rate {
            None => true,
            Some(r) => r == 0.0,
        }
    }

    /// Value that may enter a series: present, finite and non-zero.
    pub fn usable_rate(&self) -> Option<f64> {
        self.rate.filter(|r| r.is_finite() && *r != 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatePoint {
    pub date: NaiveDate,
    pub rate: f64,
}

/// Daily rates sorted ascending by date, one point per date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateSeries {
    points: Vec<RatePoint>,
}

impl RateSeries {
    /// Sorts by date; for duplicate dates the later entry wins.
    pub fn new(mut points: Vec<RatePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        let mut out: Vec<RatePoint> = Vec::with_capacity(points.len());
        for p in points {
            match out.last_mut() {
                Some(last) if last.date == p.date => *last = p,
                _ => out.push(p),
            }
        }
        Self { points: out }
    }

    /// Keep only the usable observations.
    pub fn from_observations(observations: &[Observation]) -> Self {
        Self::new(
            observations
                .iter()
                .filter_map(|o| o.usable_rate().map(|rate| RatePoint { date: o.date, rate }))
                .collect(),
        )
    }

    pub fn points(&self) -> &[RatePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&RatePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&RatePoint> {
        self.points.last()
    }

    pub fn rates(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.rate).collect()
    }

    pub fn observations(&self) -> Vec<Observation> {
        self.points
            .iter()
            .map(|p| Observation::new(p.date, Some(p.rate)))
            .collect()
    }
}

/// Today's official rate of one currency against UAH.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRate {
    pub base: String,
    pub currency: String,
    pub rate: f64,
    pub date: Option<NaiveDate>,
}

impl fmt::Display for PointRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}: {:.2}", self.base, self.currency, self.rate)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesOutcome {
    pub series: RateSeries,
    /// Next-day extrapolation, when forecasting is on and the series allows it.
    pub forecast: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointKey(String);

impl PointKey {
    pub fn new(code: &str) -> Self {
        Self(normalize_code(code))
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey {
    currency: String,
    window_days: u32,
}

impl SeriesKey {
    pub fn new(code: &str, window_days: u32) -> Self {
        Self { currency: normalize_code(code), window_days }
    }

    pub fn code(&self) -> &str {
        &self.currency
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}d", self.currency, self.window_days)
    }
}

/// Identity of one logical unit of work, across both namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestKey {
    Point(PointKey),
    Series(SeriesKey),
}

impl From<PointKey> for RequestKey {
    fn from(k: PointKey) -> Self {
        RequestKey::Point(k)
    }
}

impl From<SeriesKey> for RequestKey {
    fn from(k: SeriesKey) -> Self {
        RequestKey::Series(k)
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKey::Point(k) => write!(f, "rate:{}", k),
            RequestKey::Series(k) => write!(f, "series:{}", k),
        }
    }
}
