//! Quality gate for a fetched window of daily rates.
//!
//! Checks run in this order: absent/short series, longest run of missing
//! days (scanned oldest to newest), overall missing ratio. The first failing
//! check is reported.

use thiserror::Error;

use crate::types::Observation;

pub const DEFAULT_MIN_POINTS: usize = 5;
pub const DEFAULT_MAX_CONSECUTIVE_MISSING: usize = 2;
pub const DEFAULT_MAX_MISSING_RATIO: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub min_points: usize,
    pub max_consecutive_missing: usize,
    pub max_missing_ratio: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_points: DEFAULT_MIN_POINTS,
            max_consecutive_missing: DEFAULT_MAX_CONSECUTIVE_MISSING,
            max_missing_ratio: DEFAULT_MAX_MISSING_RATIO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationFailure {
    #[error("series is empty")]
    Empty,

    #[error("not enough points ({have} < {need})")]
    TooFewPoints { have: usize, need: usize },

    #[error("too many consecutive missing values ({run} > {max})")]
    TooManyConsecutiveMissing { run: usize, max: usize },

    #[error("too many missing values ({missing} of {total}, ratio above {max_ratio})")]
    TooManyMissing {
        missing: usize,
        total: usize,
        max_ratio: f64,
    },
}

/// Judge an ordered series. `Ok(())` means usable.
///
/// `series` holds one observation per requested day. The point count is
/// taken over usable (present, non-zero) values only, so absent days cannot
/// make up for a short series.
pub fn check(series: &[Observation], t: &Thresholds) -> Result<(), ValidationFailure> {
    if series.is_empty() {
        return Err(ValidationFailure::Empty);
    }

    let mut missing = 0usize;
    let mut run = 0usize;
    let mut longest_run = 0usize;
    for obs in series {
        if obs.is_missing() {
            missing += 1;
            run += 1;
            longest_run = longest_run.max(run);
        } else {
            run = 0;
        }
    }

    let usable = series.len() - missing;
    if usable < t.min_points {
        return Err(ValidationFailure::TooFewPoints {
            have: usable,
            need: t.min_points,
        });
    }

    if longest_run > t.max_consecutive_missing {
        return Err(ValidationFailure::TooManyConsecutiveMissing {
            run: longest_run,
            max: t.max_consecutive_missing,
        });
    }

    let ratio = missing as f64 / series.len() as f64;
    if ratio > t.max_missing_ratio {
        return Err(ValidationFailure::TooManyMissing {
            missing,
            total: series.len(),
            max_ratio: t.max_missing_ratio,
        });
    }

    Ok(())
}

pub fn validate(series: &[Observation], t: &Thresholds) -> bool {
    check(series, t).is_ok()
}
