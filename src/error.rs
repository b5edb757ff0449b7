//! Failure taxonomy for background requests and the settings blob.

use std::time::Duration;

use thiserror::Error;

use crate::engine::validate::ValidationFailure;
use crate::types::RequestKey;

/// Everything a request can end with instead of a value.
///
/// The rendered message is what the caller shows to the user.
#[derive(Debug, Clone, Error)]
pub enum TaskError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("no data for period: {0}")]
    EmptyData(String),

    #[error("insufficient data: {0}")]
    Validation(#[from] ValidationFailure),

    #[error("server response timed out ({what}): took {elapsed:?}, limit {limit:?}")]
    Timeout {
        what: &'static str,
        elapsed: Duration,
        limit: Duration,
    },

    #[error("request already in progress: {0}")]
    Duplicate(RequestKey),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    EmptyData,
    Validation,
    Timeout,
    Duplicate,
    Internal,
}

impl TaskError {
    pub fn kind(&self) -> FailureKind {
        match self {
            TaskError::Transport(_) => FailureKind::Transport,
            TaskError::EmptyData(_) => FailureKind::EmptyData,
            TaskError::Validation(_) => FailureKind::Validation,
            TaskError::Timeout { .. } => FailureKind::Timeout,
            TaskError::Duplicate(_) => FailureKind::Duplicate,
            TaskError::Internal(_) => FailureKind::Internal,
        }
    }

    /// Resubmitting the same key is the recovery for every terminal failure.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TaskError::Duplicate(_))
    }
}

impl From<nbu_rs::NbuError> for TaskError {
    fn from(e: nbu_rs::NbuError) -> Self {
        TaskError::Transport(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("settings file is not a JSON object")]
    NotAnObject,
}
