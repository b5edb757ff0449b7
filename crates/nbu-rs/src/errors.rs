use std::fmt;

#[derive(Debug)]
pub enum NbuError {
    RequestError(reqwest::Error),
    ParseError(serde_json::Error),
    /// Non-2xx response. `body` is truncated to keep log lines readable.
    Http { status: u16, body: String },
    Other(String),
}

impl fmt::Display for NbuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NbuError::RequestError(e) => write!(f, "Request error: {}", e),
            NbuError::ParseError(e) => write!(f, "Parse error: {}", e),
            NbuError::Http { status, body } => write!(f, "HTTP {}: {}", status, body),
            NbuError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for NbuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NbuError::RequestError(e) => Some(e),
            NbuError::ParseError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NbuError {
    fn from(err: reqwest::Error) -> Self {
        NbuError::RequestError(err)
    }
}

impl From<serde_json::Error> for NbuError {
    fn from(err: serde_json::Error) -> Self {
        NbuError::ParseError(err)
    }
}

impl From<String> for NbuError {
    fn from(s: String) -> NbuError {
        NbuError::Other(s)
    }
}
