use std::time::Duration;

use thiserror::Error;

/// Failures talking to the analysis backend.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to backend failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("backend did not respond within {0:?}")]
    Timeout(Duration),

    #[error("backend returned status {status}{}", detail_suffix(.detail))]
    Status { status: u16, detail: Option<String> },

    #[error("could not decode backend response: {0}")]
    Decode(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {}", d))
        .unwrap_or_default()
}

/// Reasons a submission is refused before anything is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("message is empty")]
    Empty,

    #[error("a request is already in flight")]
    Busy,
}
