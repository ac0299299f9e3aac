use thiserror::Error;

/// Terminal failure of a single dispatch attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no transport is available in this environment")]
    TransportUnavailable,

    #[error("network error: {0}")]
    Network(String),

    #[error("request was aborted")]
    Aborted,

    #[error("request timed out")]
    TimedOut,

    #[error("server responded with status {0}")]
    Status(u16),
}

impl DispatchError {
    /// Short, stable name used in log lines.
    pub fn category(&self) -> &'static str {
        match self {
            DispatchError::TransportUnavailable => "transport-unavailable",
            DispatchError::Network(_) => "network-error",
            DispatchError::Aborted => "aborted",
            DispatchError::TimedOut => "timed-out",
            DispatchError::Status(_) => "http-status",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            DispatchError::Status(code) => Some(*code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DispatchError::TimedOut
        } else {
            DispatchError::Network(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
