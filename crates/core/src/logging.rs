use std::{fmt, sync::Arc};

use crate::dispatch::DispatchOutcome;

pub const LOG_PREFIX: &str = "METRICS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Error,
}

/// One line on the diagnostic side channel.
///
/// Terminal lines carry the outcome of the attempt; every dispatch produces
/// exactly one of them.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub level: LogLevel,
    pub message: String,
    pub outcome: Option<DispatchOutcome>,
}

impl LogLine {
    pub fn debug(message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Debug,
            message: message.into(),
            outcome: None,
        }
    }

    pub fn terminal(message: impl Into<String>, outcome: DispatchOutcome) -> Self {
        let level = if outcome.is_success() {
            LogLevel::Info
        } else {
            LogLevel::Error
        };
        Self {
            level,
            message: message.into(),
            outcome: Some(outcome),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", LOG_PREFIX, self.message)
    }
}

/// Receives every diagnostic line a dispatcher produces.
pub trait LogSink: Send + Sync {
    fn log(&self, line: &LogLine);
}

impl<F> LogSink for F
where
    F: Fn(&LogLine) + Send + Sync,
{
    fn log(&self, line: &LogLine) {
        self(line)
    }
}

/// Writes each line to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn log(&self, line: &LogLine) {
        println!("{}", line);
    }
}

/// Forwards each line to `tracing` under the `cd_metrics` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, line: &LogLine) {
        let category = line
            .outcome
            .as_ref()
            .and_then(|o| o.error())
            .map(|e| e.category());
        let status = line.outcome.as_ref().and_then(|o| o.status());

        match line.level {
            LogLevel::Debug => tracing::debug!(target: "cd_metrics", "{}", line.message),
            LogLevel::Info => {
                tracing::info!(target: "cd_metrics", ?status, "{}", line.message)
            }
            LogLevel::Error => {
                tracing::error!(target: "cd_metrics", ?category, ?status, "{}", line.message)
            }
        }
    }
}

pub(crate) fn default_sink() -> Arc<dyn LogSink> {
    Arc::new(StdoutSink)
}
