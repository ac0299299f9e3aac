//! Outbound transports.
//!
//! A transport performs exactly one POST of an encoded body and reports the
//! HTTP status it got back. Non-2xx statuses are returned as `Ok`; the
//! dispatcher decides what counts as success.

pub mod fetch;
pub mod host;
pub mod legacy;

use std::time::Duration;

use async_trait::async_trait;

pub use fetch::FetchTransport;
pub use host::HostTransport;
pub use legacy::LegacyTransport;

use crate::error::Result;

pub const DEFAULT_ENDPOINT: &str = "https://www.google-analytics.com/batch";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Upper bound on a legacy transport round trip.
pub const LEGACY_TIMEOUT: Duration = Duration::from_millis(3000);

#[async_trait]
pub trait Transport: Send + Sync {
    /// Short name for log lines.
    fn name(&self) -> &'static str;

    /// POST `body` to `endpoint` once. Returns the response status.
    async fn send(&self, endpoint: &str, body: String) -> Result<u16>;
}
