//! cd-metrics core library
//!
//! Encodes application events in a Measurement Protocol style query format
//! and sends each one to a collection endpoint in a single POST. No batching,
//! no retries; outcomes are reported through an injected log sink.

pub mod dispatch;
pub mod encoder;
pub mod error;
pub mod format;
pub mod logging;
pub mod schedule;
pub mod transport;
pub mod types;

// Re-export commonly used items at crate root
pub use dispatch::{DEFAULT_PROPERTY_ID, DispatchOutcome, Metrics, MetricsBuilder};
pub use encoder::encode;
pub use error::{DispatchError, Result};
pub use format::{encode_component, format_timestamp};
pub use logging::{LogLevel, LogLine, LogSink, StdoutSink, TracingSink};
pub use transport::{
    DEFAULT_ENDPOINT, FetchTransport, HostTransport, LEGACY_TIMEOUT, LegacyTransport, Transport,
};
pub use types::{ClientContext, ClientOptions, EventRecord, EventValue, MeasurementKind};
