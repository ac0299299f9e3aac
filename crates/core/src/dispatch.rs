use std::{sync::Arc, time::Duration};

use chrono::Utc;

use crate::{
    encoder::encode,
    error::DispatchError,
    logging::{LogLine, LogSink, default_sink},
    schedule::{DEFAULT_ASYNC_DELAY, defer},
    transport::{DEFAULT_ENDPOINT, HostTransport, Transport},
    types::{ClientContext, ClientOptions, EventRecord, EventValue},
};

pub const DEFAULT_PROPERTY_ID: &str = "UA-77033033-1";

/// Terminal state of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Succeeded { status: u16 },
    Failed(DispatchError),
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Succeeded { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            DispatchOutcome::Succeeded { status } => Some(*status),
            DispatchOutcome::Failed(err) => err.status(),
        }
    }

    pub fn error(&self) -> Option<&DispatchError> {
        match self {
            DispatchOutcome::Succeeded { .. } => None,
            DispatchOutcome::Failed(err) => Some(err),
        }
    }

    fn from_status(status: u16) -> Self {
        if (200..300).contains(&status) {
            DispatchOutcome::Succeeded { status }
        } else {
            DispatchOutcome::Failed(DispatchError::Status(status))
        }
    }
}

/// Records events against a fixed client context.
///
/// Cloning is cheap; clones share the context, sink and transport.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    context: ClientContext,
    property_id: String,
    endpoint: String,
    transport: Arc<dyn Transport>,
    logger: Arc<dyn LogSink>,
    async_delay: Duration,
    stamp_events: bool,
}

impl Metrics {
    pub fn new(client_id: impl Into<String>, options: ClientOptions) -> Self {
        Self::builder(client_id).options(options).build()
    }

    pub fn builder(client_id: impl Into<String>) -> MetricsBuilder {
        MetricsBuilder::new(client_id)
    }

    pub fn context(&self) -> &ClientContext {
        &self.inner.context
    }

    pub fn property_id(&self) -> &str {
        &self.inner.property_id
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Record a discrete event and wait for the single send attempt.
    pub async fn record_event(
        &self,
        category: &str,
        action: &str,
        label: &str,
        value: i64,
        client_id: Option<&str>,
    ) -> DispatchOutcome {
        let record = EventRecord::new(category, action, label, EventValue::Discrete(value))
            .with_client_id(client_id.map(str::to_string));
        self.dispatch(record).await
    }

    /// Like [`Metrics::record_event`], but sent after a fixed delay. Returns immediately.
    pub fn record_event_async(
        &self,
        category: &str,
        action: &str,
        label: &str,
        value: i64,
        client_id: Option<&str>,
    ) {
        let record = EventRecord::new(category, action, label, EventValue::Discrete(value))
            .with_client_id(client_id.map(str::to_string));
        self.dispatch_later(record);
    }

    /// Record a measurement. `ev` is sent as 1, the value in a custom dimension.
    pub async fn record_floating_point_event(
        &self,
        category: &str,
        action: &str,
        label: &str,
        value: f64,
        client_id: Option<&str>,
    ) -> DispatchOutcome {
        let record = EventRecord::new(category, action, label, EventValue::Floating(value))
            .with_client_id(client_id.map(str::to_string));
        self.dispatch(record).await
    }

    pub fn record_floating_point_event_async(
        &self,
        category: &str,
        action: &str,
        label: &str,
        value: f64,
        client_id: Option<&str>,
    ) {
        let record = EventRecord::new(category, action, label, EventValue::Floating(value))
            .with_client_id(client_id.map(str::to_string));
        self.dispatch_later(record);
    }

    fn log(&self, line: LogLine) {
        self.inner.logger.log(&line);
    }

    async fn dispatch(&self, record: EventRecord) -> DispatchOutcome {
        let inner = &self.inner;
        let stamp = inner.stamp_events.then(Utc::now);
        let body = encode(&record, &inner.context, &inner.property_id, stamp);
        self.log(LogLine::debug(format!("event string: {}", body)));

        self.log(LogLine::debug(format!(
            "Sending request via {}...",
            inner.transport.name()
        )));
        let outcome = match inner.transport.send(&inner.endpoint, body).await {
            Ok(status) => DispatchOutcome::from_status(status),
            Err(err) => DispatchOutcome::Failed(err),
        };

        let message = match &outcome {
            DispatchOutcome::Succeeded { status } => format!(
                "event recorded: {}, {}, {}, {} (status {})",
                record.category, record.action, record.label, record.value, status
            ),
            DispatchOutcome::Failed(err) => {
                format!("error recording event: {}: {}", err.category(), err)
            }
        };
        self.log(LogLine::terminal(message, outcome.clone()));

        outcome
    }

    fn dispatch_later(&self, record: EventRecord) {
        let metrics = self.clone();
        let scheduled = defer(self.inner.async_delay, async move {
            metrics.dispatch(record).await;
        });

        if !scheduled {
            self.log(LogLine::terminal(
                "error recording event: could not schedule deferred send",
                DispatchOutcome::Failed(DispatchError::TransportUnavailable),
            ));
        }
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("context", &self.inner.context)
            .field("property_id", &self.inner.property_id)
            .field("endpoint", &self.inner.endpoint)
            .field("transport", &self.inner.transport.name())
            .finish()
    }
}

pub struct MetricsBuilder {
    client_id: String,
    options: ClientOptions,
    property_id: String,
    endpoint: String,
    transport: Option<Arc<dyn Transport>>,
    logger: Option<Arc<dyn LogSink>>,
    async_delay: Duration,
    stamp_events: bool,
}

impl MetricsBuilder {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            options: ClientOptions::default(),
            property_id: DEFAULT_PROPERTY_ID.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            transport: None,
            logger: None,
            async_delay: DEFAULT_ASYNC_DELAY,
            stamp_events: false,
        }
    }

    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    pub fn property_id(mut self, property_id: impl Into<String>) -> Self {
        self.property_id = property_id.into();
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn logger(mut self, logger: Arc<dyn LogSink>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn async_delay(mut self, delay: Duration) -> Self {
        self.async_delay = delay;
        self
    }

    /// Attach a UTC wall-clock stamp to every event.
    pub fn stamp_events(mut self, stamp: bool) -> Self {
        self.stamp_events = stamp;
        self
    }

    pub fn build(self) -> Metrics {
        Metrics {
            inner: Arc::new(MetricsInner {
                context: ClientContext::new(self.client_id, self.options),
                property_id: self.property_id,
                endpoint: self.endpoint,
                transport: self
                    .transport
                    .unwrap_or_else(|| Arc::new(HostTransport::detect())),
                logger: self.logger.unwrap_or_else(default_sink),
                async_delay: self.async_delay,
                stamp_events: self.stamp_events,
            }),
        }
    }
}
