use serde::{Deserialize, Serialize};

/// Descriptive fields attached to every event. Missing values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientOptions {
    pub locale: String,
    pub os: String,
    pub os_version: String,
    pub device: String,
    pub app_name: String,
    pub app_version: String,
    pub app_update_channel: String,
    pub app_build_id: String,
    pub app_platform: String,
    pub arch: String,
}

impl ClientOptions {
    /// Options with `os` and `arch` filled in from the compile target.
    pub fn from_host() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            ..Self::default()
        }
    }
}

/// Identity and metadata of the reporting client, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientContext {
    client_id: String,
    options: ClientOptions,
}

impl ClientContext {
    pub fn new(client_id: impl Into<String>, options: ClientOptions) -> Self {
        Self {
            client_id: client_id.into(),
            options,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementKind {
    Discrete,
    Floating,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventValue {
    Discrete(i64),
    Floating(f64),
}

impl EventValue {
    pub fn kind(&self) -> MeasurementKind {
        match self {
            EventValue::Discrete(_) => MeasurementKind::Discrete,
            EventValue::Floating(_) => MeasurementKind::Floating,
        }
    }
}

impl std::fmt::Display for EventValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventValue::Discrete(v) => write!(f, "{}", v),
            EventValue::Floating(v) => write!(f, "{}", v),
        }
    }
}

/// One event, consumed by a single encode + transmit cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub category: String,
    pub action: String,
    pub label: String,
    pub value: EventValue,
    /// Replaces the context's client id for this event only.
    pub client_id: Option<String>,
}

impl EventRecord {
    pub fn new(
        category: impl Into<String>,
        action: impl Into<String>,
        label: impl Into<String>,
        value: EventValue,
    ) -> Self {
        Self {
            category: category.into(),
            action: action.into(),
            label: label.into(),
            value,
            client_id: None,
        }
    }

    pub fn with_client_id(mut self, client_id: Option<impl Into<String>>) -> Self {
        self.client_id = client_id.map(Into::into);
        self
    }

    /// The override if one was given, otherwise the context's id.
    pub fn effective_client_id<'a>(&'a self, context: &'a ClientContext) -> &'a str {
        self.client_id.as_deref().unwrap_or(context.client_id())
    }
}
