use async_trait::async_trait;
use tokio::runtime::Handle;

use crate::{
    error::{DispatchError, Result},
    transport::{FetchTransport, LegacyTransport, Transport},
};

/// Picks a transport per call from what the calling environment offers.
///
/// The async client is used when the caller runs inside a Tokio runtime;
/// otherwise the threaded legacy transport. With neither, the send fails with
/// `TransportUnavailable`.
#[derive(Clone, Debug)]
pub struct HostTransport {
    fetch: Option<FetchTransport>,
    legacy: Option<LegacyTransport>,
}

impl HostTransport {
    pub fn new(fetch: Option<FetchTransport>, legacy: Option<LegacyTransport>) -> Self {
        Self { fetch, legacy }
    }

    /// Both transports, the legacy one with its default timeout.
    pub fn detect() -> Self {
        Self::new(FetchTransport::new().ok(), Some(LegacyTransport::default()))
    }

    pub fn select(&self) -> Option<&dyn Transport> {
        let in_runtime = Handle::try_current().is_ok();
        match (&self.fetch, &self.legacy) {
            (Some(fetch), _) if in_runtime => Some(fetch as &dyn Transport),
            (_, Some(legacy)) => Some(legacy as &dyn Transport),
            _ => None,
        }
    }
}

impl Default for HostTransport {
    fn default() -> Self {
        Self::detect()
    }
}

#[async_trait]
impl Transport for HostTransport {
    fn name(&self) -> &'static str {
        self.select().map(|t| t.name()).unwrap_or("none")
    }

    async fn send(&self, endpoint: &str, body: String) -> Result<u16> {
        match self.select() {
            Some(transport) => transport.send(endpoint, body).await,
            None => Err(DispatchError::TransportUnavailable),
        }
    }
}
