use std::{thread, time::Duration};

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use tokio::sync::oneshot;

use crate::{
    error::{DispatchError, Result},
    transport::{FORM_CONTENT_TYPE, LEGACY_TIMEOUT, Transport},
};

/// Blocking transport for callers without a Tokio runtime.
///
/// Each send runs on its own thread with a fixed timeout and reports back
/// through a completion channel, so the returned future can be polled by any
/// executor. A worker that dies before reporting counts as aborted.
#[derive(Clone, Debug)]
pub struct LegacyTransport {
    timeout: Duration,
}

impl LegacyTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for LegacyTransport {
    fn default() -> Self {
        Self::new(LEGACY_TIMEOUT)
    }
}

fn post_blocking(endpoint: &str, body: String, timeout: Duration) -> Result<u16> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|_| DispatchError::TransportUnavailable)?;

    let response = client
        .post(endpoint)
        .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
        .header(CONTENT_LENGTH, body.len())
        .body(body)
        .send()?;

    Ok(response.status().as_u16())
}

#[async_trait]
impl Transport for LegacyTransport {
    fn name(&self) -> &'static str {
        "legacy"
    }

    async fn send(&self, endpoint: &str, body: String) -> Result<u16> {
        let (done_tx, done_rx) = oneshot::channel();
        let endpoint = endpoint.to_string();
        let timeout = self.timeout;

        thread::Builder::new()
            .name("cd-metrics-send".to_string())
            .spawn(move || {
                let _ = done_tx.send(post_blocking(&endpoint, body, timeout));
            })
            .map_err(|_| DispatchError::TransportUnavailable)?;

        done_rx.await.unwrap_or(Err(DispatchError::Aborted))
    }
}
