use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};

use crate::{
    error::{DispatchError, Result},
    transport::{FORM_CONTENT_TYPE, Transport},
};

/// Async transport over a shared `reqwest::Client`. Needs a Tokio runtime.
#[derive(Clone, Debug)]
pub struct FetchTransport {
    client: reqwest::Client,
}

impl FetchTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|_| DispatchError::TransportUnavailable)?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for FetchTransport {
    fn name(&self) -> &'static str {
        "fetch"
    }

    async fn send(&self, endpoint: &str, body: String) -> Result<u16> {
        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(CONTENT_LENGTH, body.len())
            .body(body)
            .send()
            .await?;

        Ok(response.status().as_u16())
    }
}
