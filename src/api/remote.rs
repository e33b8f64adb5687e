//! Implements the `Gateway` trait against the deployed Apps Script web app.

use crate::api::{Gateway, SyncAction};
use crate::model::RemoteSnapshot;
use crate::Result;
use anyhow::Context;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::trace;

/// Every request carries a bounded timeout so the single actor is never
/// blocked indefinitely on the network.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Talks to the Apps Script web app over HTTP.
pub(super) struct ScriptGateway {
    url: String,
    client: reqwest::Client,
}

impl ScriptGateway {
    pub(super) fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Unable to build the HTTP client")?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl Gateway for ScriptGateway {
    async fn fetch(&self) -> Result<RemoteSnapshot> {
        trace!("fetch from {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Failed to reach the remote store")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Remote store returned status {status}");
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse the remote snapshot body")?;
        Ok(RemoteSnapshot::from_value(body))
    }

    async fn push(&self, action: SyncAction, data: Value) -> Result<()> {
        trace!("push {action}");
        // The Apps Script endpoint is called fire-and-forget (the original UI
        // used a no-cors POST whose response is opaque). The status code and
        // body are deliberately not inspected; only failing to send at all is
        // an error.
        let _ = self
            .client
            .post(&self.url)
            .json(&json!({ "action": action, "data": data }))
            .send()
            .await
            .with_context(|| format!("Failed to send {action} to the remote store"))?;
        Ok(())
    }
}
