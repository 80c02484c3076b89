//! reqwest-backed chat endpoint client.

use std::time::Duration;

use tracing::debug;
use url::Url;

use super::{BackendError, ChatBackend, ChatReply, ChatRequest};
use crate::config::BackendConfig;

/// Posts messages to a fixed chat endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpChatBackend {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpChatBackend {
    /// Create a client for `endpoint`.
    ///
    /// Without a timeout a hung endpoint keeps the request pending until the
    /// connection itself gives up.
    pub fn new(endpoint: Url, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            endpoint,
        })
    }

    /// Create a client from the `backend` config section.
    pub fn from_config(config: &BackendConfig) -> anyhow::Result<Self> {
        let endpoint = config.endpoint()?;
        Ok(Self::new(endpoint, config.timeout())?)
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ChatBackend for HttpChatBackend {
    async fn ask(&self, message: &str) -> Result<ChatReply, BackendError> {
        debug!(endpoint = %self.endpoint, "Posting chat message");

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&ChatRequest {
                message: message.to_string(),
            })
            .send()
            .await
            .map_err(BackendError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(BackendError::Transport)?;
        Ok(serde_json::from_slice(&body)?)
    }
}
