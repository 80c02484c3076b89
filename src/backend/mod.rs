//! Client side of the remote chat endpoint.
//!
//! The endpoint is an opaque collaborator; only its JSON contract matters:
//!
//! ```text
//! POST <chat_url>            {"message": "..."}
//! 200 OK                     {"insight": "...", "recommendations": [...]}
//! ```
//!
//! [`ChatBackend`] is the seam the widget talks to; [`HttpChatBackend`] is
//! the reqwest implementation used in production.

pub mod http;

pub use http::HttpChatBackend;

use serde::{Deserialize, Serialize};

use crate::widget::Resource;

/// Request body posted to the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Trimmed user message.
    pub message: String,
}

/// Success body returned by the chat endpoint.
///
/// Unknown fields (the endpoint also sends `status`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Assistant text appended to the transcript.
    pub insight: String,
    /// Replacement gallery; absent, `null` or empty leaves the gallery alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<Resource>>,
}

/// Ways a chat request can fail.
///
/// The widget collapses every variant into a single apology message; the
/// distinction only shows up in logs.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Connection, TLS, timeout or body read failure.
    #[error("chat request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("chat endpoint returned status {status}")]
    Status { status: u16 },

    /// The body was not a valid [`ChatReply`].
    #[error("malformed chat reply: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Something that can answer a chat message.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Post one message and return the parsed reply.
    async fn ask(&self, message: &str) -> Result<ChatReply, BackendError>;
}
