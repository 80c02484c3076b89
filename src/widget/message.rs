//! Transcript messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Typed by the person using the widget.
    User,
    /// Produced by the chat endpoint (or the apology on failure).
    Ai,
}

impl Sender {
    /// Wire/CSS name of the sender (`user` or `ai`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Ai => "ai",
        }
    }
}

/// A single rendered chat message.
///
/// Messages are append-only: once in the transcript they are never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message body (plain text, escaped at render time).
    pub text: String,
    /// Who produced the message.
    pub sender: Sender,
    /// When the message entered the transcript.
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// Create a user message stamped with the current time.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    /// Create an assistant message stamped with the current time.
    #[must_use]
    pub fn ai(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Ai)
    }

    fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            text: text.into(),
            sender,
            sent_at: Utc::now(),
        }
    }
}
