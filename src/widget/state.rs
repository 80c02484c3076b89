//! The widget state machine: `Idle -> AwaitingResponse -> Idle`.

use serde::Serialize;
use tracing::{error, info};

use super::message::Message;
use super::resource::{Resource, ResourceKind, fallback_resources};
use crate::backend::{BackendError, ChatBackend, ChatReply};

/// Appended in place of a reply whenever the chat request fails.
pub const APOLOGY_TEXT: &str = "Sorry, I encountered an error. Please try again later.";

/// Request phase. The typing indicator is visible exactly while awaiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    Idle,
    AwaitingResponse {
        /// Sequence number of the in-flight request.
        seq: u64,
    },
}

/// Ticket for the request started by [`ChatWidget::begin_send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    /// Sequence number to hand back to [`ChatWidget::complete`].
    pub seq: u64,
    /// Trimmed message to post to the chat endpoint.
    pub message: String,
}

/// Why a send was refused. Refused sends leave the widget untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendRejected {
    #[error("message is empty")]
    Empty,
    #[error("still waiting for the reply to request #{seq}")]
    Busy { seq: u64 },
}

/// Result of applying a backend outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// An AI message was appended; the gallery was replaced if the reply
    /// carried recommendations.
    Replied { resources_replaced: bool },
    /// The request failed and the apology was appended.
    Failed,
    /// The outcome belonged to a request that is no longer in flight.
    Stale,
}

#[derive(Debug)]
struct InFlight {
    seq: u64,
    message: String,
    dispatched: bool,
}

/// Transcript, gallery and request phase of one page session.
#[derive(Debug)]
pub struct ChatWidget {
    transcript: Vec<Message>,
    gallery: Vec<Resource>,
    in_flight: Option<InFlight>,
    next_seq: u64,
}

impl Default for ChatWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatWidget {
    /// Create a widget with an empty transcript and the fallback gallery.
    #[must_use]
    pub fn new() -> Self {
        Self {
            transcript: Vec::new(),
            gallery: fallback_resources(),
            in_flight: None,
            next_seq: 1,
        }
    }

    /// Messages in the order they were appended.
    #[must_use]
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Resources currently shown in the gallery.
    #[must_use]
    pub fn resources(&self) -> &[Resource] {
        &self.gallery
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        match &self.in_flight {
            Some(flight) => Phase::AwaitingResponse { seq: flight.seq },
            None => Phase::Idle,
        }
    }

    /// Whether the typing indicator is showing.
    #[must_use]
    pub fn is_awaiting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Append the user message and show the typing indicator.
    ///
    /// Whitespace-only input and sends made while a reply is pending are
    /// refused without touching the transcript.
    pub fn begin_send(&mut self, text: &str) -> Result<PendingSend, SendRejected> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SendRejected::Empty);
        }
        if let Some(flight) = &self.in_flight {
            return Err(SendRejected::Busy { seq: flight.seq });
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.transcript.push(Message::user(text));
        self.in_flight = Some(InFlight {
            seq,
            message: text.to_string(),
            dispatched: false,
        });

        Ok(PendingSend {
            seq,
            message: text.to_string(),
        })
    }

    /// Claim the in-flight request for sending.
    ///
    /// Returns `None` if `seq` is not the in-flight request or it was
    /// already claimed, so a request is posted at most once.
    pub fn dispatch(&mut self, seq: u64) -> Option<PendingSend> {
        let flight = self.in_flight.as_mut().filter(|f| f.seq == seq)?;
        if flight.dispatched {
            return None;
        }
        flight.dispatched = true;
        Some(PendingSend {
            seq,
            message: flight.message.clone(),
        })
    }

    /// Remove the typing indicator and apply the backend outcome.
    pub fn complete(&mut self, seq: u64, outcome: Result<ChatReply, BackendError>) -> Completion {
        if self.in_flight.as_ref().is_none_or(|f| f.seq != seq) {
            info!(name: "widget.reply.stale", seq, "Discarding reply for superseded request");
            return Completion::Stale;
        }
        self.in_flight = None;

        match outcome {
            Ok(reply) => {
                let ChatReply {
                    insight,
                    recommendations,
                } = reply;
                self.transcript.push(Message::ai(insight));

                let recommendations = recommendations.unwrap_or_default();
                let resources_replaced = !recommendations.is_empty();
                if resources_replaced {
                    self.render_resources(recommendations);
                }
                info!(
                    name: "widget.reply.applied",
                    seq,
                    resources_replaced,
                    "Reply applied"
                );
                Completion::Replied { resources_replaced }
            }
            Err(err) => {
                error!(name: "widget.reply.failed", seq, error = %err, "Chat request failed");
                self.transcript.push(Message::ai(APOLOGY_TEXT));
                Completion::Failed
            }
        }
    }

    /// Replace the gallery contents wholesale.
    pub fn render_resources(&mut self, resources: Vec<Resource>) {
        self.gallery = resources;
    }

    /// Run a full send: user message, request, reply (or apology).
    ///
    /// Holds `&mut self` across the request; callers sharing the widget
    /// should use [`Self::begin_send`] and [`Self::complete`] instead.
    pub async fn send<B>(&mut self, text: &str, backend: &B) -> Result<Completion, SendRejected>
    where
        B: ChatBackend + ?Sized,
    {
        let ticket = self.begin_send(text)?;
        let outcome = backend.ask(&ticket.message).await;
        Ok(self.complete(ticket.seq, outcome))
    }

    /// Serializable view of the widget for the JSON API.
    #[must_use]
    pub fn snapshot(&self) -> WidgetSnapshot {
        WidgetSnapshot {
            transcript: self.transcript.clone(),
            resources: self.gallery.iter().map(CardSnapshot::from).collect(),
            phase: self.phase(),
        }
    }
}

/// JSON projection of a [`ChatWidget`].
#[derive(Debug, Clone, Serialize)]
pub struct WidgetSnapshot {
    pub transcript: Vec<Message>,
    pub resources: Vec<CardSnapshot>,
    pub phase: Phase,
}

/// A gallery card as rendered: description resolved and bucket attached.
#[derive(Debug, Clone, Serialize)]
pub struct CardSnapshot {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub link: String,
    pub bucket: ResourceKind,
}

impl From<&Resource> for CardSnapshot {
    fn from(resource: &Resource) -> Self {
        Self {
            title: resource.title.clone(),
            kind: resource.kind.clone(),
            description: resource.description_or_default().to_string(),
            link: resource.link.clone(),
            bucket: resource.bucket(),
        }
    }
}
