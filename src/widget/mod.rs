//! Chat widget state.
//!
//! The widget owns everything a page session shows: the transcript, the
//! resource gallery and the request phase. Nothing here touches HTML; the
//! [`crate::ui`] module projects a [`ChatWidget`] into markup.
//!
//! # Lifecycle
//!
//! A send is split in two so the view can render between the steps:
//!
//! 1. [`ChatWidget::begin_send`] appends the user message and enters
//!    [`Phase::AwaitingResponse`] (the typing indicator).
//! 2. [`ChatWidget::complete`] applies the backend outcome and returns to
//!    [`Phase::Idle`].
//!
//! # Example
//!
//! ```rust
//! use coach_chat_widget::backend::ChatReply;
//! use coach_chat_widget::widget::{ChatWidget, Completion, ResourceKind};
//!
//! let mut widget = ChatWidget::new();
//! let ticket = widget.begin_send("  How do I run a flipped classroom? ").unwrap();
//! assert_eq!(ticket.message, "How do I run a flipped classroom?");
//! assert!(widget.is_awaiting());
//!
//! let reply: ChatReply = serde_json::from_str(
//!     r##"{"insight":"Try pairing.","recommendations":[{"title":"X","type":"EdTech Tool","link":"#"}]}"##,
//! ).unwrap();
//! let completion = widget.complete(ticket.seq, Ok(reply));
//!
//! assert_eq!(completion, Completion::Replied { resources_replaced: true });
//! assert_eq!(widget.resources()[0].bucket(), ResourceKind::Tool);
//! assert!(!widget.is_awaiting());
//! ```

mod message;
mod resource;
mod state;

pub use message::{Message, Sender};
pub use resource::{DEFAULT_DESCRIPTION, Resource, ResourceKind, fallback_resources};
pub use state::{
    APOLOGY_TEXT, CardSnapshot, ChatWidget, Completion, PendingSend, Phase, SendRejected,
    WidgetSnapshot,
};
