//! Chat transcript fragments.

use std::time::Duration;

use super::escape;
use super::gallery::{gallery, scroll_gallery_script};
use crate::widget::{ChatWidget, Completion, Message};

/// Element id of the typing indicator; at most one exists per page.
pub const TYPING_INDICATOR_ID: &str = "typing-indicator";

/// A transcript message.
#[must_use]
pub fn message(msg: &Message) -> String {
    format!(
        r#"<div class="message {sender}-message"><p>{text}</p></div>"#,
        sender = msg.sender.as_str(),
        text = escape(&msg.text),
    )
}

/// Placeholder shown while a reply is pending.
///
/// It fetches its own replacement as soon as htmx loads it, so the reply
/// lands exactly where the indicator was.
#[must_use]
pub fn typing_indicator(session_id: &str, seq: u64) -> String {
    format!(
        r##"<div id="{TYPING_INDICATOR_ID}" class="typing-indicator" hx-get="/widget/{session}/replies/{seq}" hx-trigger="load" hx-swap="outerHTML scroll:#chat-messages:bottom"><div class="typing-dot"></div><div class="typing-dot"></div><div class="typing-dot"></div></div>"##,
        session = escape(session_id),
    )
}

/// The input form. Rendered disabled while a reply is pending.
#[must_use]
pub fn composer(session_id: &str, enabled: bool, oob: bool) -> String {
    let disabled = if enabled { "" } else { " disabled" };
    let swap = if oob { r#" hx-swap-oob="true""# } else { "" };
    format!(
        r##"<form id="composer" class="chat-input" hx-post="/widget/{session}/messages" hx-target="#chat-messages" hx-swap="beforeend scroll:bottom"{swap}><input type="text" id="user-input" name="message" placeholder="Ask about teaching strategies, tools, or workshops..." autocomplete="off" required{disabled}><button type="submit" id="send-message" class="send-button"{disabled}>Send</button></form>"##,
        session = escape(session_id),
    )
}

/// Response to an accepted send: the user message, the typing indicator,
/// and a fresh (cleared, disabled) composer swapped out-of-band.
#[must_use]
pub fn accepted_fragment(session_id: &str, user_message: &Message, seq: u64) -> String {
    let mut html = message(user_message);
    html.push_str(&typing_indicator(session_id, seq));
    html.push_str(&composer(session_id, false, true));
    html
}

/// Response that replaces the typing indicator once the reply is applied.
///
/// A stale completion renders nothing, which removes the stale indicator.
#[must_use]
pub fn reply_fragment(
    session_id: &str,
    widget: &ChatWidget,
    completion: Completion,
    scroll_delay: Duration,
) -> String {
    if completion == Completion::Stale {
        return String::new();
    }

    let mut html = widget.transcript().last().map(message).unwrap_or_default();
    html.push_str(&composer(session_id, !widget.is_awaiting(), true));
    if let Completion::Replied {
        resources_replaced: true,
    } = completion
    {
        html.push_str(&gallery(widget.resources(), true));
        html.push_str(&scroll_gallery_script(scroll_delay));
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, ChatReply};
    use crate::widget::APOLOGY_TEXT;

    const SESSION: &str = "3f2b";

    #[test]
    fn test_message_markup() {
        let html = message(&Message::user("a < b"));
        assert_eq!(
            html,
            r#"<div class="message user-message"><p>a &lt; b</p></div>"#
        );
        assert!(message(&Message::ai("hi")).contains("ai-message"));
    }

    #[test]
    fn test_accepted_fragment_has_single_indicator() {
        let mut widget = ChatWidget::new();
        let ticket = widget.begin_send("hello").unwrap();

        let html = accepted_fragment(SESSION, &widget.transcript()[0], ticket.seq);

        assert!(html.starts_with(r#"<div class="message user-message"><p>hello</p></div>"#));
        assert_eq!(html.matches(r#"id="typing-indicator""#).count(), 1);
        assert!(html.contains(&format!("/widget/{SESSION}/replies/{}", ticket.seq)));
        assert!(html.contains(r##"hx-swap="outerHTML scroll:#chat-messages:bottom""##));
        assert!(html.contains(r#"required disabled>"#));
        assert!(html.contains(r#"hx-swap-oob="true""#));
    }

    #[test]
    fn test_reply_fragment_with_resources() {
        let mut widget = ChatWidget::new();
        let ticket = widget.begin_send("pairing?").unwrap();
        let reply: ChatReply = serde_json::from_str(
            r##"{"insight":"Try pairing.","recommendations":[{"title":"X","type":"EdTech Tool","link":"#"}]}"##,
        )
        .unwrap();
        let completion = widget.complete(ticket.seq, Ok(reply));

        let html = reply_fragment(SESSION, &widget, completion, Duration::from_millis(500));

        assert!(html.starts_with(r#"<div class="message ai-message"><p>Try pairing.</p></div>"#));
        assert!(!html.contains(TYPING_INDICATOR_ID));
        assert_eq!(html.matches(r#"class="resource-card""#).count(), 1);
        assert!(html.contains("resource-type tool"));
        assert!(html.contains("setTimeout"));
        assert!(!html.contains("disabled"));
    }

    #[test]
    fn test_reply_fragment_after_failure() {
        let mut widget = ChatWidget::new();
        let ticket = widget.begin_send("hello").unwrap();
        let completion = widget.complete(ticket.seq, Err(BackendError::Status { status: 500 }));

        let html = reply_fragment(SESSION, &widget, completion, Duration::from_millis(500));

        assert!(html.contains(APOLOGY_TEXT));
        assert!(!html.contains("resource-card"));
        assert!(!html.contains("setTimeout"));
    }

    #[test]
    fn test_stale_reply_renders_nothing() {
        let widget = ChatWidget::new();
        assert_eq!(
            reply_fragment(SESSION, &widget, Completion::Stale, Duration::ZERO),
            ""
        );
    }
}
