use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use coach_chat_widget::backend::{BackendError, ChatBackend, ChatReply};
use coach_chat_widget::config::AppConfig;
use coach_chat_widget::server::router;
use coach_chat_widget::widget::APOLOGY_TEXT;
use coach_chat_widget::AppState;
use serde_json::Value;

/// Answers every message with a fixed reply, or fails when `reply` is `None`.
struct ScriptedBackend {
    reply: Option<ChatReply>,
    calls: AtomicUsize,
    last_message: Mutex<Option<String>>,
}

impl ScriptedBackend {
    fn replying(body: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(serde_json::from_str(body).unwrap()),
            calls: AtomicUsize::new(0),
            last_message: Mutex::new(None),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: AtomicUsize::new(0),
            last_message: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ChatBackend for ScriptedBackend {
    async fn ask(&self, message: &str) -> Result<ChatReply, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_message.lock().unwrap() = Some(message.to_string());
        self.reply
            .clone()
            .ok_or(BackendError::Status { status: 502 })
    }
}

const PAIRING_REPLY: &str = r##"{"insight":"Try pairing.","recommendations":[{"title":"X","type":"EdTech Tool","link":"#"}]}"##;

fn setup(backend: Arc<ScriptedBackend>) -> (TestServer, AppState) {
    let state = AppState::new(Arc::new(AppConfig::default()), backend);
    let server = TestServer::new(router(state.clone())).unwrap();
    (server, state)
}

fn session_id_from_page(html: &str) -> String {
    let start = html.find(r#"data-session-id=""#).unwrap() + r#"data-session-id=""#.len();
    let end = start + html[start..].find('"').unwrap();
    html[start..end].to_string()
}

#[tokio::test]
async fn test_index_renders_fallback_gallery() {
    let backend = ScriptedBackend::replying(PAIRING_REPLY);
    let (server, state) = setup(backend.clone());

    let response = server.get("/").await;
    response.assert_status_ok();
    let html = response.text();

    assert_eq!(html.matches(r#"class="resource-card""#).count(), 3);
    assert!(html.contains("resource-type workshop"));
    assert!(html.contains("resource-type tool"));
    assert!(html.contains("resource-type strategy"));
    assert!(html.contains("Start Coaching"));

    let id = session_id_from_page(&html);
    assert!(state.widgets.get(&id).is_some());
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_send_then_reply() {
    let backend = ScriptedBackend::replying(PAIRING_REPLY);
    let (server, state) = setup(backend.clone());
    let session = state.widgets.create();
    let id = session.id().to_string();

    let accepted = server
        .post(&format!("/widget/{id}/messages"))
        .form(&[("message", "  How do I get quiet students talking?  ")])
        .await;
    accepted.assert_status_ok();
    let html = accepted.text();
    assert!(html.contains("<p>How do I get quiet students talking?</p>"));
    assert_eq!(html.matches(r#"id="typing-indicator""#).count(), 1);
    assert!(session.lock().await.is_awaiting());
    assert_eq!(backend.calls(), 0);

    let reply = server.get(&format!("/widget/{id}/replies/1")).await;
    reply.assert_status_ok();
    let html = reply.text();
    assert!(html.starts_with(r#"<div class="message ai-message"><p>Try pairing.</p></div>"#));
    assert!(!html.contains("typing-indicator"));
    assert_eq!(html.matches(r#"class="resource-card""#).count(), 1);
    assert!(html.contains("resource-type tool"));

    assert_eq!(backend.calls(), 1);
    assert_eq!(
        backend.last_message.lock().unwrap().as_deref(),
        Some("How do I get quiet students talking?")
    );

    let widget = session.lock().await;
    assert!(!widget.is_awaiting());
    assert_eq!(widget.transcript().len(), 2);
    assert_eq!(widget.resources().len(), 1);
}

#[tokio::test]
async fn test_blank_message_is_ignored() {
    let backend = ScriptedBackend::replying(PAIRING_REPLY);
    let (server, state) = setup(backend.clone());
    let session = state.widgets.create();

    let response = server
        .post(&format!("/widget/{}/messages", session.id()))
        .form(&[("message", "   ")])
        .await;

    response.assert_status(StatusCode::NO_CONTENT);
    assert!(session.lock().await.transcript().is_empty());
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_send_while_awaiting_is_refused() {
    let backend = ScriptedBackend::replying(PAIRING_REPLY);
    let (server, state) = setup(backend);
    let session = state.widgets.create();
    let path = format!("/widget/{}/messages", session.id());

    server.post(&path).form(&[("message", "first")]).await.assert_status_ok();
    server
        .post(&path)
        .form(&[("message", "second")])
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert_eq!(session.lock().await.transcript().len(), 1);
}

#[tokio::test]
async fn test_reply_is_applied_once() {
    let backend = ScriptedBackend::replying(PAIRING_REPLY);
    let (server, state) = setup(backend.clone());
    let session = state.widgets.create();
    let id = session.id().to_string();

    server
        .post(&format!("/widget/{id}/messages"))
        .form(&[("message", "hello")])
        .await
        .assert_status_ok();
    server.get(&format!("/widget/{id}/replies/1")).await.assert_status_ok();

    let again = server.get(&format!("/widget/{id}/replies/1")).await;
    again.assert_status_ok();
    assert_eq!(again.text(), "");

    let unknown = server.get(&format!("/widget/{id}/replies/42")).await;
    assert_eq!(unknown.text(), "");

    assert_eq!(backend.calls(), 1);
    assert_eq!(session.lock().await.transcript().len(), 2);
}

#[tokio::test]
async fn test_failed_request_renders_apology() {
    let backend = ScriptedBackend::failing();
    let (server, state) = setup(backend);
    let session = state.widgets.create();
    let id = session.id().to_string();

    server
        .post(&format!("/widget/{id}/messages"))
        .form(&[("message", "hello")])
        .await
        .assert_status_ok();
    let reply = server.get(&format!("/widget/{id}/replies/1")).await;

    reply.assert_status_ok();
    let html = reply.text();
    assert!(html.contains(APOLOGY_TEXT));
    assert!(!html.contains("resource-card"));

    let widget = session.lock().await;
    assert_eq!(widget.transcript().last().unwrap().text, APOLOGY_TEXT);
    assert!(!widget.is_awaiting());
    assert_eq!(widget.resources().len(), 3);
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let (server, _state) = setup(ScriptedBackend::replying(PAIRING_REPLY));

    server
        .post("/widget/nope/messages")
        .form(&[("message", "hello")])
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/widget/nope/replies/1")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/api/widgets/nope")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_send_after_session_swept_recreates_widget() {
    let backend = ScriptedBackend::replying(PAIRING_REPLY);
    let (server, state) = setup(backend.clone());
    let page = server.get("/").await;
    let id = session_id_from_page(&page.text());

    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(state.widgets.cleanup_expired_with_timeout(Duration::ZERO), 1);
    assert!(state.widgets.get(&id).is_none());

    let accepted = server
        .post(&format!("/widget/{id}/messages"))
        .form(&[("message", "hello")])
        .await;
    accepted.assert_status_ok();
    let html = accepted.text();
    assert!(html.contains("<p>hello</p>"));
    assert_eq!(html.matches(r#"id="typing-indicator""#).count(), 1);

    let reply = server.get(&format!("/widget/{id}/replies/1")).await;
    reply.assert_status_ok();
    assert!(reply.text().contains("<p>Try pairing.</p>"));
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_json_api_round_trip() {
    let backend = ScriptedBackend::replying(PAIRING_REPLY);
    let (server, state) = setup(backend);
    let id = state.widgets.create().id().to_string();

    let initial: Value = server.get(&format!("/api/widgets/{id}")).await.json();
    assert_eq!(initial["resources"].as_array().unwrap().len(), 3);
    assert_eq!(initial["phase"]["state"], "idle");

    let response = server
        .post(&format!("/api/widgets/{id}/messages"))
        .json(&serde_json::json!({"message": "pairing?"}))
        .await;
    response.assert_status_ok();
    let snapshot: Value = response.json();

    assert_eq!(snapshot["transcript"][0]["sender"], "user");
    assert_eq!(snapshot["transcript"][1]["sender"], "ai");
    assert_eq!(snapshot["transcript"][1]["text"], "Try pairing.");
    assert_eq!(snapshot["resources"].as_array().unwrap().len(), 1);
    assert_eq!(snapshot["resources"][0]["bucket"], "tool");
    assert_eq!(snapshot["phase"]["state"], "idle");
}

#[tokio::test]
async fn test_json_api_rejects_blank_message() {
    let (server, state) = setup(ScriptedBackend::replying(PAIRING_REPLY));
    let id = state.widgets.create().id().to_string();

    server
        .post(&format!("/api/widgets/{id}/messages"))
        .json(&serde_json::json!({"message": "  "}))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_json_api_busy_while_htmx_request_pending() {
    let (server, state) = setup(ScriptedBackend::replying(PAIRING_REPLY));
    let id = state.widgets.create().id().to_string();

    server
        .post(&format!("/widget/{id}/messages"))
        .form(&[("message", "first")])
        .await
        .assert_status_ok();

    server
        .post(&format!("/api/widgets/{id}/messages"))
        .json(&serde_json::json!({"message": "second"}))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_health() {
    let (server, _state) = setup(ScriptedBackend::replying(PAIRING_REPLY));

    let body: Value = server.get("/health").await.json();
    assert_eq!(body["status"], "healthy");
}
