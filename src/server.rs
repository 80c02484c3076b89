use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::AppState;
use crate::backend::{ChatBackend, HttpChatBackend};
use crate::config::AppConfig;
use crate::session::{WidgetSession, WidgetStore};
use crate::ui;
use crate::widget::{ChatWidget, Completion, PendingSend, SendRejected, WidgetSnapshot};

/// Chat messages are short; anything larger is not a chat message.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let backend = HttpChatBackend::from_config(&config.backend)?;
    info!(
        name: "backend.config.loaded",
        endpoint = %backend.endpoint(),
        timeout_secs = ?config.backend.timeout_secs,
        "Chat endpoint configured"
    );

    let state = AppState::new(Arc::clone(&config), Arc::new(backend));
    spawn_session_sweeper(state.widgets.clone(), &config);

    let app = router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config.assets.static_dir);

    Router::new()
        // HTML page and htmx fragments
        .route("/", get(index_handler))
        .route("/widget/{id}/messages", post(widget_send))
        .route("/widget/{id}/replies/{seq}", get(widget_reply))
        // JSON API
        .route("/api/widgets/{id}", get(api_get_widget))
        .route("/api/widgets/{id}/messages", post(api_send))
        .route("/health", get(health))
        // Static assets
        .nest_service("/static", static_dir)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Periodically drop page sessions nobody has touched for a while.
fn spawn_session_sweeper(widgets: WidgetStore, config: &AppConfig) {
    let ttl = config.widget.session_ttl();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(ttl.max(std::time::Duration::from_secs(1)));
        loop {
            ticker.tick().await;
            let removed = widgets.cleanup_expired_with_timeout(ttl);
            if removed > 0 {
                info!(
                    name: "widget.sessions.expired",
                    removed,
                    remaining = widgets.len(),
                    "Expired idle widget sessions"
                );
            }
        }
    });
}

fn find_session(state: &AppState, id: &str) -> Result<WidgetSession, StatusCode> {
    state.widgets.get(id).ok_or(StatusCode::NOT_FOUND)
}

/// Post the ticket's message and apply the outcome.
///
/// Runs on its own task so a dropped client connection cannot leave the
/// widget stuck awaiting a reply that will never be applied.
async fn run_request<T, F>(
    backend: Arc<dyn ChatBackend>,
    session: WidgetSession,
    ticket: PendingSend,
    project: F,
) -> Result<T, StatusCode>
where
    T: Send + 'static,
    F: FnOnce(&WidgetSession, &ChatWidget, Completion) -> T + Send + 'static,
{
    let task = tokio::spawn(async move {
        let outcome = backend.ask(&ticket.message).await;
        let mut widget = session.lock().await;
        let completion = widget.complete(ticket.seq, outcome);
        project(&session, &widget, completion)
    });

    task.await.map_err(|e| {
        error!(name: "widget.reply.panicked", error = %e, "Reply task failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - New page session with the fallback gallery.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    let session = state.widgets.create();
    info!(
        name: "widget.session.created",
        session_id = %session.id(),
        sessions = state.widgets.len(),
        "Widget session created"
    );

    let widget = session.lock().await;
    Html(ui::page(&widget, session.id(), &state.config.assets))
}

#[derive(Debug, Deserialize)]
struct MessageForm {
    #[serde(default)]
    message: String,
}

/// POST /widget/:id/messages - Append the user message and show the indicator.
///
/// Refused sends answer `204` so htmx leaves the page alone. A page whose
/// session was swept while it stayed open gets a fresh widget under the
/// same id.
async fn widget_send(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<MessageForm>,
) -> Result<Response, StatusCode> {
    let (session, created) = state
        .widgets
        .get_or_create(&id)
        .ok_or(StatusCode::NOT_FOUND)?;
    if created {
        info!(
            name: "widget.session.restored",
            session_id = %id,
            "Recreated widget for an open page"
        );
    }
    let mut widget = session.lock().await;

    match widget.begin_send(&form.message) {
        Ok(ticket) => {
            info!(
                name: "widget.send.accepted",
                session_id = %id,
                seq = ticket.seq,
                "Message accepted"
            );
            let html = widget
                .transcript()
                .last()
                .map(|msg| ui::accepted_fragment(session.id(), msg, ticket.seq))
                .unwrap_or_default();
            Ok(Html(html).into_response())
        }
        Err(rejected) => {
            debug!(session_id = %id, reason = %rejected, "Message refused");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}

/// GET /widget/:id/replies/:seq - Fetch the reply and replace the indicator.
async fn widget_reply(
    State(state): State<AppState>,
    Path((id, seq)): Path<(String, u64)>,
) -> Result<Html<String>, StatusCode> {
    let session = find_session(&state, &id)?;

    let Some(ticket) = session.lock().await.dispatch(seq) else {
        info!(
            name: "widget.reply.stale",
            session_id = %id,
            seq,
            "Reply requested for a request that is not pending"
        );
        return Ok(Html(String::new()));
    };

    let scroll_delay = state.config.widget.scroll_delay();
    let html = run_request(
        Arc::clone(&state.backend),
        session,
        ticket,
        move |session, widget, completion| {
            ui::reply_fragment(session.id(), widget, completion, scroll_delay)
        },
    )
    .await?;

    Ok(Html(html))
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for the JSON send API.
#[derive(Debug, Deserialize)]
struct SendRequest {
    message: String,
}

/// GET /api/widgets/:id - Current widget state.
async fn api_get_widget(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WidgetSnapshot>, StatusCode> {
    let session = find_session(&state, &id)?;
    let widget = session.lock().await;
    Ok(Json(widget.snapshot()))
}

/// POST /api/widgets/:id/messages - Full send; returns the resulting state.
async fn api_send(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SendRequest>,
) -> Result<Json<WidgetSnapshot>, (StatusCode, String)> {
    let session =
        find_session(&state, &id).map_err(|status| (status, "Unknown widget".to_string()))?;

    let ticket = {
        let mut widget = session.lock().await;
        widget.begin_send(&req.message).map_err(|rejected| {
            let status = match rejected {
                SendRejected::Empty => StatusCode::UNPROCESSABLE_ENTITY,
                SendRejected::Busy { .. } => StatusCode::CONFLICT,
            };
            (status, rejected.to_string())
        })?
    };
    info!(
        name: "widget.send.accepted",
        session_id = %id,
        seq = ticket.seq,
        "Message accepted"
    );

    let snapshot = run_request(
        Arc::clone(&state.backend),
        session,
        ticket,
        |_, widget, _| widget.snapshot(),
    )
    .await
    .map_err(|status| (status, "Reply task failed".to_string()))?;

    Ok(Json(snapshot))
}

/// GET /health - Liveness check.
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "message": "Coach chat widget is running"
    }))
}
