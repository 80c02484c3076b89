//! Coach Chat Widget
//!
//! A server-rendered chat widget for an AI teaching coach: the visitor types
//! a question, the widget forwards it to a remote chat endpoint, shows the
//! reply and refreshes a gallery of recommended resources.
//!
//! # Architecture
//!
//! - **Server**: Axum routes serving the page and htmx fragments
//! - **Widget**: per-page state machine owning transcript and gallery
//! - **Backend**: JSON client for the remote chat endpoint
//! - **UI**: HTML projection of widget state
//!
//! # Modules
//!
//! - [`backend`]: chat endpoint contract and HTTP client
//! - [`config`]: layered configuration
//! - [`session`]: page-session storage
//! - [`ui`]: HTML rendering
//! - [`widget`]: widget state and transitions

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::unused_async)]

pub mod backend;
pub mod config;
pub mod server;
pub mod session;
pub mod ui;
pub mod widget;

use std::sync::Arc;

use backend::ChatBackend;
use config::AppConfig;
use session::WidgetStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Global configuration.
    pub config: Arc<AppConfig>,
    /// Live page sessions.
    pub widgets: WidgetStore,
    /// Chat endpoint client.
    pub backend: Arc<dyn ChatBackend>,
}

impl AppState {
    #[must_use]
    pub fn new(config: Arc<AppConfig>, backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            config,
            widgets: WidgetStore::new(),
            backend,
        }
    }
}
