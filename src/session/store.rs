//! Widget sessions and their store.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::widget::ChatWidget;

/// A widget bound to one page load.
///
/// Cloning is cheap and yields a handle to the same widget.
#[derive(Debug, Clone)]
pub struct WidgetSession {
    inner: Arc<WidgetSessionInner>,
}

#[derive(Debug)]
struct WidgetSessionInner {
    id: String,
    widget: Mutex<ChatWidget>,
    last_activity: RwLock<DateTime<Utc>>,
}

impl WidgetSession {
    fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            inner: Arc::new(WidgetSessionInner {
                id,
                widget: Mutex::new(ChatWidget::new()),
                last_activity: RwLock::new(now),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Lock the widget. Counts as activity.
    ///
    /// Do not hold the guard across the chat request.
    pub async fn lock(&self) -> MutexGuard<'_, ChatWidget> {
        self.touch();
        self.inner.widget.lock().await
    }

    fn touch(&self) {
        let mut guard = self
            .inner
            .last_activity
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Utc::now();
    }

    fn is_busy(&self) -> bool {
        !self
            .inner
            .widget
            .try_lock()
            .is_ok_and(|widget| !widget.is_awaiting())
    }

    /// Whether the session has been idle for longer than `timeout`.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        let last = *self
            .inner
            .last_activity
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        // Negative means clock skew; treat as fresh.
        (Utc::now() - last)
            .to_std()
            .is_ok_and(|idle| idle > timeout)
    }
}

/// Thread-safe store of live widget sessions.
#[derive(Debug, Clone, Default)]
pub struct WidgetStore {
    inner: Arc<RwLock<HashMap<String, WidgetSession>>>,
}

impl WidgetStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with a fresh widget and a random id.
    #[must_use]
    pub fn create(&self) -> WidgetSession {
        let session = WidgetSession::new(Uuid::new_v4().to_string());
        self.write().insert(session.id().to_string(), session.clone());
        session
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<WidgetSession> {
        self.read().get(id).cloned()
    }

    /// Get a session, recreating it if it was swept while its page stayed open.
    ///
    /// Only UUIDs are accepted, so clients cannot mint arbitrary keys.
    /// The returned flag is `true` when a fresh widget had to be created.
    #[must_use]
    pub fn get_or_create(&self, id: &str) -> Option<(WidgetSession, bool)> {
        if let Some(session) = self.get(id) {
            return Some((session, false));
        }
        let id = Uuid::parse_str(id).ok()?.to_string();

        let mut guard = self.write();
        if let Some(session) = guard.get(&id) {
            return Some((session.clone(), false));
        }
        let session = WidgetSession::new(id.clone());
        guard.insert(id, session.clone());
        Some((session, true))
    }

    pub fn remove(&self, id: &str) -> Option<WidgetSession> {
        self.write().remove(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop sessions idle longer than `timeout`; returns how many went.
    ///
    /// Sessions that are locked or still awaiting a reply are kept.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = self.write();
        let before = guard.len();
        guard.retain(|_, session| !session.is_expired_with_timeout(timeout) || session.is_busy());
        before - guard.len()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, WidgetSession>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, WidgetSession>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
