//! Page-session storage.
//!
//! Every page load gets its own [`ChatWidget`](crate::widget::ChatWidget),
//! kept in memory and addressed by a UUID embedded in the rendered page.
//!
//! # Architecture
//!
//! - [`WidgetSession`]: one widget plus its activity timestamps
//! - [`WidgetStore`]: thread-safe map of all live sessions
//!
//! # Example
//!
//! ```rust
//! use coach_chat_widget::session::WidgetStore;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = WidgetStore::new();
//! let session = store.create();
//! session.lock().await.begin_send("Hello!").unwrap();
//!
//! let same = store.get(session.id()).unwrap();
//! assert_eq!(same.lock().await.transcript().len(), 1);
//! # }
//! ```

mod store;

pub use store::{WidgetSession, WidgetStore};
