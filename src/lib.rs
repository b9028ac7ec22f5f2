//! Search book sets: named selections over the canonical list of Bible books
//! that decide which books a text search may touch.
//!
//! The registry owns every set and keeps them consistent, the editor turns
//! user gestures into registry calls, and the SQLite store keeps everything
//! between runs. The `ui` module is one possible front-end over the editor.
pub mod catalog;
pub mod config;
pub mod db;
pub mod editor;
pub mod error;
pub mod logging;
pub mod models;
pub mod registry;
pub mod scope;
pub mod store;
pub mod ui;

pub use catalog::BookCatalog;
pub use db::SqliteStore;
pub use editor::{BookSetEditor, EditorView, Gesture, Notice, NoticeKind, Outcome};
pub use error::BookSetError;
pub use models::{Book, BookId, SearchBookSet, Testament};
pub use registry::BookSetRegistry;
pub use scope::{ScopeListener, ScopeLog, SearchScope};
pub use store::{BookSetStore, StoredBookSet, StoredRegistry};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
