//! Core library surface for the Student Records Manager TUI application.
//!
//! The persistence layer (`db`) is usable on its own: a [`Store`] holds every
//! student record and administrator credential in memory and rewrites its text
//! file after each change. The `ui` module is the terminal front-end that drives it.
pub mod cli;
pub mod db;
pub mod logging;
pub mod models;
pub mod ui;

/// Convenience re-exports for the persistence layer.
pub use db::{Store, StoreError};

/// The domain types that other layers manipulate.
pub use models::{Credentials, RecordId, StudentDraft, StudentRecord};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
