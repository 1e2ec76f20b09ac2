//! Ratatui front-end: login screen, records dashboard and the modal forms
//! layered over it. All reads and writes go through the owned [`crate::db::Store`].

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
