//! Binary entry point: resolve settings, start file logging, load the records
//! store and drive the Ratatui event loop until the user exits.
use anyhow::Context;
use clap::Parser;

use student_records_manager::cli::Cli;
use student_records_manager::{logging, run_app, App, Store};

/// Returning a `Result` bubbles fatal start-up problems (an unreadable records
/// file, no home directory) to the terminal instead of crashing silently.
fn main() -> anyhow::Result<()> {
    let settings = Cli::parse().into_settings()?;
    logging::init(&settings.log_file, &settings.log_filter)?;

    let store = Store::initialize(&settings.data_file).context("failed to load student records")?;
    let mut app = App::new(store);
    let result = run_app(&mut app);

    if let Err(err) = app.store().flush() {
        tracing::error!(error = %err, "final save failed");
        eprintln!("Warning: {err}");
    }
    tracing::info!("session ended");
    result
}
