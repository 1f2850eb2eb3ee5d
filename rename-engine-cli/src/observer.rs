use rename_engine_core::{Item, Observer};
use std::sync::Arc;

/// Forwards manager lifecycle events into the `tracing` subscriber `main` installs.
/// The CLI's user-facing output is the rendered table, not these events - they are
/// diagnostic, visible at `--log-level debug` and above.
pub struct TerminalObserver;

impl Observer for TerminalObserver {
    fn on_item_added(&self, item: &Arc<Item>) {
        tracing::debug!(name = item.original_name(), "item added");
    }

    fn on_update(&self, item: &Arc<Item>) {
        tracing::debug!(name = item.original_name(), new_name = ?item.new_name(), "item updated");
    }

    fn on_error(&self, item: &Arc<Item>) {
        tracing::warn!(name = item.original_name(), "regex adapter reported an error");
    }

    fn on_regex_started(&self) {
        tracing::info!("preview started");
    }

    fn on_regex_canceled(&self) {
        tracing::info!("preview canceled");
    }

    fn on_regex_completed(&self) {
        tracing::info!("preview completed");
    }

    fn on_rename_started(&self) {
        tracing::info!("rename started");
    }

    fn on_rename_completed(&self) {
        tracing::info!("rename completed");
    }
}
