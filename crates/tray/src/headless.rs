//! Tray backend for machines without a desktop tray.

use std::sync::mpsc::Receiver;

use crate::menu::MenuState;
use crate::tray::{TrayConfig, TrayUpdate};

/// Drains tray updates, logging each status change.
///
/// Blocks until [`TrayUpdate::Shutdown`] arrives or every sender is gone, and
/// returns the last menu state. Nothing here can request a quit.
pub fn run_headless(config: TrayConfig, update_rx: Receiver<TrayUpdate>) -> MenuState {
    let mut state = config.initial_state();

    while let Ok(update) = update_rx.recv() {
        if !state.apply(update) {
            tracing::debug!("tray shut down");
            break;
        }
        tracing::info!(status = %state.status, "{}", state.title);
    }

    state
}
