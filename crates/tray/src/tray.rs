//! Tray handle, events, and update types.
//!
//! Defines the channel-based interface the app uses to talk to the tray,
//! independent of the GUI backend.

use std::sync::mpsc;

use crate::menu::MenuState;

/// Configuration for the system tray.
#[derive(Debug, Clone)]
pub struct TrayConfig {
    /// Title shown in the tooltip and menu header.
    pub title: String,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            title: "Deadlock Discord RPC".into(),
        }
    }
}

impl TrayConfig {
    /// Menu state shown before the first status update arrives.
    pub fn initial_state(&self) -> MenuState {
        MenuState {
            title: self.title.clone(),
            ..MenuState::default()
        }
    }
}

/// Events emitted by the tray to the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayEvent {
    /// User clicked "Quit" in the context menu.
    QuitRequested,
}

/// Updates sent from the app to the tray.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayUpdate {
    /// The status line changed.
    StatusChanged(String),
    /// Request tray shutdown.
    Shutdown,
}

/// Cloneable sender for status lines, usable from any thread.
#[derive(Debug, Clone)]
pub struct StatusSender {
    update_tx: mpsc::Sender<TrayUpdate>,
}

impl StatusSender {
    pub fn send(&self, status: impl Into<String>) {
        let _ = self.update_tx.send(TrayUpdate::StatusChanged(status.into()));
    }
}

/// Handle for communicating with the system tray from the app.
pub struct TrayHandle {
    /// Send updates to the tray.
    update_tx: mpsc::Sender<TrayUpdate>,
    /// Receive events from the tray.
    event_rx: mpsc::Receiver<TrayEvent>,
}

impl TrayHandle {
    /// Creates a new tray handle with its channel pair.
    ///
    /// Returns `(handle, event_sender, update_receiver)` — the sender/receiver
    /// pair is given to the tray backend.
    pub fn new() -> (Self, mpsc::Sender<TrayEvent>, mpsc::Receiver<TrayUpdate>) {
        let (update_tx, update_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        (Self { update_tx, event_rx }, event_tx, update_rx)
    }

    /// Returns a sender that pushes status lines without borrowing the handle.
    pub fn status_sender(&self) -> StatusSender {
        StatusSender {
            update_tx: self.update_tx.clone(),
        }
    }

    /// Requests the tray to shut down.
    pub fn shutdown(&self) {
        let _ = self.update_tx.send(TrayUpdate::Shutdown);
    }

    /// Tries to receive a tray event (non-blocking).
    pub fn try_recv_event(&self) -> Option<TrayEvent> {
        self.event_rx.try_recv().ok()
    }
}
