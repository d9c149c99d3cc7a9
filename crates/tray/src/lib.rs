//! System tray interface for Deadlock Discord RPC.
//!
//! The tray shows what the tracker is doing and offers a single action,
//! "Quit". It communicates with the app via channels:
//! - [`TrayEvent`] — events from tray to app (quit requested)
//! - [`TrayUpdate`] — updates from app to tray (status line, shutdown)
//!
//! Two backends consume those channels:
//! - [`run_headless`] logs status changes; quitting is left to Ctrl-C
//! - `run_event_loop` (feature `gui`) shows a native tray icon built with
//!   `tray-icon`/`muda` on a `tao` event loop, which must own the main thread

mod headless;
mod menu;
mod tray;

#[cfg(feature = "gui")]
mod gui;

pub use headless::run_headless;
pub use menu::{MenuAction, MenuItem, MenuState};
pub use tray::{StatusSender, TrayConfig, TrayEvent, TrayHandle, TrayUpdate};

#[cfg(feature = "gui")]
pub use gui::run_event_loop;
