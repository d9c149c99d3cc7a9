//! Game session tracking for Deadlock Discord RPC.
//!
//! The [`Tracker`] polls a [`ProcessProbe`] on a fixed interval, keeps the
//! [`Session`] state, asks a hero source which hero is being played, and
//! mirrors the result to a presence client: publish when the game starts,
//! republish while it runs, clear when it exits.

mod state;
mod tracker;
mod watcher;

pub use state::{
    DETAILS, IN_GAME_STATE, LARGE_IMAGE_KEY, LARGE_IMAGE_TEXT, Session, build_fields,
};
pub use tracker::{OnStatusFn, Tracker};
pub use watcher::{GameWatcher, ProcessProbe};

use std::time::Duration;

/// Default interval between probes.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(15);

/// Executable name of Deadlock.
pub const DEADLOCK_PROCESS: &str = "project8.exe";
