//! Steam install discovery for Deadlock Discord RPC.
//!
//! Locates the Steam installation(s) on this machine and derives the two
//! paths the presence tracker cares about:
//! - the per-user `userdata/<user>/<app_id>/remote` folder of the game
//! - the game's `console.log`, written only when Deadlock is launched with
//!   `-condebug`
//!
//! Nothing here is fatal: a missing install simply yields no candidates.

pub mod paths;
#[cfg(target_os = "linux")]
mod paths_linux;
#[cfg(target_os = "windows")]
mod paths_windows;
pub mod users;

pub use paths::{Paths, candidate_roots, console_log_candidates_in};
pub use users::{User, find_app_remote_dir, get_users_with_paths};

/// Steam app id of Deadlock.
pub const DEADLOCK_APP_ID: u32 = 1_422_450;

/// Directory name of Deadlock under `steamapps/common`.
pub const DEADLOCK_INSTALL_DIR: &str = "Deadlock";

/// Errors for Steam path discovery.
#[derive(Debug, thiserror::Error)]
pub enum SteamError {
    #[error("steam installation not found")]
    NotFound,

    #[error("I/O error: {0}")]
    Io(String),
}
