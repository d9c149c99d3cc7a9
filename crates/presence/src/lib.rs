//! Discord Rich Presence client over the local IPC socket.
//!
//! Discord exposes an IPC endpoint (`discord-ipc-N` Unix socket, or named
//! pipe on Windows) that accepts length-prefixed JSON frames. This crate
//! implements just enough of it to publish and clear an activity.
//!
//! # Wire format
//!
//! See [`wire`] module for the frame layout.

pub mod activity;
pub mod client;
pub mod error;
mod socket;
pub mod wire;

pub use activity::PresenceFields;
pub use client::{DiscordIpc, PresenceClient, PresenceFuture, PublishOutcome};
pub use error::PresenceError;
pub use socket::IpcStream;

use std::time::Duration;

/// Upper bound for a single IPC call (connect, update, clear).
pub const IPC_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Number of `discord-ipc-N` endpoints Discord may listen on.
pub const IPC_SOCKET_COUNT: u8 = 10;
