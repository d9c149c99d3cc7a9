//! Platform-specific discovery of Discord's IPC endpoint.

use tokio::io::{AsyncRead, AsyncWrite};

use crate::IPC_SOCKET_COUNT;
use crate::error::PresenceError;

/// A bidirectional byte stream to Discord.
pub trait IpcStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> IpcStream for T {}

/// Opens the first reachable `discord-ipc-N` endpoint.
#[cfg(unix)]
pub(crate) async fn open() -> Result<Box<dyn IpcStream>, PresenceError> {
    for path in unix::socket_paths(|key| std::env::var(key).ok()) {
        match tokio::net::UnixStream::connect(&path).await {
            Ok(stream) => {
                tracing::debug!(path = %path.display(), "opened Discord IPC socket");
                return Ok(Box::new(stream));
            }
            Err(e) => {
                tracing::trace!(path = %path.display(), error = %e, "IPC socket not available");
            }
        }
    }
    Err(PresenceError::NoSocket)
}

/// Opens the first reachable `discord-ipc-N` named pipe.
#[cfg(windows)]
pub(crate) async fn open() -> Result<Box<dyn IpcStream>, PresenceError> {
    use tokio::net::windows::named_pipe::ClientOptions;

    for i in 0..IPC_SOCKET_COUNT {
        let name = format!(r"\\.\pipe\discord-ipc-{i}");
        match ClientOptions::new().open(&name) {
            Ok(pipe) => {
                tracing::debug!(pipe = %name, "opened Discord IPC pipe");
                return Ok(Box::new(pipe));
            }
            Err(e) => {
                tracing::trace!(pipe = %name, error = %e, "IPC pipe not available");
            }
        }
    }
    Err(PresenceError::NoSocket)
}

#[cfg(not(any(unix, windows)))]
pub(crate) async fn open() -> Result<Box<dyn IpcStream>, PresenceError> {
    Err(PresenceError::NoSocket)
}

#[cfg(unix)]
mod unix {
    use std::path::PathBuf;

    use super::IPC_SOCKET_COUNT;

    /// Subdirectories used by sandboxed Discord builds.
    const SANDBOX_SUBDIRS: &[&str] = &["", "app/com.discordapp.Discord", "snap.discord"];

    /// Returns every candidate socket path in probe order.
    pub(super) fn socket_paths(env: impl Fn(&str) -> Option<String>) -> Vec<PathBuf> {
        let base = ["XDG_RUNTIME_DIR", "TMPDIR", "TMP", "TEMP"]
            .iter()
            .find_map(|key| env(key).filter(|v| !v.is_empty()))
            .unwrap_or_else(|| "/tmp".into());
        let base = PathBuf::from(base);

        let mut paths = Vec::new();
        for sub in SANDBOX_SUBDIRS {
            let dir = if sub.is_empty() {
                base.clone()
            } else {
                base.join(sub)
            };
            for i in 0..IPC_SOCKET_COUNT {
                paths.push(dir.join(format!("discord-ipc-{i}")));
            }
        }
        paths
    }

}
