//! Error types for the presence client.

/// Errors produced by the Discord IPC client.
#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    #[error("no Discord IPC socket found")]
    NoSocket,

    #[error("not connected to Discord")]
    NotConnected,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Discord closed the connection: {0}")]
    Closed(String),

    #[error("Discord IPC call timed out")]
    Timeout,

    /// The stream sent a header that cannot be decoded; it is out of sync.
    #[error("framing error: {0}")]
    Framing(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("Discord rejected the request ({code}): {message}")]
    Rejected { code: i64, message: String },
}

impl PresenceError {
    /// Returns `true` when the connection is gone and a fresh connect may help.
    pub fn needs_reconnect(&self) -> bool {
        matches!(
            self,
            PresenceError::NoSocket
                | PresenceError::NotConnected
                | PresenceError::Io(_)
                | PresenceError::Closed(_)
                | PresenceError::Timeout
                | PresenceError::Framing(_)
        )
    }
}

impl From<serde_json::Error> for PresenceError {
    fn from(e: serde_json::Error) -> Self {
        PresenceError::Protocol(format!("invalid JSON payload: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_errors_need_reconnect() {
        assert!(PresenceError::NoSocket.needs_reconnect());
        assert!(PresenceError::NotConnected.needs_reconnect());
        assert!(PresenceError::Timeout.needs_reconnect());
        assert!(PresenceError::Closed("bye".into()).needs_reconnect());
        assert!(PresenceError::Framing("unknown opcode 9".into()).needs_reconnect());
        assert!(
            PresenceError::Io(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
                .needs_reconnect()
        );
    }

    #[test]
    fn rejections_do_not_need_reconnect() {
        assert!(!PresenceError::Protocol("bad".into()).needs_reconnect());
        assert!(
            !PresenceError::Rejected {
                code: 4000,
                message: "Invalid Client ID".into()
            }
            .needs_reconnect()
        );
    }

    #[test]
    fn rejected_display() {
        let e = PresenceError::Rejected {
            code: 4000,
            message: "Invalid Client ID".into(),
        };
        assert_eq!(
            e.to_string(),
            "Discord rejected the request (4000): Invalid Client ID"
        );
    }
}
