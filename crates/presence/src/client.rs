//! Discord IPC client and the presence client abstraction.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::io::AsyncWriteExt;

use crate::IPC_CALL_TIMEOUT;
use crate::activity::{
    Activity, ErrorBody, Handshake, PresenceFields, Response, SetActivity, SetActivityArgs,
};
use crate::error::PresenceError;
use crate::socket::{self, IpcStream};
use crate::wire::{self, Frame, Opcode};

/// Boxed future returned by [`PresenceClient`] methods.
pub type PresenceFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A session-based presence service.
///
/// `connect` must succeed before `update`/`clear` do. A connection can drop
/// at any time; callers decide whether to reconnect from the error.
pub trait PresenceClient: Send {
    /// Connects to the service. No-op when already connected.
    fn connect(&mut self) -> PresenceFuture<'_, Result<(), PresenceError>>;

    /// Publishes the given fields.
    fn update<'a>(
        &'a mut self,
        fields: &'a PresenceFields,
    ) -> PresenceFuture<'a, Result<(), PresenceError>>;

    /// Removes the published status.
    fn clear(&mut self) -> PresenceFuture<'_, Result<(), PresenceError>>;

    /// Drops the connection. Never fails.
    fn close(&mut self) -> PresenceFuture<'_, ()>;

    fn is_connected(&self) -> bool;
}

/// Result of a publish attempt, classified for the reconnect policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    /// The connection is gone; a fresh connect may succeed.
    ReconnectNeeded(String),
    /// Discord refused the request; retrying the same payload won't help.
    PermanentFailure(String),
}

impl From<Result<(), PresenceError>> for PublishOutcome {
    fn from(result: Result<(), PresenceError>) -> Self {
        match result {
            Ok(()) => PublishOutcome::Published,
            Err(e) if e.needs_reconnect() => PublishOutcome::ReconnectNeeded(e.to_string()),
            Err(e) => PublishOutcome::PermanentFailure(e.to_string()),
        }
    }
}

/// Rich Presence client speaking Discord's local IPC protocol.
pub struct DiscordIpc {
    client_id: String,
    pid: u32,
    call_timeout: Duration,
    stream: Option<Box<dyn IpcStream>>,
}

impl DiscordIpc {
    /// Creates a disconnected client for the given Discord application id.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            pid: std::process::id(),
            call_timeout: IPC_CALL_TIMEOUT,
            stream: None,
        }
    }

    /// Overrides the per-call timeout.
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Performs the handshake over an already-open stream and keeps it on
    /// success. Any previous connection is dropped.
    pub async fn connect_with(&mut self, stream: Box<dyn IpcStream>) -> Result<(), PresenceError> {
        self.stream = None;
        let mut stream = stream;
        match tokio::time::timeout(self.call_timeout, handshake(&mut stream, &self.client_id))
            .await
        {
            Ok(Ok(())) => {
                self.stream = Some(stream);
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(PresenceError::Timeout),
        }
    }

    async fn connect_inner(&mut self) -> Result<(), PresenceError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let stream = tokio::time::timeout(self.call_timeout, socket::open())
            .await
            .map_err(|_| PresenceError::Timeout)??;
        self.connect_with(stream).await?;

        tracing::info!(client_id = %self.client_id, "connected to Discord");
        Ok(())
    }

    async fn set_activity(&mut self, activity: Option<Activity<'_>>) -> Result<(), PresenceError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(PresenceError::NotConnected);
        };

        let nonce = uuid::Uuid::new_v4().to_string();
        let cmd = SetActivity {
            cmd: "SET_ACTIVITY",
            args: SetActivityArgs {
                pid: self.pid,
                activity,
            },
            nonce: nonce.clone(),
        };
        let frame = Frame::json(Opcode::Frame, &cmd)?;

        let result = match tokio::time::timeout(self.call_timeout, request(stream, &frame, &nonce))
            .await
        {
            Ok(r) => r,
            Err(_) => Err(PresenceError::Timeout),
        };

        // A broken stream is useless; forget it so is_connected() tells the truth.
        if let Err(e) = &result
            && e.needs_reconnect()
        {
            self.stream = None;
        }
        result
    }

    async fn close_inner(&mut self) {
        let Some(mut stream) = self.stream.take() else {
            return;
        };

        let frame = Frame {
            opcode: Opcode::Close,
            payload: b"{}".to_vec(),
        };
        let _ = tokio::time::timeout(self.call_timeout, async {
            wire::write_frame(&mut stream, &frame).await?;
            stream.shutdown().await?;
            Ok::<(), PresenceError>(())
        })
        .await;

        tracing::debug!("Discord IPC connection closed");
    }
}

impl PresenceClient for DiscordIpc {
    fn connect(&mut self) -> PresenceFuture<'_, Result<(), PresenceError>> {
        Box::pin(self.connect_inner())
    }

    fn update<'a>(
        &'a mut self,
        fields: &'a PresenceFields,
    ) -> PresenceFuture<'a, Result<(), PresenceError>> {
        Box::pin(async move { self.set_activity(Some(Activity::from(fields))).await })
    }

    fn clear(&mut self) -> PresenceFuture<'_, Result<(), PresenceError>> {
        Box::pin(async move { self.set_activity(None).await })
    }

    fn close(&mut self) -> PresenceFuture<'_, ()> {
        Box::pin(self.close_inner())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

/// Sends the handshake and waits for Discord's `READY` dispatch.
async fn handshake(stream: &mut Box<dyn IpcStream>, client_id: &str) -> Result<(), PresenceError> {
    let frame = Frame::json(Opcode::Handshake, &Handshake { v: 1, client_id })?;
    wire::write_frame(stream, &frame).await?;

    loop {
        let reply = wire::read_frame(stream).await?;
        match reply.opcode {
            Opcode::Frame => {
                let response: Response = reply.parse()?;
                match response.evt.as_deref() {
                    Some("READY") => return Ok(()),
                    Some("ERROR") => return Err(rejection(response.data)),
                    _ => continue,
                }
            }
            Opcode::Close => {
                let body = error_body(&reply.payload);
                return Err(PresenceError::Rejected {
                    code: body.code,
                    message: body.message,
                });
            }
            Opcode::Ping => pong(stream, reply).await?,
            Opcode::Handshake | Opcode::Pong => {}
        }
    }
}

/// Sends a command frame and waits for the response carrying `nonce`.
async fn request(
    stream: &mut Box<dyn IpcStream>,
    frame: &Frame,
    nonce: &str,
) -> Result<(), PresenceError> {
    wire::write_frame(stream, frame).await?;

    loop {
        let reply = wire::read_frame(stream).await?;
        match reply.opcode {
            Opcode::Frame => {
                let response: Response = reply.parse()?;
                if response.nonce.as_deref() != Some(nonce) {
                    tracing::trace!(cmd = ?response.cmd, evt = ?response.evt, "ignoring unrelated dispatch");
                    continue;
                }
                if response.evt.as_deref() == Some("ERROR") {
                    return Err(rejection(response.data));
                }
                return Ok(());
            }
            Opcode::Close => {
                let body = error_body(&reply.payload);
                return Err(PresenceError::Closed(format!("{}: {}", body.code, body.message)));
            }
            Opcode::Ping => pong(stream, reply).await?,
            Opcode::Handshake | Opcode::Pong => {}
        }
    }
}

async fn pong(stream: &mut Box<dyn IpcStream>, ping: Frame) -> Result<(), PresenceError> {
    let frame = Frame {
        opcode: Opcode::Pong,
        payload: ping.payload,
    };
    wire::write_frame(stream, &frame).await
}

fn rejection(data: Option<serde_json::Value>) -> PresenceError {
    let body = data
        .and_then(|d| serde_json::from_value::<ErrorBody>(d).ok())
        .unwrap_or(ErrorBody {
            code: 0,
            message: "unknown error".into(),
        });
    PresenceError::Rejected {
        code: body.code,
        message: body.message,
    }
}

fn error_body(payload: &[u8]) -> ErrorBody {
    serde_json::from_slice(payload).unwrap_or_else(|_| ErrorBody {
        code: 0,
        message: String::from_utf8_lossy(payload).into_owned(),
    })
}
