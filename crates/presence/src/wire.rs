//! Discord IPC frame codec.
//!
//! # Wire format
//!
//! ```text
//! [4 bytes LE: opcode]
//! [4 bytes LE: payload_len]
//! [payload_len bytes: JSON payload UTF-8]
//! ```
//!
//! Opcodes: HANDSHAKE=0, FRAME=1, CLOSE=2, PING=3, PONG=4.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::PresenceError;

/// Largest payload accepted from or sent to Discord (64 KiB).
pub const MAX_PAYLOAD_LEN: u32 = 64 * 1024;

/// Frame opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Handshake,
    Frame,
    Close,
    Ping,
    Pong,
}

impl Opcode {
    pub fn as_u32(self) -> u32 {
        match self {
            Opcode::Handshake => 0,
            Opcode::Frame => 1,
            Opcode::Close => 2,
            Opcode::Ping => 3,
            Opcode::Pong => 4,
        }
    }
}

impl TryFrom<u32> for Opcode {
    type Error = PresenceError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Opcode::Handshake),
            1 => Ok(Opcode::Frame),
            2 => Ok(Opcode::Close),
            3 => Ok(Opcode::Ping),
            4 => Ok(Opcode::Pong),
            other => Err(PresenceError::Framing(format!("unknown opcode {other}"))),
        }
    }
}

/// A single IPC frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub opcode: Opcode,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Builds a frame with a JSON-encoded payload.
    pub fn json<T: Serialize>(opcode: Opcode, value: &T) -> Result<Self, PresenceError> {
        Ok(Self {
            opcode,
            payload: serde_json::to_vec(value)?,
        })
    }

    /// Decodes the JSON payload.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, PresenceError> {
        Ok(serde_json::from_slice(&self.payload)?)
    }
}

/// Writes a frame to the stream.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    frame: &Frame,
) -> Result<(), PresenceError> {
    let len = frame.payload.len();
    if len > MAX_PAYLOAD_LEN as usize {
        return Err(PresenceError::Protocol(format!(
            "payload too long: {len} bytes (max {MAX_PAYLOAD_LEN})"
        )));
    }

    // One write per frame; Discord reads the header and body together.
    let mut buf = Vec::with_capacity(8 + len);
    buf.extend_from_slice(&frame.opcode.as_u32().to_le_bytes());
    buf.extend_from_slice(&(len as u32).to_le_bytes());
    buf.extend_from_slice(&frame.payload);

    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads a frame from the stream.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Frame, PresenceError> {
    let opcode = Opcode::try_from(reader.read_u32_le().await?)?;
    let len = reader.read_u32_le().await?;
    if len > MAX_PAYLOAD_LEN {
        return Err(PresenceError::Framing(format!(
            "payload too long: {len} bytes (max {MAX_PAYLOAD_LEN})"
        )));
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    Ok(Frame { opcode, payload })
}
