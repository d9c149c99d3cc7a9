//! Presence fields and their Discord JSON payloads.

use serde::{Deserialize, Serialize};

/// The values shown in the Discord status, built fresh for every publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceFields {
    /// First line under the game name.
    pub details: String,
    /// Second line under the game name.
    pub state: String,
    pub large_image_key: String,
    pub large_image_text: String,
    /// Session start, seconds since the Unix epoch. Drives Discord's elapsed timer.
    pub start_timestamp: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Handshake<'a> {
    pub v: u8,
    pub client_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct Activity<'a> {
    details: &'a str,
    state: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamps: Option<Timestamps>,
    assets: Assets<'a>,
}

#[derive(Debug, Serialize)]
struct Timestamps {
    start: i64,
}

#[derive(Debug, Serialize)]
struct Assets<'a> {
    large_image: &'a str,
    large_text: &'a str,
}

impl<'a> From<&'a PresenceFields> for Activity<'a> {
    fn from(fields: &'a PresenceFields) -> Self {
        Self {
            details: &fields.details,
            state: &fields.state,
            timestamps: fields.start_timestamp.map(|start| Timestamps { start }),
            assets: Assets {
                large_image: &fields.large_image_key,
                large_text: &fields.large_image_text,
            },
        }
    }
}

/// `SET_ACTIVITY` command. A `None` activity clears the status.
#[derive(Debug, Serialize)]
pub(crate) struct SetActivity<'a> {
    pub cmd: &'static str,
    pub args: SetActivityArgs<'a>,
    pub nonce: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SetActivityArgs<'a> {
    pub pid: u32,
    pub activity: Option<Activity<'a>>,
}

/// Any command response or event dispatched by Discord.
#[derive(Debug, Deserialize)]
pub(crate) struct Response {
    #[serde(default)]
    pub cmd: Option<String>,
    #[serde(default)]
    pub evt: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub nonce: Option<String>,
}

/// Error body of an `ERROR` event or a CLOSE frame.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}
