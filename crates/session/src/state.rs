//! Session state and the presence fields derived from it.

use chrono::{DateTime, Utc};
use deadlock_rpc_presence::PresenceFields;

pub const DETAILS: &str = "Playing Deadlock";
pub const IN_GAME_STATE: &str = "In Game";
pub const LARGE_IMAGE_KEY: &str = "deadlock_logo";
pub const LARGE_IMAGE_TEXT: &str = "Deadlock";

/// What the tracker knows about the current game session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    /// The game is not running.
    #[default]
    Idle,
    /// The game is running.
    Active {
        /// When the game was first observed running. Fixed for the session.
        started_at: DateTime<Utc>,
        /// Hero currently being played, if detected.
        character: Option<String>,
    },
}

impl Session {
    pub fn is_active(&self) -> bool {
        matches!(self, Session::Active { .. })
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Session::Active { started_at, .. } => Some(*started_at),
            Session::Idle => None,
        }
    }

    pub fn character(&self) -> Option<&str> {
        match self {
            Session::Active { character, .. } => character.as_deref(),
            Session::Idle => None,
        }
    }

    /// Short human-readable status, used by the tray.
    pub fn status_line(&self) -> String {
        match self {
            Session::Idle => "Waiting for Deadlock".into(),
            Session::Active {
                character: Some(hero),
                ..
            } => format!("Playing {hero}"),
            Session::Active { character: None, .. } => DETAILS.into(),
        }
    }
}

/// Builds the fields to publish for the given session.
pub fn build_fields(session: &Session) -> PresenceFields {
    let state = match session.character() {
        Some(hero) => format!("Playing {hero}"),
        None => IN_GAME_STATE.to_string(),
    };

    PresenceFields {
        details: DETAILS.to_string(),
        state,
        large_image_key: LARGE_IMAGE_KEY.to_string(),
        large_image_text: LARGE_IMAGE_TEXT.to_string(),
        start_timestamp: session.started_at().map(|t| t.timestamp()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64, millis: u32) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, millis * 1_000_000).unwrap()
    }

    #[test]
    fn idle_has_no_start_or_character() {
        let s = Session::default();
        assert!(!s.is_active());
        assert_eq!(s.started_at(), None);
        assert_eq!(s.character(), None);
    }

    #[test]
    fn fields_without_character() {
        let s = Session::Active {
            started_at: at(1_700_000_000, 0),
            character: None,
        };
        let f = build_fields(&s);
        assert_eq!(f.details, "Playing Deadlock");
        assert_eq!(f.state, "In Game");
        assert_eq!(f.large_image_key, "deadlock_logo");
        assert_eq!(f.large_image_text, "Deadlock");
        assert_eq!(f.start_timestamp, Some(1_700_000_000));
    }

    #[test]
    fn fields_with_character() {
        let s = Session::Active {
            started_at: at(1_700_000_000, 0),
            character: Some("Mo & Krill".into()),
        };
        assert_eq!(build_fields(&s).state, "Playing Mo & Krill");
    }

    #[test]
    fn start_timestamp_truncates_to_seconds() {
        let s = Session::Active {
            started_at: at(1_700_000_123, 999),
            character: None,
        };
        assert_eq!(build_fields(&s).start_timestamp, Some(1_700_000_123));
    }

    #[test]
    fn idle_fields_have_no_start() {
        let f = build_fields(&Session::Idle);
        assert_eq!(f.start_timestamp, None);
        assert_eq!(f.state, "In Game");
    }

    #[test]
    fn status_lines() {
        assert_eq!(Session::Idle.status_line(), "Waiting for Deadlock");
        let active = Session::Active {
            started_at: at(0, 0),
            character: None,
        };
        assert_eq!(active.status_line(), "Playing Deadlock");
        let hero = Session::Active {
            started_at: at(0, 0),
            character: Some("Shiv".into()),
        };
        assert_eq!(hero.status_line(), "Playing Shiv");
    }
}
