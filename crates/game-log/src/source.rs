//! Hero detection from the game's console log files.

use std::path::PathBuf;

use crate::extract::{extract_hero_id, resolve};
use crate::heroes::HeroTable;
use crate::tail::read_tail;

/// Something that can tell which hero is currently being played.
pub trait HeroSource: Send {
    /// Returns the display name of the current hero, if known.
    fn detect(&self) -> Option<String>;
}

/// Detects the hero by tailing Deadlock's `console.log`.
#[derive(Debug, Clone)]
pub struct ConsoleLogSource {
    /// Candidate log paths, tried in order.
    candidates: Vec<PathBuf>,
    tail_bytes: u64,
    table: HeroTable,
    enabled: bool,
}

impl ConsoleLogSource {
    pub fn new(candidates: Vec<PathBuf>, tail_bytes: u64, table: HeroTable) -> Self {
        Self {
            candidates,
            tail_bytes,
            table,
            enabled: true,
        }
    }

    /// Returns a source that never detects anything.
    pub fn disabled() -> Self {
        Self {
            candidates: Vec::new(),
            tail_bytes: 0,
            table: HeroTable::builtin(),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Returns the candidate paths that currently exist.
    pub fn existing_logs(&self) -> Vec<&PathBuf> {
        self.candidates.iter().filter(|p| p.is_file()).collect()
    }
}

impl HeroSource for ConsoleLogSource {
    fn detect(&self) -> Option<String> {
        if !self.enabled {
            return None;
        }

        for path in &self.candidates {
            if !path.exists() {
                continue;
            }
            // The first log naming any hero decides, even if the id is unknown.
            let text = read_tail(path, self.tail_bytes);
            if let Some(id) = extract_hero_id(&text) {
                let hero = resolve(&id, &self.table);
                tracing::debug!(path = %path.display(), hero = ?hero, "hero detected");
                return hero;
            }
        }
        None
    }
}
