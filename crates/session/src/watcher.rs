//! Process watcher for the game executable.

use sysinfo::{ProcessRefreshKind, System};

/// Answers whether the watched game is currently running.
pub trait ProcessProbe: Send {
    fn is_target_running(&mut self) -> bool;
}

/// Watches the OS process list for one executable name.
pub struct GameWatcher {
    /// Lowercased executable name.
    target: String,
    system: System,
}

impl GameWatcher {
    pub fn new(process_name: &str) -> Self {
        Self {
            target: process_name.to_lowercase(),
            system: System::new(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl ProcessProbe for GameWatcher {
    fn is_target_running(&mut self) -> bool {
        // Names only; processes that exit or deny access mid-refresh are
        // simply absent from the list.
        self.system.refresh_processes_specifics(ProcessRefreshKind::new());
        self.system
            .processes()
            .values()
            .any(|p| matches_target(p.name(), &self.target))
    }
}

fn matches_target(name: &str, target: &str) -> bool {
    name.to_lowercase() == target
}
