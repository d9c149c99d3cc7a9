use std::path::{Path, PathBuf};

use crate::{DEADLOCK_INSTALL_DIR, SteamError};

/// Provides access to paths under one Steam root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    base_dir: PathBuf,
}

impl Paths {
    /// Creates a new `Paths` instance rooted at the first Steam directory
    /// that exists on this machine.
    pub fn new() -> Result<Self, SteamError> {
        candidate_roots()
            .into_iter()
            .find(|p| p.base_dir.exists())
            .ok_or(SteamError::NotFound)
    }

    /// Creates a new `Paths` instance with a custom base directory.
    pub fn with_base(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Returns the Steam base directory.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Returns the userdata directory.
    pub fn user_data_dir(&self) -> PathBuf {
        self.base_dir.join("userdata")
    }

    /// Returns the directory for a specific user.
    pub fn user_dir(&self, user_id: &str) -> PathBuf {
        self.user_data_dir().join(user_id)
    }

    /// Returns the cloud-synced `remote` folder of an app for a user.
    pub fn app_remote_dir(&self, user_id: &str, app_id: u32) -> PathBuf {
        self.user_dir(user_id).join(app_id.to_string()).join("remote")
    }

    /// Returns the `steamapps/common` directory.
    pub fn common_dir(&self) -> PathBuf {
        self.base_dir.join("steamapps").join("common")
    }

    /// Returns Deadlock's `console.log` under this root.
    pub fn console_log_path(&self) -> PathBuf {
        self.common_dir()
            .join(DEADLOCK_INSTALL_DIR)
            .join("game")
            .join("citadel")
            .join("console.log")
    }
}

/// Returns every Steam root this platform conventionally uses, in priority
/// order. Roots are not checked for existence.
pub fn candidate_roots() -> Vec<Paths> {
    let mut roots: Vec<Paths> = Vec::new();
    for dir in platform_roots() {
        let paths = Paths::with_base(dir);
        if !roots.contains(&paths) {
            roots.push(paths);
        }
    }
    roots
}

/// Returns the console log location under each of the given roots.
pub fn console_log_candidates_in(roots: &[Paths]) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = Vec::with_capacity(roots.len());
    for root in roots {
        let path = root.console_log_path();
        if !out.contains(&path) {
            out.push(path);
        }
    }
    out
}

// Platform-specific root detection.
#[cfg(target_os = "linux")]
fn platform_roots() -> Vec<PathBuf> {
    crate::paths_linux::candidate_dirs()
}

#[cfg(target_os = "windows")]
fn platform_roots() -> Vec<PathBuf> {
    crate::paths_windows::candidate_dirs()
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
fn platform_roots() -> Vec<PathBuf> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_with_base() {
        let paths = Paths::with_base("/tmp/steam");
        assert_eq!(paths.base_dir(), Path::new("/tmp/steam"));
        assert_eq!(paths.user_data_dir(), PathBuf::from("/tmp/steam/userdata"));
    }

    #[test]
    fn app_remote_dir_structure() {
        let paths = Paths::with_base("/steam");
        assert_eq!(
            paths.app_remote_dir("12345", 1422450),
            PathBuf::from("/steam/userdata/12345/1422450/remote")
        );
    }

    #[test]
    fn console_log_under_citadel() {
        let paths = Paths::with_base("/steam");
        assert_eq!(
            paths.console_log_path(),
            PathBuf::from("/steam/steamapps/common/Deadlock/game/citadel/console.log")
        );
    }

    #[test]
    fn console_log_candidates_keep_order_and_dedupe() {
        let roots = vec![
            Paths::with_base("/a"),
            Paths::with_base("/b"),
            Paths::with_base("/a"),
        ];
        let logs = console_log_candidates_in(&roots);
        assert_eq!(logs.len(), 2);
        assert!(logs[0].starts_with("/a"));
        assert!(logs[1].starts_with("/b"));
    }

    #[test]
    fn candidate_roots_are_unique() {
        let roots = candidate_roots();
        for (i, r) in roots.iter().enumerate() {
            assert!(!roots[i + 1..].contains(r));
        }
    }
}
