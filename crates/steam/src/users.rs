use std::fs;
use std::path::PathBuf;

use crate::SteamError;
use crate::paths::Paths;

/// A Steam user found under `userdata`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    /// Whether the user has a `remote` folder for the queried app.
    pub has_app_data: bool,
}

/// Returns the Steam users under one root, flagging those with data for `app_id`.
pub fn get_users_with_paths(paths: &Paths, app_id: u32) -> Result<Vec<User>, SteamError> {
    let user_data_dir = paths.user_data_dir();

    let entries = fs::read_dir(&user_data_dir).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SteamError::NotFound
        } else {
            SteamError::Io(e.to_string())
        }
    })?;

    let mut users = Vec::new();
    for entry in entries {
        // Entries can vanish mid-listing; skip them.
        let Ok(entry) = entry else { continue };

        if !entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
            continue;
        }

        let name = entry.file_name();
        let name = name.to_string_lossy();

        // Verify it's a numeric user ID
        if name.parse::<u64>().is_err() {
            continue;
        }

        // Skip "0" directory — temporary Steam directory, not a real user
        if name == "0" {
            continue;
        }

        let has_app_data = paths.app_remote_dir(&name, app_id).is_dir();
        users.push(User {
            id: name.into_owned(),
            has_app_data,
        });
    }

    users.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(users)
}

/// Finds the first `userdata/<user>/<app_id>/remote` folder across the given
/// roots. Roots without a userdata folder are skipped.
pub fn find_app_remote_dir(roots: &[Paths], app_id: u32) -> Option<PathBuf> {
    for root in roots {
        let users = match get_users_with_paths(root, app_id) {
            Ok(users) => users,
            Err(SteamError::NotFound) => continue,
            Err(e) => {
                tracing::debug!(root = %root.base_dir().display(), error = %e, "skipping steam root");
                continue;
            }
        };

        if let Some(user) = users.into_iter().find(|u| u.has_app_data) {
            return Some(root.app_remote_dir(&user.id, app_id));
        }
    }
    None
}
