use std::path::PathBuf;

/// Returns the conventional Steam root directories on Linux.
pub(crate) fn candidate_dirs() -> Vec<PathBuf> {
    let Some(home) = home_dir() else {
        return Vec::new();
    };

    vec![
        // Primary location: ~/.steam/steam
        home.join(".steam").join("steam"),
        // Fallback: ~/.local/share/Steam
        home.join(".local").join("share").join("Steam"),
        // Flatpak location
        home.join(".var")
            .join("app")
            .join("com.valvesoftware.Steam")
            .join(".steam")
            .join("steam"),
    ]
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}
