use std::path::PathBuf;

/// Returns the Steam root directories on Windows: the registry install path
/// first, then the default Program Files locations.
pub(crate) fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    // Try 64-bit registry first, then 32-bit.
    for subkey in [r"SOFTWARE\Wow6432Node\Valve\Steam", r"SOFTWARE\Valve\Steam"] {
        if let Some(path) = read_steam_registry(subkey) {
            dirs.push(path);
        }
    }

    for var in ["ProgramFiles(x86)", "ProgramFiles"] {
        if let Some(base) = std::env::var_os(var) {
            dirs.push(PathBuf::from(base).join("Steam"));
        }
    }

    dirs
}

fn read_steam_registry(subkey: &str) -> Option<PathBuf> {
    use winreg::RegKey;
    use winreg::enums::HKEY_LOCAL_MACHINE;

    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    let key = hklm.open_subkey(subkey).ok()?;
    let install_path: String = key.get_value("InstallPath").ok()?;
    tracing::debug!(subkey, install_path = %install_path, "steam registry entry found");
    Some(PathBuf::from(install_path))
}
