//! Directory the executable lives in. The default settings file is read from
//! there so a standalone binary carries its configuration alongside it.

use std::path::PathBuf;

/// Directory containing the running executable. Falls back to the current
/// directory if unavailable.
pub fn exe_directory() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// `settings.json` next to the executable.
pub fn default_settings_path() -> PathBuf {
    exe_directory().join("settings.json")
}
