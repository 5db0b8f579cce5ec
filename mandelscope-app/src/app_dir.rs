//! Where the console keeps its files: preferences and exports next to the
//! executable, session files in the platform data directory.

use std::path::{Path, PathBuf};

/// Directory containing the running executable. Falls back to current directory if unavailable.
pub fn exe_directory() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Default directory for exported images.
pub fn images_directory() -> PathBuf {
    exe_directory().join("images")
}

/// Default directory for saved sessions.
pub fn sessions_directory() -> PathBuf {
    directories::ProjectDirs::from("", "", "mandelscope")
        .map(|d| d.data_dir().join("sessions"))
        .unwrap_or_else(|| exe_directory().join("sessions"))
}

/// Resolve a user-supplied path: absolute paths are kept, relative ones
/// land in `base`.
pub fn resolve(base: &Path, raw: &Path) -> PathBuf {
    if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        base.join(raw)
    }
}

/// Append `.txt` when the path has no extension.
pub fn with_session_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension("txt")
    }
}
