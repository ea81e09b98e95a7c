use crate::core::error::{ShelfError, ShelfResult};
use std::env;
use std::path::PathBuf;

/// Default value of `XDG_DATA_DIRS` when it is unset or empty
pub const DEFAULT_SYSTEM_DATA_DIRS: &str = "/usr/local/share:/usr/share";

/// Get the Shelf home directory
///
/// Platform-specific locations:
/// - Linux: ~/.config/shelf
/// - macOS: ~/Library/Application Support/shelf
/// - Windows: %APPDATA%\shelf
pub fn shelf_home() -> ShelfResult<PathBuf> {
    Ok(user_config_home()?.join("shelf"))
}

/// Get the config file path (`<shelf_home>/config.yaml`)
pub fn config_file() -> ShelfResult<PathBuf> {
    Ok(shelf_home()?.join("config.yaml"))
}

/// Get the per-user configuration base directory (`$XDG_CONFIG_HOME` on Linux)
pub fn user_config_home() -> ShelfResult<PathBuf> {
    dirs::config_dir()
        .ok_or_else(|| ShelfError::Path("Could not determine config directory".to_string()))
}

/// Get the per-user data base directory
///
/// `$XDG_DATA_HOME` when set and non-empty, otherwise `~/.local/share` on
/// every platform.
pub fn user_data_home() -> ShelfResult<PathBuf> {
    if let Some(dir) = env::var_os("XDG_DATA_HOME").filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    let home = dirs::home_dir()
        .ok_or_else(|| ShelfError::Path("Could not determine home directory".to_string()))?;
    Ok(home.join(".local").join("share"))
}

/// Get the system-wide data base directories, in search order
///
/// Read from `$XDG_DATA_DIRS` (colon separated), falling back to
/// [`DEFAULT_SYSTEM_DATA_DIRS`]. Empty entries are dropped.
pub fn system_data_dirs() -> Vec<PathBuf> {
    let value = env::var("XDG_DATA_DIRS")
        .ok()
        .filter(|dirs| !dirs.is_empty())
        .unwrap_or_else(|| DEFAULT_SYSTEM_DATA_DIRS.to_string());
    split_search_path(&value)
}

/// Split a colon separated search path, ignoring empty entries
pub fn split_search_path(value: &str) -> Vec<PathBuf> {
    value
        .split(':')
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect()
}
