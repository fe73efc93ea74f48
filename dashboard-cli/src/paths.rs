//! Platform-specific directory paths.
//!
//! Uses XDG on Linux and the standard per-user locations on macOS and Windows.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use directories::ProjectDirs;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "dashboard";
const APPLICATION: &str = "dashboard";

const LATEST_LOG: &str = "latest.log";

/// Maximum number of archived log files to keep.
const MAX_OLD_LOGS: usize = 10;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Directory holding the persisted session.
///
/// - Linux: `$XDG_DATA_HOME/dashboard` or `~/.local/share/dashboard`
/// - macOS: `~/Library/Application Support/dev.dashboard.dashboard`
/// - Windows: `C:\Users\<User>\AppData\Roaming\dashboard\dashboard\data`
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Directory holding log files.
///
/// - Linux: `$XDG_CACHE_HOME/dashboard` or `~/.cache/dashboard`
/// - macOS: `~/Library/Caches/dev.dashboard.dashboard`
/// - Windows: `C:\Users\<User>\AppData\Local\dashboard\dashboard\cache`
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Directory holding `config.toml`.
///
/// - Linux: `$XDG_CONFIG_HOME/dashboard` or `~/.config/dashboard`
/// - macOS: `~/Library/Application Support/dev.dashboard.dashboard`
/// - Windows: `C:\Users\<User>\AppData\Roaming\dashboard\dashboard\config`
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// `config.toml` in [`config_dir`].
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// `session.json` in [`data_dir`].
pub fn session_file() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("session.json"))
}

pub fn log_file() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join(LATEST_LOG))
}

/// Archives `latest.log` under a timestamped name and prunes old archives.
///
/// Call this at startup before creating the new log file.
pub fn rotate_logs() {
    let Some(cache) = cache_dir() else { return };
    let latest = cache.join(LATEST_LOG);

    if latest.exists() {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let archived = cache.join(format!("{}.log", timestamp));
        let _ = fs::rename(&latest, &archived);
    }

    prune_logs(&cache, MAX_OLD_LOGS);
}

/// Removes the oldest archived logs in `dir` beyond `keep`.
fn prune_logs(dir: &Path, keep: usize) {
    let Ok(entries) = fs::read_dir(dir) else { return };

    let mut logs: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.ends_with(".log") && name != LATEST_LOG
        })
        .collect();

    // Oldest first
    logs.sort_by_key(|e| e.metadata().and_then(|m| m.modified()).ok());

    let excess = logs.len().saturating_sub(keep);
    for entry in logs.iter().take(excess) {
        let _ = fs::remove_file(entry.path());
    }
}
