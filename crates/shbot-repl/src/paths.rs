//! XDG Base Directory paths for shbot.
//!
//! | Purpose | XDG Variable | Default | shbot Path |
//! |---------|--------------|---------|------------|
//! | Config | `$XDG_CONFIG_HOME` | `~/.config` | `$XDG_CONFIG_HOME/shbot/config.toml` |
//! | History | `$XDG_DATA_HOME` | `~/.local/share` | `$XDG_DATA_HOME/shbot/history.txt` |

use std::path::PathBuf;

use directories::BaseDirs;

/// Get the data directory.
///
/// Uses `$XDG_DATA_HOME/shbot` or falls back to `~/.local/share/shbot`.
pub fn data_dir() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| home_fallback().join(".local").join("share"))
        .join("shbot")
}

/// Get the config directory.
///
/// Uses `$XDG_CONFIG_HOME/shbot` or falls back to `~/.config/shbot`.
pub fn config_dir() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| home_fallback().join(".config"))
        .join("shbot")
}

/// Config file read when `--config` is not given.
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// REPL line history.
pub fn history_file() -> PathBuf {
    data_dir().join("history.txt")
}

fn home_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}
