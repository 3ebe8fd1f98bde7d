//! Loading [`ShellConfig`] from TOML.
//!
//! ```toml
//! placeholder = "(nothing to say)"
//! max_message_len = 500
//!
//! [variables]
//! PREFIX = "!"
//! ```

use std::path::Path;

use anyhow::{Context, Result, bail};
use shbot_kernel::ShellConfig;

use crate::paths;

/// Load the config from `path`, or from the default location.
///
/// An explicit path must exist. The default location is optional: when
/// there is no file there, the defaults are used.
pub fn load_config(path: Option<&Path>) -> Result<ShellConfig> {
    match path {
        Some(path) => read_config(path),
        None => {
            let path = paths::config_file();
            if path.is_file() {
                read_config(&path)
            } else {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(ShellConfig::default())
            }
        }
    }
}

/// Parse a config file.
pub fn read_config(path: &Path) -> Result<ShellConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: ShellConfig =
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
    tracing::debug!(path = %path.display(), variables = config.variables.len(), "loaded config");
    Ok(config)
}

/// Split a `NAME=VALUE` argument.
pub fn parse_key_value(arg: &str) -> Result<(String, String)> {
    let Some((name, value)) = arg.split_once('=') else {
        bail!("expected NAME=VALUE, got {arg:?}");
    };
    if name.is_empty() {
        bail!("empty name in {arg:?}");
    }
    Ok((name.to_string(), value.to_string()))
}
