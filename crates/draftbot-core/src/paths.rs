//! Filesystem locations for configuration and process logs.

use anyhow::Result;
use std::path::PathBuf;

const DRAFTBOT_DIR: &str = ".draftbot";
const CONFIG_FILE: &str = "draftbot.toml";
const LOGS_DIR: &str = "logs";

/// Environment variable to override the draftbot directory.
const DRAFTBOT_DIR_ENV: &str = "DRAFTBOT_DIR";

/// Resolve the draftbot configuration directory.
/// Priority: DRAFTBOT_DIR env var > ~/.draftbot/
pub fn resolve_draftbot_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DRAFTBOT_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    dirs::home_dir()
        .map(|h| h.join(DRAFTBOT_DIR))
        .ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))
}

/// Ensure the draftbot directory exists and return its path.
pub fn ensure_draftbot_dir() -> Result<PathBuf> {
    let dir = resolve_draftbot_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Get the config file path: ~/.draftbot/draftbot.toml
pub fn config_path() -> Result<PathBuf> {
    Ok(resolve_draftbot_dir()?.join(CONFIG_FILE))
}

/// Ensure the process-log directory exists and return it: ~/.draftbot/logs
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let dir = resolve_draftbot_dir()?.join(LOGS_DIR);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
