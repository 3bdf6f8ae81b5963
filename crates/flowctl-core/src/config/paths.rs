//! Settings path resolution helpers.

use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "flowctl.toml";

pub fn settings_path(config_dir: &Path) -> PathBuf {
    config_dir.join(SETTINGS_FILE)
}

/// Platform config directory for flowctl, falling back to `~/.config/flowctl`.
pub fn default_config_dir() -> anyhow::Result<PathBuf> {
    if let Some(dir) = dirs::config_dir() {
        return Ok(dir.join("flowctl"));
    }
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    Ok(home.join(".config").join("flowctl"))
}
