//! Settings store for loading and saving flowctl.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{Settings, parser, paths};

#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings_path: PathBuf,
}

impl SettingsStore {
    pub fn from_default_dir() -> anyhow::Result<Self> {
        let config_dir = paths::default_config_dir()?;
        Ok(Self::from_dir(&config_dir))
    }

    pub fn from_dir(config_dir: &Path) -> Self {
        Self {
            settings_path: paths::settings_path(config_dir),
        }
    }

    pub fn from_path(settings_path: PathBuf) -> Self {
        Self { settings_path }
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn load(&self) -> anyhow::Result<Settings> {
        if !self.settings_path.exists() {
            tracing::debug!(path = %self.settings_path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }
        parser::parse_settings_toml(&self.settings_path)
    }

    pub fn save(&self, settings: &Settings) -> anyhow::Result<()> {
        let content = parser::to_toml(settings).context("Failed to serialize settings to TOML")?;
        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.settings_path, content).with_context(|| {
            format!(
                "Failed to write settings file: {}",
                self.settings_path.display()
            )
        })?;
        Ok(())
    }
}
