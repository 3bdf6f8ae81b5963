//! Application context shared by the frontends.

use std::path::Path;

use anyhow::Context;

use crate::config::{Settings, SettingsOverride, SettingsStore};
use crate::remote::HttpFlowDirectory;
use crate::wait::WaitPolicy;

/// Resolved settings plus the services built from them.
///
/// The CLI creates this once and passes it to commands.
#[derive(Debug, Clone)]
pub struct AppContext {
    settings: Settings,
}

impl AppContext {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        settings.validate().context("Invalid settings")?;
        Ok(Self { settings })
    }

    /// Load settings from `config` (or the default settings file) and apply
    /// command-line overrides.
    pub fn load(config: Option<&Path>, overrides: SettingsOverride) -> anyhow::Result<Self> {
        let store = match config {
            Some(path) => SettingsStore::from_path(path.to_path_buf()),
            None => SettingsStore::from_default_dir()?,
        };
        let settings = store.load().with_context(|| {
            format!("Failed to load settings from {}", store.settings_path().display())
        })?;
        Self::new(settings.apply(overrides))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        self.settings.wait_policy()
    }

    /// Connect to the configured engine.
    pub fn directory(&self) -> anyhow::Result<HttpFlowDirectory> {
        HttpFlowDirectory::connect(&self.settings)
            .with_context(|| format!("Failed to connect to {}", self.settings.url))
    }
}
