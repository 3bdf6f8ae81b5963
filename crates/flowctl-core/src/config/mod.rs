//! Connection settings for the remote flow engine.
//!
//! Settings live in `flowctl.toml`, either at an explicit path or in the
//! platform config directory (`~/.config/flowctl/flowctl.toml` on Linux).
//! A missing file yields defaults; command-line flags are layered on top.

pub mod parser;
pub mod paths;
pub mod schema;
pub mod store;

pub use parser::{parse_settings_toml, parse_settings_toml_str, to_toml};
pub use paths::{default_config_dir, settings_path};
pub use schema::{Settings, SettingsOverride};
pub use store::SettingsStore;
