//! TOML parser with helpful error messages

use super::schema::Settings;
use anyhow::{Context, Result};
use std::path::Path;

/// Parse flowctl.toml with detailed error messages
pub fn parse_settings_toml(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

    parse_settings_toml_str(&content)
        .with_context(|| format!("Failed to parse settings file: {}", path.display()))
}

/// Parse flowctl.toml content from string
pub fn parse_settings_toml_str(content: &str) -> Result<Settings> {
    let settings: Settings =
        toml::from_str(content).map_err(|e| enhance_toml_error(e, content))?;

    settings.validate()?;

    Ok(settings)
}

fn enhance_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let error_msg = error.to_string();

    let line_hint = error
        .span()
        .and_then(|span| content.get(..span.start))
        .map(|prefix| prefix.matches('\n').count() + 1);

    if let Some(line_num) = line_hint {
        let context = get_line_context(content, line_num);
        anyhow::anyhow!(
            "TOML parsing error at line {}:\n{}\n\nError: {}",
            line_num,
            context,
            error_msg
        )
    } else {
        anyhow::anyhow!("TOML parsing error: {}", error_msg)
    }
}

fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 2).min(lines.len());

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize settings to a TOML string
pub fn to_toml(settings: &Settings) -> Result<String> {
    toml::to_string_pretty(settings).with_context(|| "Failed to serialize settings to TOML")
}
