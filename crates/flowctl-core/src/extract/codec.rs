//! JSON and YAML encoding of flow snapshots.

use std::path::Path;

use crate::error::{FlowError, Result};

use super::snapshot::FlowSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    /// `.json` selects JSON; every other extension selects YAML.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SnapshotFormat::Json,
            _ => SnapshotFormat::Yaml,
        }
    }
}

pub fn to_string(snapshot: &FlowSnapshot, format: SnapshotFormat) -> Result<String> {
    match format {
        SnapshotFormat::Json => Ok(serde_json::to_string_pretty(snapshot)?),
        SnapshotFormat::Yaml => Ok(serde_yaml::to_string(snapshot)?),
    }
}

pub fn from_str(content: &str, format: SnapshotFormat) -> Result<FlowSnapshot> {
    match format {
        SnapshotFormat::Json => Ok(serde_json::from_str(content)?),
        SnapshotFormat::Yaml => Ok(serde_yaml::from_str(content)?),
    }
}

pub fn write_snapshot(path: &Path, snapshot: &FlowSnapshot) -> Result<()> {
    let content = to_string(snapshot, SnapshotFormat::for_path(path))?;
    tracing::debug!(path = %path.display(), "writing snapshot");
    std::fs::write(path, content).map_err(|e| FlowError::io(path, e))
}

pub fn read_snapshot(path: &Path) -> Result<FlowSnapshot> {
    let content = std::fs::read_to_string(path).map_err(|e| FlowError::io(path, e))?;
    from_str(&content, SnapshotFormat::for_path(path))
}
