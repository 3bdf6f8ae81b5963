//! Extract command implementation.
//!
//! Snapshots a branch and writes it to a JSON or YAML file.

use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;

use crate::extract::{SnapshotFormat, extract_to_file};
use crate::remote::FlowDirectory;
use crate::types::{display_branch, parse_branch};

/// Options for the extract command
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Group names from the root down
    pub branch: Vec<String>,
    /// Destination file; `.json` selects JSON, anything else YAML
    pub output: PathBuf,
}

impl ExtractOptions {
    pub fn new(branch: Vec<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            branch,
            output: output.into(),
        }
    }

    /// Parse a comma-separated branch such as `root,teamA`.
    pub fn parse(branch: &str, output: impl Into<PathBuf>) -> Self {
        Self::new(parse_branch(branch), output)
    }
}

/// Report from an extract operation
#[derive(Debug, Clone, Serialize)]
pub struct ExtractReport {
    pub branch: Vec<String>,
    pub output: PathBuf,
    pub format: &'static str,
    pub name: String,
    pub processors: usize,
    pub controller_services: usize,
    pub subgroups: usize,
}

#[derive(Debug, Default)]
pub struct ExtractCommand;

impl ExtractCommand {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(
        &self,
        directory: &dyn FlowDirectory,
        options: &ExtractOptions,
    ) -> anyhow::Result<ExtractReport> {
        if options.branch.is_empty() {
            anyhow::bail!("Branch must name at least the root group");
        }

        let snapshot = extract_to_file(directory, &options.branch, &options.output)
            .with_context(|| format!("Failed to extract {}", display_branch(&options.branch)))?;

        let format = match SnapshotFormat::for_path(&options.output) {
            SnapshotFormat::Json => "json",
            SnapshotFormat::Yaml => "yaml",
        };

        Ok(ExtractReport {
            branch: options.branch.clone(),
            output: options.output.clone(),
            format,
            name: snapshot.name.clone(),
            processors: snapshot.processors().len(),
            controller_services: snapshot.controller_services().len(),
            subgroups: snapshot.subgroups().len(),
        })
    }
}
