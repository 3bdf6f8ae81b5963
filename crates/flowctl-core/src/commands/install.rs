//! Install command implementation.
//!
//! Uploads a template file under a branch, creating missing groups.

use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;

use crate::install::install;
use crate::remote::FlowDirectory;
use crate::types::{display_branch, parse_branch};

/// Options for the install command
#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub branch: Vec<String>,
    pub template: PathBuf,
    /// Leave the uploaded template in the directory after instantiation
    pub keep_template: bool,
    /// Rewrite pre-release bundle versions to `.RELEASE` before upload
    pub bump_release: bool,
}

impl InstallOptions {
    pub fn new(branch: Vec<String>, template: impl Into<PathBuf>) -> Self {
        Self {
            branch,
            template: template.into(),
            keep_template: false,
            bump_release: false,
        }
    }

    pub fn parse(branch: &str, template: impl Into<PathBuf>) -> Self {
        Self::new(parse_branch(branch), template)
    }

    pub fn with_keep_template(mut self, keep: bool) -> Self {
        self.keep_template = keep;
        self
    }

    pub fn with_bump_release(mut self, bump: bool) -> Self {
        self.bump_release = bump;
        self
    }
}

/// Report from an install operation
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub branch: Vec<String>,
    pub group_id: String,
    pub template_name: String,
    pub template_id: String,
    pub template_kept: bool,
    pub replaced_templates: Vec<String>,
}

#[derive(Debug, Default)]
pub struct InstallCommand;

impl InstallCommand {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(
        &self,
        directory: &dyn FlowDirectory,
        options: &InstallOptions,
    ) -> anyhow::Result<InstallReport> {
        if options.branch.is_empty() {
            anyhow::bail!("Branch must name at least the root group");
        }

        let installation = install(
            directory,
            &options.branch,
            &options.template,
            options.keep_template,
            options.bump_release,
        )
        .with_context(|| {
            format!(
                "Failed to install {} into {}",
                options.template.display(),
                display_branch(&options.branch)
            )
        })?;

        Ok(InstallReport {
            branch: options.branch.clone(),
            group_id: installation.group.id,
            template_name: installation.template_name,
            template_id: installation.template_id,
            template_kept: installation.template_kept,
            replaced_templates: installation.replaced_templates,
        })
    }
}
