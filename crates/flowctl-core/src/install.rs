//! Deploy a template file under a branch.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::error::{FlowError, Result};
use crate::navigation::ensure_path;
use crate::remote::FlowDirectory;
use crate::types::{GroupHandle, display_branch};

static PRE_RELEASE_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<version>(\d{2}\.\d{1,2}\.\d{1,2})(\.RC\d+|-SNAPSHOT)</version>")
        .expect("version pattern is valid")
});

/// Outcome of a successful install.
#[derive(Debug, Clone)]
pub struct Installation {
    pub group: GroupHandle,
    pub template_name: String,
    pub template_id: String,
    /// Whether the uploaded template was left in the directory
    pub template_kept: bool,
    /// Same-name templates removed before the upload
    pub replaced_templates: Vec<String>,
}

/// Rewrite pre-release bundle versions (`.RCn`, `-SNAPSHOT`) to `.RELEASE`.
pub fn bump_to_release(content: &str) -> String {
    PRE_RELEASE_VERSION
        .replace_all(content, "<version>${1}.RELEASE</version>")
        .into_owned()
}

/// Template name derived from the file stem.
pub fn template_name(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| {
            FlowError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "template path has no file name"),
            )
        })
}

/// Ensure `branch`, upload the template at `template_path` into it and
/// instantiate it at the origin. Every step is strict.
pub fn install(
    directory: &dyn FlowDirectory,
    branch: &[String],
    template_path: &Path,
    keep_template: bool,
    bump_release: bool,
) -> Result<Installation> {
    let name = template_name(template_path)?;
    let raw = std::fs::read_to_string(template_path).map_err(|e| FlowError::io(template_path, e))?;
    let content = if bump_release { bump_to_release(&raw) } else { raw };

    let group = ensure_path(directory, branch)?;
    debug!(branch = %display_branch(branch), group_id = %group.id, "branch ready");

    let mut replaced_templates = Vec::new();
    for existing in directory.templates()? {
        if existing.template.name == name {
            directory.delete_template(&existing.id)?;
            info!(template = %name, template_id = %existing.id, "deleted existing template");
            replaced_templates.push(existing.id);
        }
    }

    let file_name = template_path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{name}.xml"));
    let template_id = directory.upload_template(&group.id, &file_name, content.into_bytes())?;
    info!(template = %name, template_id = %template_id, group_id = %group.id, "uploaded template");

    directory.instantiate_template(&group.id, &template_id, 0.0, 0.0)?;
    info!(template_id = %template_id, group = %group.name, "instantiated template");

    if !keep_template {
        directory.delete_template(&template_id)?;
        debug!(template_id = %template_id, "removed uploaded template");
    }

    Ok(Installation {
        group,
        template_name: name,
        template_id,
        template_kept: keep_template,
        replaced_templates,
    })
}
