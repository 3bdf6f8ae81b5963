//! Resolve branches of group names against the live directory.
//!
//! A branch is an ordered list of group names. The first name designates the
//! root group; every following name selects a direct child by exact name.

use tracing::{debug, info};

use crate::error::Result;
use crate::remote::{FlowDirectory, GroupFlow, ROOT_GROUP_ALIAS};
use crate::types::GroupHandle;

/// Walk `branch` from the root. Returns `None` when any step is missing.
pub fn resolve_path(directory: &dyn FlowDirectory, branch: &[String]) -> Result<Option<GroupHandle>> {
    if branch.is_empty() {
        return Ok(None);
    }

    let mut current = directory.group_flow(ROOT_GROUP_ALIAS)?;
    for name in &branch[1..] {
        match find_child(&current, name) {
            Some(child_id) => current = directory.group_flow(&child_id)?,
            None => {
                debug!(missing = %name, parent = %current.id, "branch step not found");
                return Ok(None);
            }
        }
    }

    Ok(Some(GroupHandle::new(current.id.clone(), current.name())))
}

/// Like [`resolve_path`], creating missing child groups along the way.
pub fn ensure_path(directory: &dyn FlowDirectory, branch: &[String]) -> Result<GroupHandle> {
    let mut current = directory.group_flow(ROOT_GROUP_ALIAS)?;
    for name in branch.iter().skip(1) {
        let child_id = match find_child(&current, name) {
            Some(id) => id,
            None => {
                let created = directory.create_group(&current.id, name)?;
                info!(group = %name, group_id = %created.id, parent = %current.id, "created process group");
                created.id
            }
        };
        current = directory.group_flow(&child_id)?;
    }

    Ok(GroupHandle::new(current.id.clone(), current.name()))
}

fn find_child(group: &GroupFlow, name: &str) -> Option<String> {
    group
        .flow
        .process_groups
        .iter()
        .find(|child| child.component.name == name)
        .map(|child| child.id.clone())
}
