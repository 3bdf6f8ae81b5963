//! Recursive canonicalization of a live group tree.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{FlowError, Result};
use crate::navigation::resolve_path;
use crate::references::owned_by;
use crate::remote::model::{ControllerServiceEntity, Processor};
use crate::remote::{FlowDirectory, GroupFlow};
use crate::types::{GroupHandle, display_branch};

use super::codec::write_snapshot;
use super::snapshot::{
    ControllerServiceSnapshot, FlowSnapshot, ProcessorConfigSnapshot, ProcessorSnapshot,
    absent_if_empty,
};

/// Snapshot the subtree rooted at `group`.
///
/// Depth-first and pre-order: a group's processors and owned services are
/// read before its children are visited. Any remote failure aborts the walk.
pub fn canonicalize(directory: &dyn FlowDirectory, group: &GroupHandle) -> Result<FlowSnapshot> {
    let flow = directory.group_flow(&group.id)?;
    canonicalize_flow(directory, &flow)
}

/// Resolve `branch` and snapshot it. A branch that does not resolve is an error.
pub fn extract_branch(directory: &dyn FlowDirectory, branch: &[String]) -> Result<FlowSnapshot> {
    let group = resolve_path(directory, branch)?
        .ok_or_else(|| FlowError::not_found(display_branch(branch)))?;
    debug!(group_id = %group.id, name = %group.name, "extracting branch");
    canonicalize(directory, &group)
}

/// Resolve, snapshot and write `branch` to `output` (JSON for `.json`, YAML otherwise).
pub fn extract_to_file(
    directory: &dyn FlowDirectory,
    branch: &[String],
    output: &Path,
) -> Result<FlowSnapshot> {
    let snapshot = extract_branch(directory, branch)?;
    write_snapshot(output, &snapshot)?;
    info!(branch = %display_branch(branch), output = %output.display(), "extracted branch");
    Ok(snapshot)
}

fn canonicalize_flow(directory: &dyn FlowDirectory, flow: &GroupFlow) -> Result<FlowSnapshot> {
    let processors: Vec<ProcessorSnapshot> = flow
        .flow
        .processors
        .iter()
        .map(|entity| canonical_processor(&entity.component))
        .collect();

    let services = directory.controller_services(&flow.id)?;
    let controller_services: Vec<ControllerServiceSnapshot> =
        owned_by(&services, &flow.id).map(canonical_service).collect();

    let mut subgroups = Vec::with_capacity(flow.flow.process_groups.len());
    for child in &flow.flow.process_groups {
        let child_flow = directory.group_flow(&child.id)?;
        subgroups.push(canonicalize_flow(directory, &child_flow)?);
    }

    Ok(FlowSnapshot {
        name: flow.name().to_string(),
        processors: absent_if_empty(processors),
        subgroups: absent_if_empty(subgroups),
        controller_services: absent_if_empty(controller_services),
        connections: None,
    })
}

/// Properties whose descriptor identifies a controller service hold ids of
/// one particular engine instance and are dropped.
fn canonical_processor(processor: &Processor) -> ProcessorSnapshot {
    let config = &processor.config;
    let properties = config
        .properties
        .iter()
        .filter(|(key, _)| {
            !config
                .descriptors
                .get(key.as_str())
                .is_some_and(|descriptor| descriptor.identifies_service())
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    ProcessorSnapshot {
        name: processor.name.clone(),
        config: ProcessorConfigSnapshot {
            properties,
            scheduling_period: config.scheduling_period.clone(),
            scheduling_strategy: config.scheduling_strategy.clone(),
            execution_node: config.execution_node.clone(),
            penalty_duration: config.penalty_duration.clone(),
            yield_duration: config.yield_duration.clone(),
            bulletin_level: config.bulletin_level.clone(),
            run_duration_millis: config.run_duration_millis,
            concurrently_schedulable_task_count: config.concurrently_schedulable_task_count,
            comments: config.comments.clone(),
            annotation_data: config.annotation_data.clone(),
            loss_tolerant: config.loss_tolerant,
        },
        bundle: processor.bundle.clone(),
    }
}

/// Service properties are kept verbatim, including references to other services.
fn canonical_service(service: &ControllerServiceEntity) -> ControllerServiceSnapshot {
    ControllerServiceSnapshot {
        name: service.component.name.clone(),
        bundle: service.component.bundle.clone(),
        properties: service.component.properties.clone(),
    }
}
