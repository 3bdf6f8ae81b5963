//! Environment-agnostic description of a group tree.
//!
//! Nothing in here may identify the source deployment: no ids, positions,
//! revisions or validation state. A snapshot must replay against any engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Bundle;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSnapshot {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processors: Option<Vec<ProcessorSnapshot>>,

    /// Keyed `groupProcessorsEntity` so existing configuration files keep loading.
    #[serde(
        default,
        rename = "groupProcessorsEntity",
        alias = "subgroups",
        skip_serializing_if = "Option::is_none"
    )]
    pub subgroups: Option<Vec<FlowSnapshot>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller_services: Option<Vec<ControllerServiceSnapshot>>,

    /// Only ever filled by callers; extraction does not derive wiring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<ConnectionPort>>,
}

impl FlowSnapshot {
    pub fn processors(&self) -> &[ProcessorSnapshot] {
        self.processors.as_deref().unwrap_or_default()
    }

    pub fn subgroups(&self) -> &[FlowSnapshot] {
        self.subgroups.as_deref().unwrap_or_default()
    }

    pub fn controller_services(&self) -> &[ControllerServiceSnapshot] {
        self.controller_services.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessorSnapshot {
    pub name: String,
    #[serde(default)]
    pub config: ProcessorConfigSnapshot,
    #[serde(default)]
    pub bundle: Bundle,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorConfigSnapshot {
    #[serde(default)]
    pub properties: BTreeMap<String, Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduling_period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduling_strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yield_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bulletin_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_duration_millis: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrently_schedulable_task_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss_tolerant: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerServiceSnapshot {
    pub name: String,
    #[serde(default)]
    pub bundle: Bundle,
    #[serde(default)]
    pub properties: BTreeMap<String, Option<String>>,
}

/// Port-to-port wiring between two components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionPort {
    pub source: String,
    pub destination: String,
}

pub(crate) fn absent_if_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() { None } else { Some(items) }
}
