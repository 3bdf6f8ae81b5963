//! Wire model of the engine REST API.
//!
//! Only the fields this crate reads or must round-trip are modelled; unknown
//! fields are ignored on deserialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Bundle, RuntimeState, ServiceState};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    #[serde(default)]
    pub version: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessGroupFlowEntity {
    pub process_group_flow: GroupFlow,
}

/// One level of the live group tree.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupFlow {
    pub id: String,
    #[serde(default)]
    pub parent_group_id: Option<String>,
    #[serde(default)]
    pub breadcrumb: BreadcrumbEntity,
    #[serde(default)]
    pub flow: Flow,
}

impl GroupFlow {
    pub fn name(&self) -> &str {
        &self.breadcrumb.breadcrumb.name
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BreadcrumbEntity {
    #[serde(default)]
    pub breadcrumb: Breadcrumb,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Breadcrumb {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    #[serde(default)]
    pub process_groups: Vec<ProcessGroupEntity>,
    #[serde(default)]
    pub processors: Vec<ProcessorEntity>,
    #[serde(default)]
    pub input_ports: Vec<PortEntity>,
    #[serde(default)]
    pub output_ports: Vec<PortEntity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessGroupEntity {
    pub id: String,
    #[serde(default)]
    pub revision: Revision,
    #[serde(default)]
    pub component: ProcessGroupSummary,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessGroupSummary {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortEntity {
    pub id: String,
    #[serde(default)]
    pub revision: Revision,
    #[serde(default)]
    pub component: Port,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Port {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: Option<RuntimeState>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessorEntity {
    pub id: String,
    #[serde(default)]
    pub revision: Revision,
    #[serde(default)]
    pub component: Processor,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Processor {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub bundle: Bundle,
    #[serde(default)]
    pub state: Option<RuntimeState>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub config: ProcessorConfig,
    #[serde(default)]
    pub relationships: Vec<Value>,
    #[serde(default)]
    pub style: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub supports_batching: Option<bool>,
    #[serde(default)]
    pub supports_event_driven: Option<bool>,
    #[serde(default)]
    pub supports_parallel_processing: Option<bool>,
    #[serde(default)]
    pub persists_state: Option<bool>,
    #[serde(default)]
    pub restricted: Option<bool>,
    #[serde(default)]
    pub validation_errors: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorConfig {
    #[serde(default)]
    pub properties: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub descriptors: BTreeMap<String, PropertyDescriptor>,
    #[serde(default)]
    pub scheduling_period: Option<String>,
    #[serde(default)]
    pub scheduling_strategy: Option<String>,
    #[serde(default)]
    pub execution_node: Option<String>,
    #[serde(default)]
    pub penalty_duration: Option<String>,
    #[serde(default)]
    pub yield_duration: Option<String>,
    #[serde(default)]
    pub bulletin_level: Option<String>,
    #[serde(default)]
    pub run_duration_millis: Option<i64>,
    #[serde(default)]
    pub concurrently_schedulable_task_count: Option<i32>,
    #[serde(default)]
    pub auto_terminated_relationships: Option<Vec<String>>,
    #[serde(default)]
    pub comments: Option<String>,
    /// Advanced-UI configuration such as UpdateAttribute rules.
    #[serde(default)]
    pub annotation_data: Option<String>,
    #[serde(default)]
    pub loss_tolerant: Option<bool>,
    #[serde(default)]
    pub custom_ui_url: Option<String>,
    #[serde(default)]
    pub default_concurrent_tasks: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub default_scheduling_period: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Service type a property value points at, when the value is a service id.
    #[serde(default)]
    pub identifies_controller_service: Option<String>,
    #[serde(default)]
    pub sensitive: Option<bool>,
}

impl PropertyDescriptor {
    pub fn identifies_service(&self) -> bool {
        self.identifies_controller_service.is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ControllerServicesEntity {
    #[serde(default, rename = "controllerServices")]
    pub controller_services: Vec<ControllerServiceEntity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ControllerServiceEntity {
    pub id: String,
    #[serde(default)]
    pub revision: Revision,
    #[serde(default)]
    pub component: ControllerService,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerService {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub bundle: Bundle,
    /// Group that declares the service; descendants see it but do not own it.
    #[serde(default)]
    pub parent_group_id: Option<String>,
    #[serde(default)]
    pub state: Option<ServiceState>,
    #[serde(default)]
    pub properties: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub descriptors: BTreeMap<String, PropertyDescriptor>,
    #[serde(default)]
    pub referencing_components: Vec<ReferencingComponentEntity>,
    #[serde(default)]
    pub validation_errors: Vec<String>,
    #[serde(default)]
    pub persists_state: Option<bool>,
    #[serde(default)]
    pub restricted: Option<bool>,
}

impl ControllerServiceEntity {
    pub fn parent_group_id(&self) -> Option<&str> {
        self.component.parent_group_id.as_deref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferencingComponentEntity {
    pub id: String,
    #[serde(default)]
    pub revision: Revision,
    #[serde(default)]
    pub component: ReferencingComponent,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferencingComponent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// `Processor`, `ControllerService` or `ReportingTask`.
    #[serde(default)]
    pub reference_type: String,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplatesEntity {
    #[serde(default)]
    pub templates: Vec<TemplateEntity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateEntity {
    pub id: String,
    #[serde(default)]
    pub template: Template,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub group_id: Option<String>,
}
