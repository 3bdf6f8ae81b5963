#![allow(dead_code)]

//! In-memory flow directory shared by the integration tests.
//!
//! State transitions are asynchronous like on a live engine: a set call
//! schedules the target state, which becomes visible after a configurable
//! number of polls. Every call is recorded in order.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use flowctl_core::error::{FlowError, Result};
use flowctl_core::remote::model::{
    Breadcrumb, BreadcrumbEntity, ControllerService, Flow, PortEntity, ProcessGroupEntity,
    ProcessGroupSummary, Processor, ProcessorConfig, PropertyDescriptor, ReferencingComponent,
    Template,
};
use flowctl_core::remote::{
    ControllerServiceEntity, FlowDirectory, GroupFlow, ProcessorEntity,
    ReferencingComponentEntity, ROOT_GROUP_ALIAS, TemplateEntity,
};
use flowctl_core::types::{Bundle, ComponentRef, GroupHandle, RuntimeState, ServiceState};
use flowctl_core::wait::WaitPolicy;

pub const ROOT_ID: &str = "root-id";
pub const ROOT_NAME: &str = "NiFi Flow";

pub fn quick_policy() -> WaitPolicy {
    WaitPolicy::new(Duration::from_millis(60), Duration::from_millis(2))
}

pub fn branch(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GroupFlow(String),
    ControllerServices(String),
    Referencers(String),
    RuntimeState(String),
    SetRuntimeState(String, RuntimeState),
    ServiceState(String),
    SetServiceState(String, ServiceState),
    Templates,
    DeleteTemplate(String),
    DeleteGroup(String),
    CreateGroup(String, String),
    UploadTemplate(String, String),
    InstantiateTemplate(String, String),
}

#[derive(Debug, Clone)]
struct FakeGroup {
    name: String,
    parent: Option<String>,
    children: Vec<String>,
    processors: Vec<ProcessorEntity>,
    input_ports: Vec<String>,
    output_ports: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
struct Transition<S> {
    current: S,
    pending: Option<(S, usize)>,
}

impl<S: Copy> Transition<S> {
    fn at(current: S) -> Self {
        Self {
            current,
            pending: None,
        }
    }

    fn observe(&mut self) -> S {
        if let Some((target, polls)) = self.pending {
            if polls == 0 {
                self.current = target;
                self.pending = None;
            } else {
                self.pending = Some((target, polls - 1));
            }
        }
        self.current
    }
}

#[derive(Debug, Default)]
struct State {
    groups: BTreeMap<String, FakeGroup>,
    services: Vec<ControllerServiceEntity>,
    referencers: HashMap<String, Vec<ReferencingComponentEntity>>,
    runtime: HashMap<String, Transition<RuntimeState>>,
    service_states: HashMap<String, Transition<ServiceState>>,
    lag: HashMap<String, usize>,
    stuck: HashSet<String>,
    failures: HashSet<(&'static str, String)>,
    templates: Vec<TemplateEntity>,
    uploads: Vec<(String, String, String)>,
    calls: Vec<Call>,
    next_id: usize,
}

pub struct FakeFlowDirectory {
    state: RefCell<State>,
}

impl Default for FakeFlowDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeFlowDirectory {
    pub fn new() -> Self {
        let mut state = State::default();
        state.groups.insert(
            ROOT_ID.to_string(),
            FakeGroup {
                name: ROOT_NAME.to_string(),
                parent: None,
                children: Vec::new(),
                processors: Vec::new(),
                input_ports: Vec::new(),
                output_ports: Vec::new(),
            },
        );
        Self {
            state: RefCell::new(state),
        }
    }

    pub fn add_group(&self, parent_id: &str, id: &str, name: &str) -> &Self {
        let mut state = self.state.borrow_mut();
        state.groups.insert(
            id.to_string(),
            FakeGroup {
                name: name.to_string(),
                parent: Some(parent_id.to_string()),
                children: Vec::new(),
                processors: Vec::new(),
                input_ports: Vec::new(),
                output_ports: Vec::new(),
            },
        );
        if let Some(parent) = state.groups.get_mut(parent_id) {
            parent.children.push(id.to_string());
        }
        self
    }

    pub fn add_processor(&self, group_id: &str, processor: ProcessorEntity) -> &Self {
        let mut state = self.state.borrow_mut();
        let initial = processor.component.state.unwrap_or(RuntimeState::Running);
        state
            .runtime
            .insert(processor.id.clone(), Transition::at(initial));
        if let Some(group) = state.groups.get_mut(group_id) {
            group.processors.push(processor);
        }
        self
    }

    pub fn add_input_port(&self, group_id: &str, id: &str) -> &Self {
        let mut state = self.state.borrow_mut();
        state
            .runtime
            .insert(id.to_string(), Transition::at(RuntimeState::Running));
        if let Some(group) = state.groups.get_mut(group_id) {
            group.input_ports.push(id.to_string());
        }
        self
    }

    pub fn add_service(&self, group_id: &str, id: &str, name: &str) -> &Self {
        let mut state = self.state.borrow_mut();
        state.services.push(service(id, name, group_id));
        state
            .service_states
            .insert(id.to_string(), Transition::at(ServiceState::Enabled));
        self
    }

    /// Register `component_id` as referencing `service_id`. Reporting tasks
    /// start out running; services start out enabled.
    pub fn add_referencer(&self, service_id: &str, component_id: &str, kind: &str) -> &Self {
        let mut state = self.state.borrow_mut();
        match kind {
            "ReportingTask" => {
                state
                    .runtime
                    .entry(component_id.to_string())
                    .or_insert(Transition::at(RuntimeState::Running));
            }
            "ControllerService" => {
                state
                    .service_states
                    .entry(component_id.to_string())
                    .or_insert(Transition::at(ServiceState::Enabled));
            }
            _ => {}
        }
        state
            .referencers
            .entry(service_id.to_string())
            .or_default()
            .push(ReferencingComponentEntity {
                id: component_id.to_string(),
                component: ReferencingComponent {
                    id: component_id.to_string(),
                    name: component_id.to_string(),
                    reference_type: kind.to_string(),
                    state: None,
                },
                ..ReferencingComponentEntity::default()
            });
        self
    }

    pub fn add_template(&self, id: &str, name: &str, group_id: &str) -> &Self {
        self.state.borrow_mut().templates.push(template(id, name, group_id));
        self
    }

    /// State changes of `id` become visible only after `polls` polls.
    pub fn lag(&self, id: &str, polls: usize) -> &Self {
        self.state.borrow_mut().lag.insert(id.to_string(), polls);
        self
    }

    /// `id` accepts state changes but never reaches them.
    pub fn stick(&self, id: &str) -> &Self {
        self.state.borrow_mut().stuck.insert(id.to_string());
        self
    }

    /// Make `operation` on `id` fail with a remote access error.
    pub fn fail(&self, operation: &'static str, id: &str) -> &Self {
        self.state
            .borrow_mut()
            .failures
            .insert((operation, id.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn position(&self, call: &Call) -> Option<usize> {
        self.state.borrow().calls.iter().position(|c| c == call)
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| predicate(c)).count()
    }

    pub fn has_group(&self, id: &str) -> bool {
        self.state.borrow().groups.contains_key(id)
    }

    pub fn group_named(&self, parent_id: &str, name: &str) -> Option<String> {
        let state = self.state.borrow();
        state.groups.get(parent_id).and_then(|parent| {
            parent
                .children
                .iter()
                .find(|child| state.groups.get(*child).is_some_and(|g| g.name == name))
                .cloned()
        })
    }

    pub fn template_ids(&self) -> Vec<String> {
        self.state.borrow().templates.iter().map(|t| t.id.clone()).collect()
    }

    /// `(group_id, file_name, content)` of every upload.
    pub fn uploads(&self) -> Vec<(String, String, String)> {
        self.state.borrow().uploads.clone()
    }

    pub fn current_runtime(&self, id: &str) -> Option<RuntimeState> {
        self.state.borrow().runtime.get(id).map(|t| t.current)
    }

    pub fn current_service_state(&self, id: &str) -> Option<ServiceState> {
        self.state.borrow().service_states.get(id).map(|t| t.current)
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }

    fn check(&self, operation: &'static str, id: &str) -> Result<()> {
        if self
            .state
            .borrow()
            .failures
            .contains(&(operation, id.to_string()))
        {
            return Err(remote_error(operation, id, 500, "injected failure"));
        }
        Ok(())
    }

    fn resolve_id(id: &str) -> &str {
        if id == ROOT_GROUP_ALIAS { ROOT_ID } else { id }
    }

    fn subtree(state: &State, group_id: &str) -> Vec<String> {
        let mut ids = vec![group_id.to_string()];
        let mut index = 0;
        while index < ids.len() {
            if let Some(group) = state.groups.get(&ids[index]) {
                ids.extend(group.children.iter().cloned());
            }
            index += 1;
        }
        ids
    }

    fn schedule_runtime(state: &mut State, id: &str, target: RuntimeState) {
        if state.stuck.contains(id) {
            return;
        }
        let polls = state.lag.get(id).copied().unwrap_or(0);
        if let Some(transition) = state.runtime.get_mut(id) {
            transition.pending = Some((target, polls));
        }
    }
}

impl FlowDirectory for FakeFlowDirectory {
    fn group_flow(&self, group_id: &str) -> Result<GroupFlow> {
        self.record(Call::GroupFlow(group_id.to_string()));
        self.check("group_flow", group_id)?;
        let id = Self::resolve_id(group_id);
        let state = self.state.borrow();
        let group = state
            .groups
            .get(id)
            .ok_or_else(|| FlowError::not_found(format!("process group {group_id}")))?;

        let process_groups = group
            .children
            .iter()
            .filter_map(|child| state.groups.get(child).map(|g| (child, g)))
            .map(|(child, g)| ProcessGroupEntity {
                id: child.clone(),
                component: ProcessGroupSummary {
                    id: child.clone(),
                    name: g.name.clone(),
                },
                ..ProcessGroupEntity::default()
            })
            .collect();

        Ok(GroupFlow {
            id: id.to_string(),
            parent_group_id: group.parent.clone(),
            breadcrumb: BreadcrumbEntity {
                breadcrumb: Breadcrumb {
                    id: id.to_string(),
                    name: group.name.clone(),
                },
            },
            flow: Flow {
                process_groups,
                processors: group.processors.clone(),
                input_ports: group
                    .input_ports
                    .iter()
                    .map(|port| PortEntity {
                        id: port.clone(),
                        ..Default::default()
                    })
                    .collect(),
                output_ports: group
                    .output_ports
                    .iter()
                    .map(|port| PortEntity {
                        id: port.clone(),
                        ..Default::default()
                    })
                    .collect(),
            },
        })
    }

    fn controller_services(&self, group_id: &str) -> Result<Vec<ControllerServiceEntity>> {
        self.record(Call::ControllerServices(group_id.to_string()));
        self.check("controller_services", group_id)?;
        let state = self.state.borrow();

        // Ancestors' services are visible too, like on the engine.
        let mut scope = Vec::new();
        let mut cursor = Some(Self::resolve_id(group_id).to_string());
        while let Some(id) = cursor {
            cursor = state.groups.get(&id).and_then(|g| g.parent.clone());
            scope.push(id);
        }

        Ok(state
            .services
            .iter()
            .filter(|s| s.parent_group_id().is_some_and(|p| scope.iter().any(|id| id == p)))
            .cloned()
            .collect())
    }

    fn referencers(&self, service_id: &str) -> Result<Vec<ReferencingComponentEntity>> {
        self.record(Call::Referencers(service_id.to_string()));
        self.check("referencers", service_id)?;
        Ok(self
            .state
            .borrow()
            .referencers
            .get(service_id)
            .cloned()
            .unwrap_or_default())
    }

    fn runtime_state(&self, component: &ComponentRef) -> Result<RuntimeState> {
        self.record(Call::RuntimeState(component.id().to_string()));
        self.check("runtime_state", component.id())?;
        let mut state = self.state.borrow_mut();
        state
            .runtime
            .get_mut(component.id())
            .map(Transition::observe)
            .ok_or_else(|| FlowError::not_found(component.to_string()))
    }

    fn set_runtime_state(&self, component: &ComponentRef, target: RuntimeState) -> Result<()> {
        self.record(Call::SetRuntimeState(component.id().to_string(), target));
        self.check("set_runtime_state", component.id())?;
        let mut state = self.state.borrow_mut();
        match component {
            ComponentRef::Group(id) => {
                let id = Self::resolve_id(id);
                let mut runnable = Vec::new();
                for group_id in Self::subtree(&state, id) {
                    if let Some(group) = state.groups.get(&group_id) {
                        runnable.extend(group.processors.iter().map(|p| p.id.clone()));
                        runnable.extend(group.input_ports.iter().cloned());
                        runnable.extend(group.output_ports.iter().cloned());
                    }
                }
                for component_id in runnable {
                    Self::schedule_runtime(&mut state, &component_id, target);
                }
            }
            other => {
                if !state.runtime.contains_key(other.id()) {
                    return Err(FlowError::not_found(other.to_string()));
                }
                Self::schedule_runtime(&mut state, other.id(), target);
            }
        }
        Ok(())
    }

    fn controller_service_state(&self, service_id: &str) -> Result<ServiceState> {
        self.record(Call::ServiceState(service_id.to_string()));
        self.check("controller_service_state", service_id)?;
        let mut state = self.state.borrow_mut();
        state
            .service_states
            .get_mut(service_id)
            .map(Transition::observe)
            .ok_or_else(|| FlowError::not_found(format!("controller service {service_id}")))
    }

    fn set_controller_service_state(&self, service_id: &str, target: ServiceState) -> Result<()> {
        self.record(Call::SetServiceState(service_id.to_string(), target));
        self.check("set_controller_service_state", service_id)?;
        let mut state = self.state.borrow_mut();

        // The engine refuses to disable a service while a referencer is still active.
        if target == ServiceState::Disabled {
            let active = state
                .referencers
                .get(service_id)
                .into_iter()
                .flatten()
                .any(|r| match r.component.reference_type.as_str() {
                    "ControllerService" => state
                        .service_states
                        .get(&r.id)
                        .is_some_and(|t| t.current != ServiceState::Disabled),
                    _ => state
                        .runtime
                        .get(&r.id)
                        .is_some_and(|t| !t.current.satisfies(RuntimeState::Stopped)),
                });
            if active {
                return Err(remote_error(
                    "set_controller_service_state",
                    service_id,
                    409,
                    "referencing components are still active",
                ));
            }
        }

        if state.stuck.contains(service_id) {
            return Ok(());
        }
        let polls = state.lag.get(service_id).copied().unwrap_or(0);
        let transition = state
            .service_states
            .get_mut(service_id)
            .ok_or_else(|| FlowError::not_found(format!("controller service {service_id}")))?;
        transition.pending = Some((target, polls));
        Ok(())
    }

    fn templates(&self) -> Result<Vec<TemplateEntity>> {
        self.record(Call::Templates);
        self.check("templates", "")?;
        Ok(self.state.borrow().templates.clone())
    }

    fn delete_template(&self, template_id: &str) -> Result<()> {
        self.record(Call::DeleteTemplate(template_id.to_string()));
        self.check("delete_template", template_id)?;
        let mut state = self.state.borrow_mut();
        let before = state.templates.len();
        state.templates.retain(|t| t.id != template_id);
        if state.templates.len() == before {
            return Err(FlowError::not_found(format!("template {template_id}")));
        }
        Ok(())
    }

    fn delete_group(&self, group_id: &str) -> Result<()> {
        self.record(Call::DeleteGroup(group_id.to_string()));
        self.check("delete_group", group_id)?;
        let mut state = self.state.borrow_mut();
        let subtree = Self::subtree(&state, group_id);

        let running = subtree.iter().filter_map(|id| state.groups.get(id)).any(|g| {
            g.processors.iter().any(|p| {
                state
                    .runtime
                    .get(&p.id)
                    .is_some_and(|t| !t.current.satisfies(RuntimeState::Stopped))
            })
        });
        let enabled = state.services.iter().any(|s| {
            s.parent_group_id().is_some_and(|p| subtree.iter().any(|id| id == p))
                && state
                    .service_states
                    .get(&s.id)
                    .is_some_and(|t| t.current != ServiceState::Disabled)
        });
        if running || enabled {
            return Err(remote_error("delete_group", group_id, 409, "group is not idle"));
        }

        let parent = state.groups.get(group_id).and_then(|g| g.parent.clone());
        if let Some(parent) = parent.and_then(|p| state.groups.get_mut(&p)) {
            parent.children.retain(|child| child != group_id);
        }
        for id in &subtree {
            state.groups.remove(id);
        }
        Ok(())
    }

    fn create_group(&self, parent_id: &str, name: &str) -> Result<GroupHandle> {
        self.record(Call::CreateGroup(parent_id.to_string(), name.to_string()));
        self.check("create_group", parent_id)?;
        let id = {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            format!("created-{}", state.next_id)
        };
        self.add_group(Self::resolve_id(parent_id), &id, name);
        Ok(GroupHandle::new(id, name))
    }

    fn upload_template(&self, group_id: &str, file_name: &str, content: Vec<u8>) -> Result<String> {
        self.record(Call::UploadTemplate(group_id.to_string(), file_name.to_string()));
        self.check("upload_template", group_id)?;
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = format!("tpl-{}", state.next_id);
        let name = file_name.trim_end_matches(".xml").to_string();
        state.templates.push(template(&id, &name, group_id));
        state.uploads.push((
            group_id.to_string(),
            file_name.to_string(),
            String::from_utf8_lossy(&content).into_owned(),
        ));
        Ok(id)
    }

    fn instantiate_template(
        &self,
        group_id: &str,
        template_id: &str,
        _origin_x: f64,
        _origin_y: f64,
    ) -> Result<()> {
        self.record(Call::InstantiateTemplate(
            group_id.to_string(),
            template_id.to_string(),
        ));
        self.check("instantiate_template", group_id)
    }
}

fn remote_error(operation: &str, id: &str, status: u16, message: &str) -> FlowError {
    FlowError::RemoteAccess {
        method: operation.to_string(),
        url: format!("fake://{id}"),
        status: Some(status),
        message: message.to_string(),
    }
}

pub fn service(id: &str, name: &str, group_id: &str) -> ControllerServiceEntity {
    ControllerServiceEntity {
        id: id.to_string(),
        component: ControllerService {
            id: id.to_string(),
            name: name.to_string(),
            kind: Some("org.apache.nifi.dbcp.DBCPConnectionPool".to_string()),
            bundle: Bundle {
                group: "org.apache.nifi".to_string(),
                artifact: "nifi-dbcp-service-nar".to_string(),
                version: "1.9.2".to_string(),
            },
            parent_group_id: Some(group_id.to_string()),
            properties: BTreeMap::from([(
                "Database Connection URL".to_string(),
                Some("jdbc:h2:mem:test".to_string()),
            )]),
            ..ControllerService::default()
        },
        ..ControllerServiceEntity::default()
    }
}

/// A running processor with one plain property and one service reference.
pub fn processor(id: &str, name: &str) -> ProcessorEntity {
    ProcessorEntity {
        id: id.to_string(),
        component: Processor {
            id: id.to_string(),
            name: name.to_string(),
            kind: Some("org.apache.nifi.processors.standard.ExecuteSQL".to_string()),
            bundle: Bundle {
                group: "org.apache.nifi".to_string(),
                artifact: "nifi-standard-nar".to_string(),
                version: "1.9.2".to_string(),
            },
            state: Some(RuntimeState::Running),
            config: ProcessorConfig {
                properties: BTreeMap::from([
                    ("SQL select query".to_string(), Some("select 1".to_string())),
                    ("Database Connection Pooling Service".to_string(), Some("c1".to_string())),
                ]),
                descriptors: BTreeMap::from([(
                    "Database Connection Pooling Service".to_string(),
                    PropertyDescriptor {
                        name: "Database Connection Pooling Service".to_string(),
                        identifies_controller_service: Some(
                            "org.apache.nifi.dbcp.DBCPService".to_string(),
                        ),
                        ..PropertyDescriptor::default()
                    },
                )]),
                scheduling_period: Some("0 sec".to_string()),
                scheduling_strategy: Some("TIMER_DRIVEN".to_string()),
                ..ProcessorConfig::default()
            },
            ..Processor::default()
        },
        ..ProcessorEntity::default()
    }
}

pub fn template(id: &str, name: &str, group_id: &str) -> TemplateEntity {
    TemplateEntity {
        id: id.to_string(),
        template: Template {
            id: id.to_string(),
            name: name.to_string(),
            group_id: Some(group_id.to_string()),
        },
    }
}
