//! Access to the remote flow directory.
//!
//! [`FlowDirectory`] is the capability every operation in this crate is
//! written against. [`HttpFlowDirectory`] talks to a live engine; tests
//! substitute in-memory fakes.

pub mod http;
pub mod model;

pub use http::HttpFlowDirectory;
pub use model::{
    ControllerServiceEntity, GroupFlow, ProcessorEntity, ReferencingComponentEntity,
    TemplateEntity,
};

use crate::error::Result;
use crate::types::{ComponentRef, GroupHandle, RuntimeState, ServiceState};

/// Alias accepted by the engine for the top-level group.
pub const ROOT_GROUP_ALIAS: &str = "root";

/// Blocking operations against the remote flow directory.
///
/// State setters return once the request is accepted; the transition itself
/// completes asynchronously and must be observed through the state getters.
/// Implementations fetch the current revision before every mutating call.
pub trait FlowDirectory {
    /// Name, direct processors, ports and child groups of a group.
    fn group_flow(&self, group_id: &str) -> Result<GroupFlow>;

    /// Controller services visible from a group, including inherited ones.
    fn controller_services(&self, group_id: &str) -> Result<Vec<ControllerServiceEntity>>;

    /// Components currently referencing a controller service.
    fn referencers(&self, service_id: &str) -> Result<Vec<ReferencingComponentEntity>>;

    fn runtime_state(&self, component: &ComponentRef) -> Result<RuntimeState>;

    fn set_runtime_state(&self, component: &ComponentRef, target: RuntimeState) -> Result<()>;

    fn controller_service_state(&self, service_id: &str) -> Result<ServiceState>;

    fn set_controller_service_state(&self, service_id: &str, target: ServiceState) -> Result<()>;

    fn templates(&self) -> Result<Vec<TemplateEntity>>;

    fn delete_template(&self, template_id: &str) -> Result<()>;

    fn delete_group(&self, group_id: &str) -> Result<()>;

    fn create_group(&self, parent_id: &str, name: &str) -> Result<GroupHandle>;

    /// Upload template XML into a group, returning the new template id.
    fn upload_template(&self, group_id: &str, file_name: &str, content: Vec<u8>) -> Result<String>;

    fn instantiate_template(
        &self,
        group_id: &str,
        template_id: &str,
        origin_x: f64,
        origin_y: f64,
    ) -> Result<()>;

    /// Templates declared in exactly this group.
    fn templates_in_group(&self, group_id: &str) -> Result<Vec<TemplateEntity>> {
        Ok(self
            .templates()?
            .into_iter()
            .filter(|t| t.template.group_id.as_deref() == Some(group_id))
            .collect())
    }
}
