//! Controller service ownership and reference lookups.

use crate::error::Result;
use crate::remote::{ControllerServiceEntity, FlowDirectory, ReferencingComponentEntity};

const PROCESSOR: &str = "Processor";
const REPORTING_TASK: &str = "ReportingTask";
const CONTROLLER_SERVICE: &str = "ControllerService";

/// Components referencing one controller service, split by kind.
#[derive(Debug, Clone, Default)]
pub struct Referencers {
    pub processors: Vec<ReferencingComponentEntity>,
    pub reporting_tasks: Vec<ReferencingComponentEntity>,
    pub controller_services: Vec<ReferencingComponentEntity>,
}

impl Referencers {
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
            && self.reporting_tasks.is_empty()
            && self.controller_services.is_empty()
    }

    fn push(&mut self, component: ReferencingComponentEntity) {
        match component.component.reference_type.as_str() {
            PROCESSOR => self.processors.push(component),
            REPORTING_TASK => self.reporting_tasks.push(component),
            CONTROLLER_SERVICE => self.controller_services.push(component),
            other => tracing::debug!(
                component_id = %component.id,
                reference_type = %other,
                "ignoring unknown referencing component kind"
            ),
        }
    }
}

/// Live referencers of `service_id`. Empty categories are not an error.
pub fn referencers_of(directory: &dyn FlowDirectory, service_id: &str) -> Result<Referencers> {
    let mut result = Referencers::default();
    for component in directory.referencers(service_id)? {
        result.push(component);
    }
    Ok(result)
}

/// Services declared in exactly `group_id`; ancestors' services are excluded.
pub fn owned_by<'a>(
    services: &'a [ControllerServiceEntity],
    group_id: &'a str,
) -> impl Iterator<Item = &'a ControllerServiceEntity> + 'a {
    services
        .iter()
        .filter(move |service| service.parent_group_id() == Some(group_id))
}
