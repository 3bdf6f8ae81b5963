//! Ordered teardown of a resolved group.
//!
//! Processors must stop before the services they reference can be disabled,
//! referencing services must be disabled before the services they depend on,
//! and the group can only be deleted once nothing inside it is active.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::error::{FlowError, Result};
use crate::navigation::resolve_path;
use crate::references::{owned_by, referencers_of};
use crate::remote::FlowDirectory;
use crate::types::{ComponentRef, GroupHandle, RuntimeState, ServiceState, display_branch};
use crate::wait::{WaitPolicy, await_runtime_state, await_service_state};

use super::report::{TeardownFailure, TeardownReport, TeardownStep};

#[derive(Debug)]
pub enum UndeployOutcome {
    /// The branch does not exist; nothing was touched.
    NotFound,
    Removed(TeardownReport),
}

/// A failed sub-step while releasing one controller service.
struct StepError {
    step: TeardownStep,
    component_id: String,
    error: FlowError,
}

impl StepError {
    fn at(step: TeardownStep, component_id: &str) -> impl FnOnce(FlowError) -> StepError + '_ {
        move |error| StepError {
            step,
            component_id: component_id.to_string(),
            error,
        }
    }
}

pub struct TeardownOrchestrator<'a> {
    directory: &'a dyn FlowDirectory,
    policy: WaitPolicy,
}

impl<'a> TeardownOrchestrator<'a> {
    pub fn new(directory: &'a dyn FlowDirectory, policy: WaitPolicy) -> Self {
        Self { directory, policy }
    }

    /// Tear down `branch`. A branch that does not resolve is logged and left alone.
    pub fn undeploy(&self, branch: &[String]) -> Result<UndeployOutcome, TeardownFailure> {
        let label = display_branch(branch);
        let group = match resolve_path(self.directory, branch) {
            Ok(Some(group)) => group,
            Ok(None) => {
                warn!(branch = %label, "cannot find branch, nothing to undeploy");
                return Ok(UndeployOutcome::NotFound);
            }
            Err(error) => return Err(TeardownFailure::new(TeardownReport::new("", label), error)),
        };

        self.teardown(&group).map(UndeployOutcome::Removed)
    }

    /// Stop, disable and delete `group`.
    ///
    /// Template deletion and controller service disabling are best-effort:
    /// failures are recorded in the report and logged. Stopping the group and
    /// deleting it are strict and end the run with a [`TeardownFailure`].
    pub fn teardown(&self, group: &GroupHandle) -> Result<TeardownReport, TeardownFailure> {
        let mut report = TeardownReport::new(&group.id, &group.name);

        if let Err(error) = self.stop_group(&group.id) {
            report.failed(TeardownStep::StopGroup, &group.id, &error);
            return Err(TeardownFailure::new(report, error));
        }
        report.completed(TeardownStep::StopGroup, &group.id);
        info!(group = %group.name, group_id = %group.id, "group stopped");

        if let Err(error) = self.delete_templates(&group.id, &mut report) {
            return Err(TeardownFailure::new(report, error));
        }

        if let Err(error) = self.disable_owned_services(&group.id, &mut report) {
            return Err(TeardownFailure::new(report, error));
        }

        if let Err(error) = self.directory.delete_group(&group.id) {
            report.failed(TeardownStep::DeleteGroup, &group.id, &error);
            return Err(TeardownFailure::new(report, error));
        }
        report.completed(TeardownStep::DeleteGroup, &group.id);
        info!(group = %group.name, group_id = %group.id, "group deleted");

        Ok(report)
    }

    /// Schedule the whole subtree to stop, then wait for every runnable component in it.
    fn stop_group(&self, group_id: &str) -> Result<()> {
        self.directory
            .set_runtime_state(&ComponentRef::Group(group_id.to_string()), RuntimeState::Stopped)?;

        let mut pending = vec![group_id.to_string()];
        while let Some(current) = pending.pop() {
            let flow = self.directory.group_flow(&current)?;
            let components = flow
                .flow
                .processors
                .iter()
                .map(|p| ComponentRef::Processor(p.id.clone()))
                .chain(flow.flow.input_ports.iter().map(|p| ComponentRef::InputPort(p.id.clone())))
                .chain(flow.flow.output_ports.iter().map(|p| ComponentRef::OutputPort(p.id.clone())));
            for component in components {
                await_runtime_state(self.directory, &component, RuntimeState::Stopped, self.policy)?;
            }
            pending.extend(flow.flow.process_groups.iter().rev().map(|g| g.id.clone()));
        }
        Ok(())
    }

    fn delete_templates(&self, group_id: &str, report: &mut TeardownReport) -> Result<()> {
        for template in self.directory.templates_in_group(group_id)? {
            match self.directory.delete_template(&template.id) {
                Ok(()) => report.completed(TeardownStep::DeleteTemplate, &template.id),
                Err(error) => {
                    warn!(template_id = %template.id, error = %error, "failed to delete template");
                    report.failed(TeardownStep::DeleteTemplate, &template.id, &error);
                }
            }
        }
        Ok(())
    }

    fn disable_owned_services(&self, group_id: &str, report: &mut TeardownReport) -> Result<()> {
        let services = self.directory.controller_services(group_id)?;
        let mut released = HashSet::new();
        for service in owned_by(&services, group_id) {
            if let Err(failure) =
                self.release_service(&service.id, TeardownStep::DisableService, &mut released, report)
            {
                warn!(
                    service_id = %service.id,
                    step = %failure.step,
                    component = %failure.component_id,
                    error = %failure.error,
                    "failed to disable controller service, continuing"
                );
                report.failed(failure.step, &failure.component_id, &failure.error);
                // A failed sub-step leaves the owned service itself enabled.
                if failure.step != TeardownStep::DisableService
                    || failure.component_id != service.id
                {
                    report.failed(TeardownStep::DisableService, &service.id, &failure.error);
                }
            }
        }
        Ok(())
    }

    /// Stop referencing components, disable referencing services (their own
    /// referencers first), then disable the service itself.
    fn release_service(
        &self,
        service_id: &str,
        step: TeardownStep,
        released: &mut HashSet<String>,
        report: &mut TeardownReport,
    ) -> Result<(), StepError> {
        if !released.insert(service_id.to_string()) {
            return Ok(());
        }

        let referencers = referencers_of(self.directory, service_id)
            .map_err(StepError::at(TeardownStep::StopReferencingComponent, service_id))?;

        let runnable = referencers
            .processors
            .iter()
            .map(|r| ComponentRef::Processor(r.id.clone()))
            .chain(
                referencers
                    .reporting_tasks
                    .iter()
                    .map(|r| ComponentRef::ReportingTask(r.id.clone())),
            );
        for component in runnable {
            self.stop_component(&component)
                .map_err(StepError::at(TeardownStep::StopReferencingComponent, component.id()))?;
            report.completed(TeardownStep::StopReferencingComponent, component.id());
        }

        for dependent in &referencers.controller_services {
            self.release_service(
                &dependent.id,
                TeardownStep::DisableReferencingService,
                released,
                report,
            )?;
        }

        self.disable_service(service_id)
            .map_err(StepError::at(step, service_id))?;
        report.completed(step, service_id);
        info!(service_id = %service_id, "controller service disabled");
        Ok(())
    }

    fn stop_component(&self, component: &ComponentRef) -> Result<()> {
        if !self
            .directory
            .runtime_state(component)?
            .satisfies(RuntimeState::Stopped)
        {
            self.directory
                .set_runtime_state(component, RuntimeState::Stopped)?;
        }
        await_runtime_state(self.directory, component, RuntimeState::Stopped, self.policy)
    }

    fn disable_service(&self, service_id: &str) -> Result<()> {
        if self.directory.controller_service_state(service_id)? != ServiceState::Disabled {
            self.directory
                .set_controller_service_state(service_id, ServiceState::Disabled)?;
        }
        await_service_state(self.directory, service_id, ServiceState::Disabled, self.policy)
    }
}
