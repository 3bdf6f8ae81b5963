//! Undeploy command implementation.
//!
//! Stops, disables and deletes the group at the end of a branch.

use anyhow::Context;
use serde::Serialize;

use crate::remote::FlowDirectory;
use crate::teardown::{StepOutcome, TeardownOrchestrator, TeardownReport, UndeployOutcome};
use crate::types::{display_branch, parse_branch};
use crate::wait::WaitPolicy;

/// Options for the undeploy command
#[derive(Debug, Clone)]
pub struct UndeployOptions {
    pub branch: Vec<String>,
}

impl UndeployOptions {
    pub fn new(branch: Vec<String>) -> Self {
        Self { branch }
    }

    pub fn parse(branch: &str) -> Self {
        Self::new(parse_branch(branch))
    }
}

/// Report from an undeploy operation
#[derive(Debug, Clone, Serialize)]
pub struct UndeployReport {
    pub branch: Vec<String>,
    /// Whether anything was removed; false when the branch did not exist
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teardown: Option<TeardownReport>,
    /// Best-effort steps that failed
    pub warnings: Vec<String>,
}

impl UndeployReport {
    fn from_teardown(branch: Vec<String>, teardown: TeardownReport) -> Self {
        let warnings = warnings_of(&teardown);
        Self {
            branch,
            changed: true,
            teardown: Some(teardown),
            warnings,
        }
    }
}

/// One line per failed step of `report`.
pub fn warnings_of(report: &TeardownReport) -> Vec<String> {
    report
        .failures()
        .filter_map(|record| match &record.outcome {
            StepOutcome::Failed(message) => {
                Some(format!("{} {}: {}", record.step, record.component_id, message))
            }
            StepOutcome::Completed => None,
        })
        .collect()
}

/// Undeploy command orchestrator
#[derive(Debug)]
pub struct UndeployCommand {
    policy: WaitPolicy,
}

impl UndeployCommand {
    pub fn new(policy: WaitPolicy) -> Self {
        Self { policy }
    }

    /// Errors only when a strict step fails. The underlying
    /// [`TeardownFailure`](crate::teardown::TeardownFailure) stays reachable
    /// through `downcast_ref` and carries the partial report.
    pub fn execute(
        &self,
        directory: &dyn FlowDirectory,
        options: &UndeployOptions,
    ) -> anyhow::Result<UndeployReport> {
        let orchestrator = TeardownOrchestrator::new(directory, self.policy);
        let outcome = orchestrator
            .undeploy(&options.branch)
            .with_context(|| format!("Failed to undeploy {}", display_branch(&options.branch)))?;

        Ok(match outcome {
            UndeployOutcome::NotFound => UndeployReport {
                branch: options.branch.clone(),
                changed: false,
                teardown: None,
                warnings: Vec::new(),
            },
            UndeployOutcome::Removed(teardown) => {
                UndeployReport::from_teardown(options.branch.clone(), teardown)
            }
        })
    }
}
