//! Per-step record of a teardown run.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::error::FlowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TeardownStep {
    StopGroup,
    DeleteTemplate,
    StopReferencingComponent,
    DisableReferencingService,
    DisableService,
    DeleteGroup,
}

impl fmt::Display for TeardownStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TeardownStep::StopGroup => "stop group",
            TeardownStep::DeleteTemplate => "delete template",
            TeardownStep::StopReferencingComponent => "stop referencing component",
            TeardownStep::DisableReferencingService => "disable referencing service",
            TeardownStep::DisableService => "disable service",
            TeardownStep::DeleteGroup => "delete group",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum StepOutcome {
    Completed,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: TeardownStep,
    pub component_id: String,
    pub outcome: StepOutcome,
}

impl StepRecord {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, StepOutcome::Failed(_))
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TeardownReport {
    pub group_id: String,
    pub group_name: String,
    pub steps: Vec<StepRecord>,
}

impl TeardownReport {
    pub fn new(group_id: impl Into<String>, group_name: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            group_name: group_name.into(),
            steps: Vec::new(),
        }
    }

    pub fn completed(&mut self, step: TeardownStep, component_id: &str) {
        self.steps.push(StepRecord {
            step,
            component_id: component_id.to_string(),
            outcome: StepOutcome::Completed,
        });
    }

    pub fn failed(&mut self, step: TeardownStep, component_id: &str, error: &FlowError) {
        self.steps.push(StepRecord {
            step,
            component_id: component_id.to_string(),
            outcome: StepOutcome::Failed(error.to_string()),
        });
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps.iter().filter(|record| record.is_failure())
    }

    /// True when no best-effort step failed.
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// A strict teardown step failed; the report holds what happened before it.
#[derive(Debug, Error)]
#[error("teardown of group '{}' did not complete: {source}", .report.group_name)]
pub struct TeardownFailure {
    pub report: TeardownReport,
    #[source]
    pub source: FlowError,
}

impl TeardownFailure {
    pub fn new(report: TeardownReport, source: FlowError) -> Self {
        Self { report, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_are_collected_in_order() {
        let mut report = TeardownReport::new("g1", "teamA");
        report.completed(TeardownStep::StopGroup, "g1");
        report.failed(
            TeardownStep::DisableService,
            "c1",
            &FlowError::not_found("controller service c1"),
        );
        report.completed(TeardownStep::DeleteGroup, "g1");

        let failures: Vec<&StepRecord> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].component_id, "c1");
        assert!(!report.is_clean());
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let value = serde_json::to_value(StepOutcome::Failed("boom".to_string())).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["message"], "boom");
    }
}
