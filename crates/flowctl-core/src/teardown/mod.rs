//! Undeploy orchestration: stop, disable and delete a branch.

pub mod orchestrator;
pub mod report;

pub use orchestrator::{TeardownOrchestrator, UndeployOutcome};
pub use report::{StepOutcome, StepRecord, TeardownFailure, TeardownReport, TeardownStep};
