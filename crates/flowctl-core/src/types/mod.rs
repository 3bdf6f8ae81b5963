//! Shared core types used across the directory, extract and teardown layers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A group resolved in the live flow directory.
///
/// Only valid for the duration of one operation; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupHandle {
    pub id: String,
    pub name: String,
}

impl GroupHandle {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Artifact coordinates of the extension providing a component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub artifact: String,
    #[serde(default)]
    pub version: String,
}

/// Reference to a component with a run/stop lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentRef {
    Group(String),
    Processor(String),
    ReportingTask(String),
    InputPort(String),
    OutputPort(String),
}

impl ComponentRef {
    pub fn id(&self) -> &str {
        match self {
            ComponentRef::Group(id)
            | ComponentRef::Processor(id)
            | ComponentRef::ReportingTask(id)
            | ComponentRef::InputPort(id)
            | ComponentRef::OutputPort(id) => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ComponentRef::Group(_) => "process group",
            ComponentRef::Processor(_) => "processor",
            ComponentRef::ReportingTask(_) => "reporting task",
            ComponentRef::InputPort(_) => "input port",
            ComponentRef::OutputPort(_) => "output port",
        }
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

/// Scheduled state of a runnable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuntimeState {
    Running,
    Stopped,
    /// Disabled components cannot run; they count as stopped for teardown.
    Disabled,
}

impl RuntimeState {
    /// Whether a component in this state satisfies a wait for `target`.
    pub fn satisfies(self, target: RuntimeState) -> bool {
        match target {
            RuntimeState::Stopped => matches!(self, RuntimeState::Stopped | RuntimeState::Disabled),
            other => self == other,
        }
    }
}

impl fmt::Display for RuntimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RuntimeState::Running => "RUNNING",
            RuntimeState::Stopped => "STOPPED",
            RuntimeState::Disabled => "DISABLED",
        };
        f.write_str(label)
    }
}

/// State of a controller service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceState {
    Enabled,
    Enabling,
    Disabled,
    Disabling,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ServiceState::Enabled => "ENABLED",
            ServiceState::Enabling => "ENABLING",
            ServiceState::Disabled => "DISABLED",
            ServiceState::Disabling => "DISABLING",
        };
        f.write_str(label)
    }
}

/// Parse a comma separated branch (`root,teamA`) into its group names.
pub fn parse_branch(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Render a branch for log and error messages.
pub fn display_branch(branch: &[String]) -> String {
    format!("[{}]", branch.join(", "))
}
