//! flowctl Core Library
//!
//! Extracts, undeploys and installs process-group branches of a remote
//! flow engine. Every operation is written against the
//! [`remote::FlowDirectory`] capability so it can run against a live
//! REST endpoint or an in-memory fake.

pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod install;
pub mod navigation;
pub mod references;
pub mod remote;
pub mod teardown;
pub mod types;
pub mod wait;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{Settings, SettingsOverride, SettingsStore};
    pub use crate::context::AppContext;

    // Errors
    pub use crate::error::{FlowError, Result};

    // Remote directory
    pub use crate::remote::{FlowDirectory, HttpFlowDirectory};

    // Operations
    pub use crate::extract::{FlowSnapshot, SnapshotFormat, extract_branch, extract_to_file};
    pub use crate::install::{Installation, install};
    pub use crate::navigation::{ensure_path, resolve_path};
    pub use crate::teardown::{TeardownFailure, TeardownOrchestrator, TeardownReport, UndeployOutcome};

    // Shared types
    pub use crate::types::{ComponentRef, GroupHandle, RuntimeState, ServiceState, parse_branch};
    pub use crate::wait::{WaitPolicy, await_state};
}
