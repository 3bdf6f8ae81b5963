//! High-level commands for flowctl operations.
//!
//! Each command takes a [`FlowDirectory`](crate::remote::FlowDirectory) and
//! returns a report the frontend can render as a table or JSON.

pub mod extract;
pub mod install;
pub mod undeploy;

pub use extract::{ExtractCommand, ExtractOptions, ExtractReport};
pub use install::{InstallCommand, InstallOptions, InstallReport};
pub use undeploy::{UndeployCommand, UndeployOptions, UndeployReport};
