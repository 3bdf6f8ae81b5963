//! Error taxonomy for flow directory operations.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub type Result<T, E = FlowError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum FlowError {
    /// A branch or component does not resolve in the remote directory.
    #[error("cannot find {what}")]
    NotFound { what: String },

    /// Transport, auth or unexpected-response failure; the remote effect is unknown.
    #[error("remote access failed: {method} {url}: {message}")]
    RemoteAccess {
        method: String,
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// A wait deadline elapsed before the component reached its target state.
    #[error("timed out after {waited:?} waiting for {component} to become {target}")]
    Timeout {
        component: String,
        target: String,
        waited: Duration,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("codec error: {0}")]
    Codec(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl FlowError {
    pub fn not_found(what: impl Into<String>) -> Self {
        FlowError::NotFound { what: what.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FlowError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FlowError::NotFound { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FlowError::Timeout { .. })
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        FlowError::Codec(err.to_string())
    }
}

impl From<serde_yaml::Error> for FlowError {
    fn from(err: serde_yaml::Error) -> Self {
        FlowError::Codec(err.to_string())
    }
}
