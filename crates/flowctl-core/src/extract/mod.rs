//! Extraction of a live branch into a portable flow snapshot.

pub mod canonicalizer;
pub mod codec;
pub mod snapshot;

pub use canonicalizer::{canonicalize, extract_branch, extract_to_file};
pub use codec::{SnapshotFormat, read_snapshot, write_snapshot};
pub use snapshot::{
    ConnectionPort, ControllerServiceSnapshot, FlowSnapshot, ProcessorConfigSnapshot,
    ProcessorSnapshot,
};
