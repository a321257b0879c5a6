//! graphdelta diff engine
//!
//! Flattens two object graphs, correlates their nodes by application id or
//! content id, and classifies every node as added, deleted, modified or
//! unchanged.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod error;
pub mod flatten;
pub mod index;
pub mod property;
pub mod report;
pub mod result;
pub mod snapshot;

pub use config::{DiffConfig, DEFAULT_MAX_VALUE_DEPTH};
pub use engine::{compare_graphs, DiffEngine};
pub use error::{DiffError, Side};
pub use flatten::{Flattened, GraphFlattener};
pub use index::{IdentityIndex, IdentityIndexer};
pub use property::{
    ChangeCategory, Comparison, ModifiedProperty, PropertyChanges, PropertyDiffer, TypeChange,
};
pub use report::{format_entry, publish, EntryKind, LogReporter, RecordingReporter, ReportEvent, Reporter};
pub use result::{Ambiguity, DiffResult, DiffSummary, ModifiedNode, NodeSummary};
pub use snapshot::{Snapshot, SnapshotError, SnapshotLoader, SnapshotMetadata, SnapshotWriter, SNAPSHOT_VERSION};
