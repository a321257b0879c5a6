//! Precondition errors.
//!
//! Only these abort a run. Ambiguous correlations and value comparison
//! faults are folded into the [`DiffResult`](crate::DiffResult) instead.

use crate::snapshot::SnapshotError;
use graphdelta_core::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of a comparison a graph belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The version under test
    Test,
    /// The version compared against
    Reference,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Test => write!(f, "test"),
            Self::Reference => write!(f, "reference"),
        }
    }
}

/// Errors that abort a diff run before any comparison
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// Graph root is absent
    #[error("{side} graph is unusable: {source}")]
    MissingRoot {
        /// Affected side
        side: Side,
        /// Underlying graph error
        source: CoreError,
    },
    /// Counterpart snapshot is absent
    #[error("missing {side} snapshot: {label}")]
    MissingSnapshot {
        /// Affected side
        side: Side,
        /// Snapshot label or path
        label: String,
    },
    /// Snapshot could not be retrieved or decoded
    #[error("failed to retrieve {side} snapshot {label}: {reason}")]
    Retrieval {
        /// Affected side
        side: Side,
        /// Snapshot label or path
        label: String,
        /// Failure description
        reason: String,
    },
}

impl DiffError {
    /// Attach a side and label to a snapshot error
    #[must_use]
    pub fn from_snapshot(side: Side, label: impl Into<String>, err: SnapshotError) -> Self {
        let label = label.into();
        match err {
            SnapshotError::NotFound { .. } => Self::MissingSnapshot { side, label },
            SnapshotError::MissingRoot { root } => Self::MissingRoot {
                side,
                source: CoreError::MissingRoot { root },
            },
            other => Self::Retrieval {
                side,
                label,
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_root_names_side() {
        let err = DiffError::MissingRoot {
            side: Side::Reference,
            source: CoreError::MissingRoot {
                root: "r1".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "reference graph is unusable: Root node not found: r1"
        );
    }

    #[test]
    fn test_from_snapshot_not_found() {
        let err = DiffError::from_snapshot(
            Side::Reference,
            "models/release",
            SnapshotError::NotFound {
                label: "models/release".to_string(),
            },
        );
        assert_eq!(err.to_string(), "missing reference snapshot: models/release");
    }

    #[test]
    fn test_from_snapshot_decode_failure() {
        let err = DiffError::from_snapshot(
            Side::Test,
            "a.json",
            SnapshotError::Decode("expected value".to_string()),
        );
        assert!(matches!(err, DiffError::Retrieval { side: Side::Test, .. }));
        assert!(err.to_string().contains("expected value"));
    }
}
