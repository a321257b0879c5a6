//! Classified output of one reconciliation run.

use crate::property::PropertyChanges;
use graphdelta_core::{ApplicationId, ContentId, Node};
use serde::{Deserialize, Serialize};

/// Identity of a classified node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeSummary {
    /// Content id
    pub content_id: ContentId,
    /// Application id, if any
    pub application_id: Option<ApplicationId>,
    /// Type tag
    pub type_tag: String,
}

impl From<&Node> for NodeSummary {
    fn from(node: &Node) -> Self {
        Self {
            content_id: node.content_id().clone(),
            application_id: node.application_id().cloned(),
            type_tag: node.type_tag().to_string(),
        }
    }
}

/// A correlated pair whose content differs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedNode {
    /// The test-side node
    pub node: NodeSummary,
    /// Content id of the reference-side node it was paired with
    pub reference_id: ContentId,
    /// Property-level changes
    pub changes: PropertyChanges,
}

/// A correlation that could only be resolved heuristically
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ambiguity {
    /// Several nodes share one application id and were paired by position
    PositionalPairing {
        /// Shared application id
        application_id: ApplicationId,
        /// Nodes in the test bucket
        test_count: usize,
        /// Nodes in the reference bucket
        reference_count: usize,
    },
}

impl std::fmt::Display for Ambiguity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PositionalPairing {
                application_id,
                test_count,
                reference_count,
            } => write!(
                f,
                "appId({}) shared by {} test and {} reference objects, paired by position",
                application_id, test_count, reference_count
            ),
        }
    }
}

/// Result of reconciling a test graph against a reference graph
///
/// Every test node lands in exactly one of `added`, `unchanged`, `modified`
/// or `changed_without_identity`. Every reference node lands in exactly one
/// of `deleted`, `unchanged`, `modified` or `unmatched_reference_count`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiffResult {
    /// Test nodes with no reference counterpart
    pub added: Vec<NodeSummary>,
    /// Reference nodes with no test counterpart
    pub deleted: Vec<NodeSummary>,
    /// Test nodes identical to their counterpart
    pub unchanged: Vec<NodeSummary>,
    /// Correlated pairs whose content differs
    pub modified: Vec<ModifiedNode>,
    /// Test nodes without application id whose content has no match
    pub changed_without_identity: Vec<NodeSummary>,
    /// Reference nodes without application id whose content has no match
    pub unmatched_reference_count: usize,
    /// Heuristic correlations worth a second look
    pub ambiguities: Vec<Ambiguity>,
    /// Nodes indexed on the test side
    pub test_node_count: usize,
    /// Nodes indexed on the reference side
    pub reference_node_count: usize,
}

impl DiffResult {
    /// Create an empty result
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if anything differs
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty()
            || !self.deleted.is_empty()
            || !self.modified.is_empty()
            || !self.changed_without_identity.is_empty()
    }

    /// Whether the run passes
    #[must_use]
    pub fn passed(&self) -> bool {
        !self.has_changes()
    }

    /// Net insertions minus deletions among identity-less nodes
    #[must_use]
    pub fn net_content_delta(&self) -> i64 {
        self.changed_without_identity.len() as i64 - self.unmatched_reference_count as i64
    }

    /// Summary counts
    #[must_use]
    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            added_count: self.added.len(),
            deleted_count: self.deleted.len(),
            modified_count: self.modified.len(),
            unchanged_count: self.unchanged.len(),
            changed_without_identity_count: self.changed_without_identity.len(),
            unmatched_reference_count: self.unmatched_reference_count,
            net_content_delta: self.net_content_delta(),
            ambiguity_count: self.ambiguities.len(),
        }
    }
}

/// Summary of a diff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiffSummary {
    /// Number of nodes added
    pub added_count: usize,
    /// Number of nodes deleted
    pub deleted_count: usize,
    /// Number of nodes modified
    pub modified_count: usize,
    /// Number of nodes unchanged
    pub unchanged_count: usize,
    /// Number of identity-less test nodes without a content match
    pub changed_without_identity_count: usize,
    /// Number of identity-less reference nodes without a content match
    pub unmatched_reference_count: usize,
    /// Signed identity-less delta
    pub net_content_delta: i64,
    /// Number of ambiguity records
    pub ambiguity_count: usize,
}

impl DiffSummary {
    /// A run passes iff nothing was added, deleted, modified or changed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.added_count + self.deleted_count + self.modified_count + self.changed_without_identity_count
            == 0
    }

    /// Human-readable outcome line
    #[must_use]
    pub fn message(&self, reference_label: &str) -> String {
        if self.passed() {
            format!("Run passed with {} unchanged objects.", self.unchanged_count)
        } else {
            format!(
                "Run failed due to {} ADDED, {} MODIFIED, {} DELETED and {} CHANGED objects compared to {}.",
                self.added_count,
                self.modified_count,
                self.deleted_count,
                self.changed_without_identity_count,
                reference_label
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary_of(type_tag: &str) -> NodeSummary {
        NodeSummary::from(&Node::builder(type_tag).build())
    }

    #[test]
    fn test_empty_result_passes() {
        let result = DiffResult::new();
        assert!(!result.has_changes());
        assert!(result.passed());
        assert_eq!(result.summary().message("main"), "Run passed with 0 unchanged objects.");
    }

    #[test]
    fn test_unchanged_only_passes() {
        let mut result = DiffResult::new();
        result.unchanged.push(summary_of("Wall"));
        result.unmatched_reference_count = 2;
        assert!(result.passed());
        assert_eq!(result.net_content_delta(), -2);
    }

    #[test]
    fn test_changed_without_identity_fails() {
        let mut result = DiffResult::new();
        result.changed_without_identity.push(summary_of("Mesh"));
        let summary = result.summary();
        assert!(!summary.passed());
        assert_eq!(summary.net_content_delta, 1);
        assert_eq!(
            summary.message("models/release"),
            "Run failed due to 0 ADDED, 0 MODIFIED, 0 DELETED and 1 CHANGED objects compared to models/release."
        );
    }

    #[test]
    fn test_node_summary_from_node() {
        let node = Node::builder("Door").application_id("D7").build();
        let summary = NodeSummary::from(&node);
        assert_eq!(&summary.content_id, node.content_id());
        assert_eq!(summary.application_id.as_ref().map(ApplicationId::as_str), Some("D7"));
        assert_eq!(summary.type_tag, "Door");
    }

    #[test]
    fn test_ambiguity_display() {
        let ambiguity = Ambiguity::PositionalPairing {
            application_id: ApplicationId::parse("C1").unwrap(),
            test_count: 1,
            reference_count: 2,
        };
        assert_eq!(
            ambiguity.to_string(),
            "appId(C1) shared by 1 test and 2 reference objects, paired by position"
        );
    }
}
