//! Reconciliation of two identity indices.
//!
//! Phase A correlates nodes sharing an application id, pairing bucket
//! entries by position. Phase B handles nodes without one: only identical
//! content can be matched, everything else is counted in aggregate.

use crate::config::DiffConfig;
use crate::error::{DiffError, Side};
use crate::flatten::GraphFlattener;
use crate::index::{IdentityIndex, IdentityIndexer};
use crate::property::PropertyDiffer;
use crate::result::{Ambiguity, DiffResult, ModifiedNode, NodeSummary};
use graphdelta_core::{Graph, Node};

/// Engine for reconciling a test snapshot against a reference snapshot
///
/// Inputs are borrowed and never mutated, so the same indices can be
/// reconciled any number of times.
#[derive(Debug, Clone)]
pub struct DiffEngine<'g> {
    config: DiffConfig,
    differ: PropertyDiffer<'g>,
}

impl<'g> DiffEngine<'g> {
    /// Create an engine with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DiffConfig::default())
    }

    /// Create an engine with custom configuration
    #[must_use]
    pub fn with_config(config: DiffConfig) -> Self {
        let differ = PropertyDiffer::new(&config);
        Self { config, differ }
    }

    /// Let the property differ resolve references in the two graphs
    ///
    /// Has no effect unless `resolve_reference_types` is enabled.
    #[must_use]
    pub fn with_graphs(mut self, test: &'g Graph, reference: &'g Graph) -> Self {
        if self.config.resolve_reference_types {
            self.differ = self.differ.with_graphs(test, reference);
        }
        self
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Classify every indexed node of both sides
    #[must_use]
    pub fn reconcile(&self, test: &IdentityIndex<'_>, reference: &IdentityIndex<'_>) -> DiffResult {
        let mut result = DiffResult::new();
        result.test_node_count = test.node_count();
        result.reference_node_count = reference.node_count();

        self.reconcile_application_ids(test, reference, &mut result);
        Self::reconcile_content_ids(test, reference, &mut result);

        tracing::debug!(
            added = result.added.len(),
            deleted = result.deleted.len(),
            modified = result.modified.len(),
            unchanged = result.unchanged.len(),
            changed_without_identity = result.changed_without_identity.len(),
            "reconciliation complete"
        );
        result
    }

    /// Phase A: nodes keyed by application id
    fn reconcile_application_ids(
        &self,
        test: &IdentityIndex<'_>,
        reference: &IdentityIndex<'_>,
        result: &mut DiffResult,
    ) {
        for (app_id, test_bucket) in test.by_application_id() {
            let Some(reference_bucket) = reference.application_bucket(app_id) else {
                result.added.extend(test_bucket.iter().map(|n| NodeSummary::from(*n)));
                continue;
            };

            if self.config.flag_positional_pairing
                && (test_bucket.len() > 1 || reference_bucket.len() > 1)
            {
                let ambiguity = Ambiguity::PositionalPairing {
                    application_id: app_id.clone(),
                    test_count: test_bucket.len(),
                    reference_count: reference_bucket.len(),
                };
                tracing::warn!(%ambiguity, "positional pairing");
                result.ambiguities.push(ambiguity);
            }

            let len = test_bucket.len().max(reference_bucket.len());
            for i in 0..len {
                match (test_bucket.get(i), reference_bucket.get(i)) {
                    (Some(t), Some(r)) => self.classify_pair(t, r, result),
                    (Some(t), None) => result.added.push(NodeSummary::from(*t)),
                    (None, Some(r)) => result.deleted.push(NodeSummary::from(*r)),
                    (None, None) => {}
                }
            }
        }

        for (app_id, reference_bucket) in reference.by_application_id() {
            if test.application_bucket(app_id).is_none() {
                result
                    .deleted
                    .extend(reference_bucket.iter().map(|n| NodeSummary::from(*n)));
            }
        }
    }

    fn classify_pair(&self, test: &Node, reference: &Node, result: &mut DiffResult) {
        if test.content_id() == reference.content_id() {
            result.unchanged.push(NodeSummary::from(test));
            return;
        }

        result.modified.push(ModifiedNode {
            node: NodeSummary::from(test),
            reference_id: reference.content_id().clone(),
            changes: self.differ.diff(test, reference),
        });
    }

    /// Phase B: nodes without application id, matched by content only
    fn reconcile_content_ids(
        test: &IdentityIndex<'_>,
        reference: &IdentityIndex<'_>,
        result: &mut DiffResult,
    ) {
        for (content_id, test_bucket) in test.by_content_id() {
            let available = reference.content_bucket(content_id).map_or(0, <[_]>::len);
            let matched = test_bucket.len().min(available);

            result
                .unchanged
                .extend(test_bucket[..matched].iter().map(|n| NodeSummary::from(*n)));
            result
                .changed_without_identity
                .extend(test_bucket[matched..].iter().map(|n| NodeSummary::from(*n)));
        }

        for (content_id, reference_bucket) in reference.by_content_id() {
            let available = test.content_bucket(content_id).map_or(0, <[_]>::len);
            result.unmatched_reference_count += reference_bucket.len().saturating_sub(available);
        }
    }
}

impl Default for DiffEngine<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Flatten, index and reconcile two fully loaded graphs
///
/// # Errors
///
/// Returns error if either graph has no root node
pub fn compare_graphs(
    test: &Graph,
    reference: &Graph,
    config: &DiffConfig,
) -> Result<DiffResult, DiffError> {
    let flattener = GraphFlattener::new();
    let test_nodes = flattener.flatten(test).map_err(|source| DiffError::MissingRoot {
        side: Side::Test,
        source,
    })?;
    let reference_nodes = flattener
        .flatten(reference)
        .map_err(|source| DiffError::MissingRoot {
            side: Side::Reference,
            source,
        })?;

    tracing::info!(
        test = test_nodes.count(),
        reference = reference_nodes.count(),
        "found objects"
    );

    let test_index = IdentityIndexer::build(test_nodes.iter());
    let reference_index = IdentityIndexer::build(reference_nodes.iter());

    let engine = DiffEngine::with_config(config.clone()).with_graphs(test, reference);
    Ok(engine.reconcile(&test_index, &reference_index))
}
