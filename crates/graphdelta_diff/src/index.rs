//! Identity indexing.
//!
//! Nodes with an application id are bucketed by it; all other nodes are
//! bucketed by content id. Buckets are lists because neither key is
//! guaranteed unique.

use graphdelta_core::{ApplicationId, ContentId, Node};
use indexmap::IndexMap;

/// A pair of multi-valued indices over one node set
///
/// Keys and bucket entries keep their insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentityIndex<'g> {
    by_application_id: IndexMap<ApplicationId, Vec<&'g Node>>,
    by_content_id: IndexMap<ContentId, Vec<&'g Node>>,
}

impl<'g> IdentityIndex<'g> {
    /// Create an empty index
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the matching bucket
    pub fn insert(&mut self, node: &'g Node) {
        match node.application_id() {
            Some(app_id) => self
                .by_application_id
                .entry(app_id.clone())
                .or_default()
                .push(node),
            None => self
                .by_content_id
                .entry(node.content_id().clone())
                .or_default()
                .push(node),
        }
    }

    /// Buckets keyed by application id
    #[must_use]
    pub fn by_application_id(&self) -> &IndexMap<ApplicationId, Vec<&'g Node>> {
        &self.by_application_id
    }

    /// Buckets keyed by content id, for nodes without an application id
    #[must_use]
    pub fn by_content_id(&self) -> &IndexMap<ContentId, Vec<&'g Node>> {
        &self.by_content_id
    }

    /// Nodes sharing the given application id
    #[must_use]
    pub fn application_bucket(&self, id: &ApplicationId) -> Option<&[&'g Node]> {
        self.by_application_id.get(id).map(Vec::as_slice)
    }

    /// Identity-less nodes with the given content id
    #[must_use]
    pub fn content_bucket(&self, id: &ContentId) -> Option<&[&'g Node]> {
        self.by_content_id.get(id).map(Vec::as_slice)
    }

    /// Total number of indexed nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.by_application_id.values().map(Vec::len).sum::<usize>()
            + self.by_content_id.values().map(Vec::len).sum::<usize>()
    }

    /// Check if nothing was indexed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_application_id.is_empty() && self.by_content_id.is_empty()
    }
}

/// Builds [`IdentityIndex`] values
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityIndexer;

impl IdentityIndexer {
    /// Index a node sequence
    #[must_use]
    pub fn build<'g>(nodes: impl IntoIterator<Item = &'g Node>) -> IdentityIndex<'g> {
        let mut index = IdentityIndex::new();
        for node in nodes {
            index.insert(node);
        }
        tracing::debug!(
            application_ids = index.by_application_id.len(),
            content_ids = index.by_content_id.len(),
            "built identity index"
        );
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::GraphFlattener;
    use graphdelta_core::{Graph, Value};

    fn app(id: &str) -> ApplicationId {
        ApplicationId::parse(id).unwrap()
    }

    #[test]
    fn test_build_partitions_by_identity() {
        let keyed = Node::builder("Wall").application_id("W1").build();
        let anonymous = Node::builder("Mesh").member("v", 1).build();
        let nodes = vec![keyed.clone(), anonymous.clone()];

        let index = IdentityIndexer::build(&nodes);
        assert_eq!(index.application_bucket(&app("W1")), Some(&[&keyed][..]));
        assert_eq!(
            index.content_bucket(anonymous.content_id()),
            Some(&[&anonymous][..])
        );
        assert!(index.content_bucket(keyed.content_id()).is_none());
        assert_eq!(index.node_count(), 2);
    }

    #[test]
    fn test_build_keeps_duplicates_in_order() {
        let first = Node::builder("Beam").application_id("B1").member("n", 1).build();
        let second = Node::builder("Beam").application_id("B1").member("n", 2).build();
        let twin = first.clone();
        let nodes = vec![first.clone(), second.clone(), twin];

        let index = IdentityIndexer::build(&nodes);
        let bucket = index.application_bucket(&app("B1")).unwrap();
        assert_eq!(bucket.len(), 3);
        assert_eq!(bucket[0], &first);
        assert_eq!(bucket[1], &second);
        assert_eq!(bucket[2], &first);
    }

    #[test]
    fn test_blank_application_id_goes_to_content_bucket() {
        let node = Node::builder("Line").application_id(" ").build();
        let nodes = vec![node.clone()];
        let index = IdentityIndexer::build(&nodes);
        assert!(index.by_application_id().is_empty());
        assert_eq!(index.by_content_id().len(), 1);
    }

    #[test]
    fn test_reindexing_is_deterministic() {
        let child = Node::builder("Point").member("x", 1).build();
        let keyed = Node::builder("Line")
            .application_id("L1")
            .member("start", Value::NodeRef(child.content_id().clone()))
            .build();
        let root = Node::builder("Root")
            .member("elements", Value::List(vec![Value::NodeRef(keyed.content_id().clone())]))
            .build();
        let graph = Graph::new(root).with_node(keyed).with_node(child);

        let flattener = GraphFlattener::new();
        let first = flattener.flatten(&graph).unwrap();
        let second = flattener.flatten(&graph).unwrap();

        let a = IdentityIndexer::build(first.iter());
        let b = IdentityIndexer::build(second.iter());
        assert_eq!(a, b);
        assert_eq!(
            a.by_content_id().keys().collect::<Vec<_>>(),
            b.by_content_id().keys().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_empty_index() {
        let index = IdentityIndexer::build(std::iter::empty());
        assert!(index.is_empty());
        assert_eq!(index.node_count(), 0);
    }
}
