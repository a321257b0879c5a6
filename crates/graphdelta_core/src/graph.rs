//! Rooted object graph stored as an arena addressed by content id.

use crate::error::{CoreError, CoreResult};
use crate::id::ContentId;
use crate::node::Node;
use indexmap::IndexMap;

/// A rooted graph of nodes
///
/// Edges are the `NodeRef` values inside node members. The graph may share
/// substructure and may contain cycles. Each content id is stored once,
/// keyed by the node's own id; graphs are only built through [`Graph::new`]
/// and [`Graph::from_parts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    root: ContentId,
    nodes: IndexMap<ContentId, Node>,
}

impl Graph {
    /// Create a graph from its root node
    #[must_use]
    pub fn new(root: Node) -> Self {
        let root_id = root.content_id().clone();
        let mut nodes = IndexMap::new();
        nodes.insert(root_id.clone(), root);
        Self {
            root: root_id,
            nodes,
        }
    }

    /// Create a graph from a root id and a node arena
    ///
    /// # Errors
    ///
    /// Returns error if the root id is empty or not present among the nodes
    pub fn from_parts(root: ContentId, nodes: impl IntoIterator<Item = Node>) -> CoreResult<Self> {
        if root.is_empty() {
            return Err(CoreError::MissingRoot {
                root: String::new(),
            });
        }

        let mut graph = Self {
            root,
            nodes: IndexMap::new(),
        };
        for node in nodes {
            graph.insert(node);
        }

        if !graph.nodes.contains_key(&graph.root) {
            return Err(CoreError::MissingRoot {
                root: graph.root.to_string(),
            });
        }
        Ok(graph)
    }

    /// Insert a node, returning false if its content id is already present
    ///
    /// Equal content ids mean equal content, so the first copy is kept.
    pub fn insert(&mut self, node: Node) -> bool {
        if self.nodes.contains_key(node.content_id()) {
            return false;
        }
        self.nodes.insert(node.content_id().clone(), node);
        true
    }

    /// Builder-style insert
    #[must_use]
    pub fn with_node(mut self, node: Node) -> Self {
        self.insert(node);
        self
    }

    /// Get the root id
    #[must_use]
    pub fn root_id(&self) -> &ContentId {
        &self.root
    }

    /// Get the root node
    ///
    /// # Errors
    ///
    /// Returns error if the root is not in the arena
    pub fn root(&self) -> CoreResult<&Node> {
        self.nodes.get(&self.root).ok_or_else(|| CoreError::MissingRoot {
            root: self.root.to_string(),
        })
    }

    /// Get a node by content id
    #[must_use]
    pub fn get(&self, id: &ContentId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Iterate over every stored node, reachable or not
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get number of stored nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Content ids of nodes whose stored id does not match their content
    #[must_use]
    pub fn verify_content_ids(&self) -> Vec<ContentId> {
        self.nodes
            .values()
            .filter(|node| !node.has_valid_content_id())
            .map(|node| node.content_id().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_graph_new() {
        let root = Node::builder("Root").build();
        let graph = Graph::new(root.clone());
        assert_eq!(graph.root_id(), root.content_id());
        assert_eq!(graph.root().unwrap(), &root);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_graph_insert_dedupes() {
        let child = Node::builder("Child").member("v", 1).build();
        let root = Node::builder("Root")
            .member("a", Value::NodeRef(child.content_id().clone()))
            .build();
        let mut graph = Graph::new(root);
        assert!(graph.insert(child.clone()));
        assert!(!graph.insert(child));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_from_parts_missing_root() {
        let node = Node::builder("Orphan").build();
        let err = Graph::from_parts(ContentId::new("missing"), vec![node]).unwrap_err();
        assert_eq!(
            err,
            CoreError::MissingRoot {
                root: "missing".to_string()
            }
        );

        let err = Graph::from_parts(ContentId::new(""), Vec::new()).unwrap_err();
        assert!(matches!(err, CoreError::MissingRoot { .. }));
    }

    #[test]
    fn test_verify_content_ids() {
        let good = Node::builder("Good").build();
        let bad = Node::builder("Bad").content_id("forged").build();
        let root = Node::builder("Root")
            .member("good", Value::NodeRef(good.content_id().clone()))
            .member("bad", Value::node_ref("forged"))
            .build();
        let graph = Graph::new(root).with_node(good).with_node(bad);

        assert_eq!(graph.verify_content_ids(), vec![ContentId::new("forged")]);
    }

    #[test]
    fn test_from_parts_keys_by_node_id() {
        let child = Node::builder("Child").content_id("c").member("v", 1).build();
        let twin = Node::builder("Child").content_id("c").member("v", 2).build();
        let root = Node::builder("Root")
            .content_id("r")
            .member("a", Value::node_ref("c"))
            .build();

        let graph = Graph::from_parts(ContentId::new("r"), vec![root, child.clone(), twin]).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.get(&ContentId::new("c")), Some(&child));
        assert!(graph.nodes().all(|n| graph.get(n.content_id()) == Some(n)));
    }
}
