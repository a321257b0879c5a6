//! Graph flattening.
//!
//! Walks every node reachable from the root with an explicit work list.
//! A visited set keyed by content id makes cycles terminate and keeps
//! shared children from being counted twice.

use graphdelta_core::{ContentId, CoreResult, Graph, Node};
use std::collections::HashSet;

/// The deduplicated set of nodes reachable from a root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flattened<'g> {
    nodes: Vec<&'g Node>,
    dangling: Vec<ContentId>,
}

impl<'g> Flattened<'g> {
    /// Reachable nodes, in pre-order
    #[must_use]
    pub fn nodes(&self) -> &[&'g Node] {
        &self.nodes
    }

    /// Number of unique reachable nodes
    #[must_use]
    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    /// Referenced content ids that are not in the graph
    #[must_use]
    pub fn dangling(&self) -> &[ContentId] {
        &self.dangling
    }

    /// Iterate over reachable nodes
    pub fn iter(&self) -> impl Iterator<Item = &'g Node> + '_ {
        self.nodes.iter().copied()
    }
}

/// Flattens a rooted graph into its reachable node set
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphFlattener;

impl GraphFlattener {
    /// Create a new flattener (unit struct)
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Collect every node reachable from the graph root
    ///
    /// Children are visited in member order. References to ids missing from
    /// the graph are skipped and listed in [`Flattened::dangling`].
    ///
    /// # Errors
    ///
    /// Returns error if the root node is absent
    pub fn flatten<'g>(&self, graph: &'g Graph) -> CoreResult<Flattened<'g>> {
        let root = graph.root()?;

        let mut nodes = Vec::new();
        let mut dangling = Vec::new();
        let mut visited: HashSet<&ContentId> = HashSet::new();
        let mut stack: Vec<&ContentId> = vec![root.content_id()];

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }

            let Some(node) = graph.get(id) else {
                tracing::warn!(node_id = %id, "dangling node reference skipped");
                dangling.push(id.clone());
                continue;
            };

            nodes.push(node);
            let children = node.node_refs();
            stack.extend(children.into_iter().rev().filter(|child| !visited.contains(child)));
        }

        tracing::debug!(
            root = %root.content_id(),
            count = nodes.len(),
            dangling = dangling.len(),
            "flattened graph"
        );

        Ok(Flattened { nodes, dangling })
    }
}
