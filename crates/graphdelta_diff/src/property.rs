//! Property-level comparison of two correlated nodes.
//!
//! Equality is defined per [`Value`] variant and returns a [`Comparison`]
//! carrying the change category, so no comparison can fail a run. A value
//! nested too deeply to compare is reported as a `Value` change.

use crate::config::{DiffConfig, DEFAULT_MAX_VALUE_DEPTH};
use graphdelta_core::{ContentId, Graph, Node, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a property change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeCategory {
    /// Same kind, different value
    Value,
    /// Different kind of value
    Type,
    /// Collection length changed
    Count,
}

impl ChangeCategory {
    /// Get display name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Value => "Value",
            Self::Type => "Type",
            Self::Count => "Count",
        }
    }
}

impl fmt::Display for ChangeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of comparing two values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Structurally equal
    Equal,
    /// Not equal, with the category of the difference
    Differs(ChangeCategory),
}

impl Comparison {
    /// Check for equality
    #[must_use]
    pub const fn is_equal(&self) -> bool {
        matches!(self, Self::Equal)
    }
}

/// Value nesting exceeded the configured depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ComparisonFault {
    depth: usize,
}

/// A modified property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedProperty {
    /// Property name
    pub name: String,
    /// Kind of change
    pub category: ChangeCategory,
    /// Reference value, rendered
    pub from: String,
    /// Test value, rendered
    pub to: String,
}

impl ModifiedProperty {
    /// Record a change from a reference value to a test value
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        category: ChangeCategory,
        from: &Value,
        to: &Value,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// The node's own type tag differs between test and reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeChange {
    /// Reference type tag
    pub from: String,
    /// Test type tag
    pub to: String,
}

/// Property-level differences between a test node and a reference node
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PropertyChanges {
    /// Set when the nodes themselves have different types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_change: Option<TypeChange>,
    /// Present on the test node only
    pub added: Vec<String>,
    /// Present on the reference node only
    pub deleted: Vec<String>,
    /// Present on both with differing values
    pub modified: Vec<ModifiedProperty>,
}

impl PropertyChanges {
    /// Check if no property changed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.type_change.is_none()
            && self.added.is_empty()
            && self.deleted.is_empty()
            && self.modified.is_empty()
    }

    /// Total number of changes, counting a type change as one
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.type_change.is_some())
            + self.added.len()
            + self.deleted.len()
            + self.modified.len()
    }

    /// Category recorded for a modified property
    #[must_use]
    pub fn category_of(&self, name: &str) -> Option<ChangeCategory> {
        self.modified
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.category)
    }
}

/// One line per change: `type: changed from (Ref) to (Test) [Type]`, then
/// `name: ADDED`, `name: changed from (ref) to (test) [Category]` and
/// `name: DELETED`
impl fmt::Display for PropertyChanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self
            .type_change
            .iter()
            .map(|t| {
                format!("type: changed from ({}) to ({}) [{}]", t.from, t.to, ChangeCategory::Type)
            })
            .chain(self.added.iter().map(|name| format!("{}: ADDED", name)))
            .chain(self.modified.iter().map(|m| {
                format!("{}: changed from ({}) to ({}) [{}]", m.name, m.from, m.to, m.category)
            }))
            .chain(self.deleted.iter().map(|name| format!("{}: DELETED", name)));

        for (i, line) in lines.enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            f.write_str(&line)?;
        }
        Ok(())
    }
}

/// Compares the member bags of two nodes
#[derive(Debug, Clone, Copy)]
pub struct PropertyDiffer<'g> {
    max_value_depth: usize,
    graphs: Option<(&'g Graph, &'g Graph)>,
}

impl<'g> PropertyDiffer<'g> {
    /// Create a differ from configuration
    #[must_use]
    pub fn new(config: &DiffConfig) -> Self {
        Self {
            max_value_depth: config.max_value_depth,
            graphs: None,
        }
    }

    /// Resolve `NodeRef` referents in the given graphs
    ///
    /// With graphs attached, references to nodes of different types are
    /// categorized as `Type` changes.
    #[must_use]
    pub fn with_graphs(mut self, test: &'g Graph, reference: &'g Graph) -> Self {
        self.graphs = Some((test, reference));
        self
    }

    /// Diff test node `a` against reference node `b`
    ///
    /// Covers the type tag and every member.
    #[must_use]
    pub fn diff(&self, a: &Node, b: &Node) -> PropertyChanges {
        let mut changes = PropertyChanges::default();

        if a.type_tag() != b.type_tag() {
            changes.type_change = Some(TypeChange {
                from: b.type_tag().to_string(),
                to: a.type_tag().to_string(),
            });
        }

        for (name, value) in a.members() {
            match b.member(name) {
                Some(other) => {
                    if let Comparison::Differs(category) = self.compare(value, other) {
                        changes
                            .modified
                            .push(ModifiedProperty::new(name.clone(), category, other, value));
                    }
                }
                None => changes.added.push(name.clone()),
            }
        }

        changes.deleted = b
            .members()
            .keys()
            .filter(|name| a.member(name).is_none())
            .cloned()
            .collect();

        changes
    }

    /// Compare a test value against a reference value
    #[must_use]
    pub fn compare(&self, a: &Value, b: &Value) -> Comparison {
        match (a, b) {
            (Value::Scalar(x), Value::Scalar(y)) => {
                if x.kind() != y.kind() {
                    Comparison::Differs(ChangeCategory::Type)
                } else if x == y {
                    Comparison::Equal
                } else {
                    Comparison::Differs(ChangeCategory::Value)
                }
            }
            (Value::NodeRef(x), Value::NodeRef(y)) => {
                if x == y {
                    Comparison::Equal
                } else if self.referent_types_differ(x, y) {
                    Comparison::Differs(ChangeCategory::Type)
                } else {
                    Comparison::Differs(ChangeCategory::Value)
                }
            }
            (Value::List(x), Value::List(y)) if x.len() != y.len() => {
                Comparison::Differs(ChangeCategory::Count)
            }
            (Value::Map(x), Value::Map(y)) if x.len() != y.len() => {
                Comparison::Differs(ChangeCategory::Count)
            }
            (Value::List(_), Value::List(_)) | (Value::Map(_), Value::Map(_)) => {
                match structurally_equal(a, b, self.max_value_depth) {
                    Ok(true) => Comparison::Equal,
                    Ok(false) => Comparison::Differs(ChangeCategory::Value),
                    Err(fault) => {
                        tracing::warn!(
                            depth = fault.depth,
                            limit = self.max_value_depth,
                            "value nesting too deep to compare, reporting as changed"
                        );
                        Comparison::Differs(ChangeCategory::Value)
                    }
                }
            }
            _ => Comparison::Differs(ChangeCategory::Type),
        }
    }

    fn referent_types_differ(&self, test_ref: &ContentId, reference_ref: &ContentId) -> bool {
        let Some((test, reference)) = self.graphs else {
            return false;
        };
        match (test.get(test_ref), reference.get(reference_ref)) {
            (Some(x), Some(y)) => x.type_tag() != y.type_tag(),
            _ => false,
        }
    }
}

impl Default for PropertyDiffer<'_> {
    fn default() -> Self {
        Self {
            max_value_depth: DEFAULT_MAX_VALUE_DEPTH,
            graphs: None,
        }
    }
}

/// Deep structural equality over an explicit work stack
///
/// Lists compare element-wise in order; maps compare per key regardless of
/// order. References compare by content id only.
fn structurally_equal(a: &Value, b: &Value, max_depth: usize) -> Result<bool, ComparisonFault> {
    let mut stack: Vec<(&Value, &Value, usize)> = vec![(a, b, 0)];

    while let Some((x, y, depth)) = stack.pop() {
        if depth > max_depth {
            return Err(ComparisonFault { depth });
        }

        match (x, y) {
            (Value::Scalar(p), Value::Scalar(q)) => {
                if p != q {
                    return Ok(false);
                }
            }
            (Value::NodeRef(p), Value::NodeRef(q)) => {
                if p != q {
                    return Ok(false);
                }
            }
            (Value::List(p), Value::List(q)) => {
                if p.len() != q.len() {
                    return Ok(false);
                }
                stack.extend(p.iter().zip(q.iter()).map(|(l, r)| (l, r, depth + 1)));
            }
            (Value::Map(p), Value::Map(q)) => {
                if p.len() != q.len() {
                    return Ok(false);
                }
                for (key, l) in p {
                    match q.get(key) {
                        Some(r) => stack.push((l, r, depth + 1)),
                        None => return Ok(false),
                    }
                }
            }
            _ => return Ok(false),
        }
    }

    Ok(true)
}
