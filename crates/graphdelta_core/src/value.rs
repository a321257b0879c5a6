//! Member values of a node.
//!
//! A [`Value`] is a tagged union; a `NodeRef` is a weak reference to another
//! node of the same graph and never implies ownership.

use crate::hash::{tag, ContentHasher};
use crate::id::ContentId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A primitive value
///
/// Floats compare bitwise so that equality always agrees with hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Text
    Text(String),
}

/// The kind of a scalar, used to tell type changes from value changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    /// Null
    Null,
    /// Boolean
    Bool,
    /// Integer
    Int,
    /// Float
    Float,
    /// Text
    Text,
}

impl Scalar {
    /// Get the kind of this scalar
    #[must_use]
    pub const fn kind(&self) -> ScalarKind {
        match self {
            Self::Null => ScalarKind::Null,
            Self::Bool(_) => ScalarKind::Bool,
            Self::Int(_) => ScalarKind::Int,
            Self::Float(_) => ScalarKind::Float,
            Self::Text(_) => ScalarKind::Text,
        }
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        match self {
            Self::Null => hasher.write_tag(tag::NULL),
            Self::Bool(b) => hasher.write_u64(tag::BOOL, u64::from(*b)),
            Self::Int(i) => hasher.write_u64(tag::INT, *i as u64),
            Self::Float(x) => hasher.write_u64(tag::FLOAT, x.to_bits()),
            Self::Text(s) => hasher.write_str(tag::TEXT, s),
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Scalar {}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// A member value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// Primitive value
    Scalar(Scalar),
    /// Weak reference to another node by content id
    #[serde(rename = "ref")]
    NodeRef(ContentId),
    /// Ordered list, order-significant
    List(Vec<Value>),
    /// Keyed map, order-insignificant
    Map(IndexMap<String, Value>),
}

/// Variant of a [`Value`], without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// Scalar of the given kind
    Scalar(ScalarKind),
    /// Node reference
    NodeRef,
    /// List
    List,
    /// Map
    Map,
}

impl Value {
    /// Null scalar
    #[must_use]
    pub const fn null() -> Self {
        Self::Scalar(Scalar::Null)
    }

    /// Integer scalar
    #[must_use]
    pub const fn int(value: i64) -> Self {
        Self::Scalar(Scalar::Int(value))
    }

    /// Float scalar
    #[must_use]
    pub const fn float(value: f64) -> Self {
        Self::Scalar(Scalar::Float(value))
    }

    /// Boolean scalar
    #[must_use]
    pub const fn bool(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }

    /// Text scalar
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::Text(value.into()))
    }

    /// Reference to another node
    #[must_use]
    pub fn node_ref(id: impl Into<ContentId>) -> Self {
        Self::NodeRef(id.into())
    }

    /// Map from key/value pairs, keeping the given order
    #[must_use]
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Get the variant of this value
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Scalar(s) => ValueKind::Scalar(s.kind()),
            Self::NodeRef(_) => ValueKind::NodeRef,
            Self::List(_) => ValueKind::List,
            Self::Map(_) => ValueKind::Map,
        }
    }

    /// All node references in this value, at any depth, in traversal order
    #[must_use]
    pub fn node_refs(&self) -> Vec<&ContentId> {
        let mut refs = Vec::new();
        let mut stack = vec![self];

        while let Some(value) = stack.pop() {
            match value {
                Self::Scalar(_) => {}
                Self::NodeRef(id) => refs.push(id),
                Self::List(items) => stack.extend(items.iter().rev()),
                Self::Map(entries) => stack.extend(entries.values().rev()),
            }
        }

        refs
    }

    /// Write this value into a canonical hash stream
    ///
    /// Map entries are written in key order; list items in list order.
    pub fn hash_into(&self, hasher: &mut ContentHasher) {
        enum Item<'a> {
            Key(&'a str),
            Value(&'a Value),
        }

        let mut stack = vec![Item::Value(self)];
        while let Some(item) = stack.pop() {
            let value = match item {
                Item::Key(key) => {
                    hasher.write_str(tag::MEMBER, key);
                    continue;
                }
                Item::Value(value) => value,
            };

            match value {
                Self::Scalar(s) => s.hash_into(hasher),
                Self::NodeRef(id) => hasher.write_str(tag::NODE_REF, id.as_str()),
                Self::List(items) => {
                    hasher.write_tag(tag::LIST);
                    hasher.write_len(items.len());
                    stack.extend(items.iter().rev().map(Item::Value));
                }
                Self::Map(entries) => {
                    hasher.write_tag(tag::MAP);
                    hasher.write_len(entries.len());
                    let mut sorted: Vec<(&String, &Value)> = entries.iter().collect();
                    sorted.sort_by(|a, b| a.0.cmp(b.0));
                    for (key, value) in sorted.into_iter().rev() {
                        stack.push(Item::Value(value));
                        stack.push(Item::Key(key));
                    }
                }
            }
        }
    }
}

/// Short rendering: scalars as written, containers by size only
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => write!(f, "{}", scalar),
            Self::NodeRef(id) => write!(f, "ref({})", id),
            Self::List(items) => write!(f, "list({})", items.len()),
            Self::Map(entries) => write!(f, "map({})", entries.len()),
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(value: &Value) -> crate::Hash {
        let mut hasher = ContentHasher::new();
        value.hash_into(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_scalar_kind() {
        assert_eq!(Scalar::Int(1).kind(), ScalarKind::Int);
        assert_eq!(Scalar::Float(1.0).kind(), ScalarKind::Float);
        assert_ne!(Scalar::Int(1), Scalar::Float(1.0));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::int(3).to_string(), "3");
        assert_eq!(Value::text("wall").to_string(), "\"wall\"");
        assert_eq!(Value::null().to_string(), "null");
        assert_eq!(Value::node_ref("c1").to_string(), "ref(c1)");
        assert_eq!(Value::List(vec![Value::int(1), Value::int(2)]).to_string(), "list(2)");
        assert_eq!(Value::map([("x", Value::int(1))]).to_string(), "map(1)");
    }

    #[test]
    fn test_float_equality_is_bitwise() {
        assert_eq!(Scalar::Float(f64::NAN), Scalar::Float(f64::NAN));
        assert_ne!(Scalar::Float(0.0), Scalar::Float(-0.0));
    }

    #[test]
    fn test_map_equality_ignores_order() {
        let a = Value::map([("x", Value::int(1)), ("y", Value::int(2))]);
        let b = Value::map([("y", Value::int(2)), ("x", Value::int(1))]);
        assert_eq!(a, b);
        assert_eq!(digest(&a), digest(&b));
    }

    #[test]
    fn test_list_hash_is_order_sensitive() {
        let a = Value::List(vec![Value::int(1), Value::int(2)]);
        let b = Value::List(vec![Value::int(2), Value::int(1)]);
        assert_ne!(a, b);
        assert_ne!(digest(&a), digest(&b));
    }

    #[test]
    fn test_hash_distinguishes_kinds() {
        assert_ne!(digest(&Value::int(1)), digest(&Value::float(1.0)));
        assert_ne!(digest(&Value::text("abc")), digest(&Value::node_ref("abc")));
        assert_ne!(
            digest(&Value::List(vec![])),
            digest(&Value::Map(IndexMap::new()))
        );
    }

    #[test]
    fn test_node_refs_nested() {
        let value = Value::List(vec![
            Value::node_ref("a"),
            Value::map([("inner", Value::List(vec![Value::node_ref("b")]))]),
            Value::int(3),
            Value::node_ref("c"),
        ]);
        let refs: Vec<&str> = value.node_refs().into_iter().map(|id| id.as_str()).collect();
        assert_eq!(refs, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_value_json_shape() {
        let value = Value::List(vec![Value::int(1), Value::node_ref("n1"), Value::null()]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"list":[{"scalar":1},{"ref":"n1"},{"scalar":null}]}"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_scalar_json_int_vs_float() {
        let int: Value = serde_json::from_str(r#"{"scalar":2}"#).unwrap();
        let float: Value = serde_json::from_str(r#"{"scalar":2.5}"#).unwrap();
        assert_eq!(int.kind(), ValueKind::Scalar(ScalarKind::Int));
        assert_eq!(float.kind(), ValueKind::Scalar(ScalarKind::Float));
    }
}
