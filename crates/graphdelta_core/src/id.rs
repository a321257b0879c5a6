//! Identifiers for graph nodes.
//!
//! A node always has a [`ContentId`]; an [`ApplicationId`] is optional and
//! may be shared by several nodes.

use crate::hash::Hash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content identifier - deterministic hash of a node's full content
///
/// Ids produced by [`ContentId::from_hash`] are 64 lowercase hex chars.
/// Ids supplied by an external store are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Create from an externally supplied id string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create from a computed content hash
    #[must_use]
    pub fn from_hash(hash: Hash) -> Self {
        Self(hash.to_hex())
    }

    /// Get as string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether the id is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<Hash> for ContentId {
    fn from(hash: Hash) -> Self {
        Self::from_hash(hash)
    }
}

/// Application identifier - caller-supplied, optional, not unique
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Parse an application id, treating empty or whitespace-only input as absent
    #[must_use]
    pub fn parse(id: &str) -> Option<Self> {
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id.to_string()))
        }
    }

    /// Normalize an optional raw id
    #[must_use]
    pub fn from_optional(id: Option<&str>) -> Option<Self> {
        id.and_then(Self::parse)
    }

    /// Get as string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_id_from_hash() {
        let hash = Hash::compute(b"node");
        let id = ContentId::from_hash(hash);
        assert_eq!(id.as_str(), hash.to_hex());
        assert_eq!(id.to_string().len(), 64);
    }

    #[test]
    fn test_content_id_external() {
        let id = ContentId::from("3f2a9c");
        assert_eq!(id.as_str(), "3f2a9c");
        assert!(!id.is_empty());
    }

    #[test]
    fn test_application_id_blank_is_absent() {
        assert!(ApplicationId::parse("").is_none());
        assert!(ApplicationId::parse("   ").is_none());
        assert!(ApplicationId::from_optional(None).is_none());
        assert_eq!(ApplicationId::parse("A1").unwrap().as_str(), "A1");
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let id = ContentId::new("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        let app: ApplicationId = serde_json::from_str("\"wall-1\"").unwrap();
        assert_eq!(app.as_str(), "wall-1");
    }
}
