//! Immutable structural records.

use crate::hash::{tag, ContentHasher};
use crate::id::{ApplicationId, ContentId};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// A node of an object graph
///
/// Nodes are immutable once built. Member order is kept for display only;
/// it never affects equality or the content id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "id")]
    content_id: ContentId,
    #[serde(
        rename = "applicationId",
        default,
        deserialize_with = "deserialize_application_id",
        skip_serializing_if = "Option::is_none"
    )]
    application_id: Option<ApplicationId>,
    #[serde(rename = "type")]
    type_tag: String,
    #[serde(default)]
    members: IndexMap<String, Value>,
}

fn deserialize_application_id<'de, D>(deserializer: D) -> Result<Option<ApplicationId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(ApplicationId::from_optional(raw.as_deref()))
}

impl Node {
    /// Create a node whose content id is computed from its content
    #[must_use]
    pub fn new(
        type_tag: impl Into<String>,
        application_id: Option<ApplicationId>,
        members: IndexMap<String, Value>,
    ) -> Self {
        let type_tag = type_tag.into();
        let content_id = compute_content_id(&type_tag, application_id.as_ref(), &members);
        Self {
            content_id,
            application_id,
            type_tag,
            members,
        }
    }

    /// Create a node with an externally supplied content id
    ///
    /// The id is trusted as-is; see [`Node::has_valid_content_id`].
    #[must_use]
    pub fn with_content_id(
        content_id: ContentId,
        type_tag: impl Into<String>,
        application_id: Option<ApplicationId>,
        members: IndexMap<String, Value>,
    ) -> Self {
        Self {
            content_id,
            application_id,
            type_tag: type_tag.into(),
            members,
        }
    }

    /// Start building a node of the given type
    #[must_use]
    pub fn builder(type_tag: impl Into<String>) -> NodeBuilder {
        NodeBuilder::new(type_tag)
    }

    /// Get the content id
    #[must_use]
    pub fn content_id(&self) -> &ContentId {
        &self.content_id
    }

    /// Get the application id, if any
    #[must_use]
    pub fn application_id(&self) -> Option<&ApplicationId> {
        self.application_id.as_ref()
    }

    /// Get the type tag
    #[must_use]
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Get all members
    #[must_use]
    pub fn members(&self) -> &IndexMap<String, Value> {
        &self.members
    }

    /// Get a member by name
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Value> {
        self.members.get(name)
    }

    /// All node references held by this node, in member order
    #[must_use]
    pub fn node_refs(&self) -> Vec<&ContentId> {
        self.members.values().flat_map(Value::node_refs).collect()
    }

    /// Recompute the content id from the node's content
    #[must_use]
    pub fn recompute_content_id(&self) -> ContentId {
        compute_content_id(&self.type_tag, self.application_id.as_ref(), &self.members)
    }

    /// Check whether the stored content id matches the content
    #[must_use]
    pub fn has_valid_content_id(&self) -> bool {
        self.recompute_content_id() == self.content_id
    }
}

/// Compute the content id for the given node content
///
/// Members are hashed in name order; a `NodeRef` contributes only the
/// referent's id, so hashing never follows edges.
#[must_use]
pub fn compute_content_id(
    type_tag: &str,
    application_id: Option<&ApplicationId>,
    members: &IndexMap<String, Value>,
) -> ContentId {
    let mut hasher = ContentHasher::new();
    hasher.write_str(tag::TYPE_TAG, type_tag);
    match application_id {
        Some(app_id) => hasher.write_str(tag::APP_ID, app_id.as_str()),
        None => hasher.write_tag(tag::NO_APP_ID),
    }

    let mut names: Vec<&String> = members.keys().collect();
    names.sort();
    hasher.write_len(names.len());
    for name in names {
        hasher.write_str(tag::MEMBER, name);
        if let Some(value) = members.get(name) {
            value.hash_into(&mut hasher);
        }
    }

    ContentId::from_hash(hasher.finish())
}

/// Builder for [`Node`]
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    type_tag: String,
    application_id: Option<ApplicationId>,
    content_id: Option<ContentId>,
    members: IndexMap<String, Value>,
}

impl NodeBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            application_id: None,
            content_id: None,
            members: IndexMap::new(),
        }
    }

    /// Set the application id (blank ids are ignored)
    #[must_use]
    pub fn application_id(mut self, id: &str) -> Self {
        self.application_id = ApplicationId::parse(id);
        self
    }

    /// Use an explicit content id instead of computing one
    #[must_use]
    pub fn content_id(mut self, id: impl Into<ContentId>) -> Self {
        self.content_id = Some(id.into());
        self
    }

    /// Add or replace a member
    #[must_use]
    pub fn member(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.insert(name.into(), value.into());
        self
    }

    /// Build the node
    #[must_use]
    pub fn build(self) -> Node {
        match self.content_id {
            Some(id) => Node::with_content_id(id, self.type_tag, self.application_id, self.members),
            None => Node::new(self.type_tag, self.application_id, self.members),
        }
    }
}
