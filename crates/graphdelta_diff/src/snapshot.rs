//! Snapshot loading and writing.

use graphdelta_core::{ContentId, CoreError, Graph, Node};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Only supported snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Snapshot error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// No snapshot under this label
    #[error("Snapshot not found: {label}")]
    NotFound {
        /// Requested label
        label: String,
    },
    /// Format version mismatch
    #[error("Version mismatch: expected {expected}, got {actual}")]
    UnsupportedVersion {
        /// Supported version
        expected: u32,
        /// Version found in the document
        actual: u32,
    },
    /// Document could not be decoded
    #[error("Failed to decode snapshot: {0}")]
    Decode(String),
    /// Graph could not be encoded
    #[error("Failed to encode snapshot: {0}")]
    Encode(String),
    /// Underlying reader or writer failed
    #[error("Snapshot I/O failed: {0}")]
    Io(String),
    /// Root id is empty or names no object
    #[error("Snapshot root not found: {root}")]
    MissingRoot {
        /// Declared root id
        root: String,
    },
}

impl From<CoreError> for SnapshotError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MissingRoot { root } => Self::MissingRoot { root },
        }
    }
}

/// Snapshot metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// Branch or version label
    pub label: String,
    /// Format version
    pub version: u32,
}

/// Serialized form of one graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Metadata
    pub metadata: SnapshotMetadata,
    /// Root content id
    pub root: ContentId,
    /// Every object in the graph
    #[serde(default)]
    pub objects: Vec<Node>,
}

impl Snapshot {
    /// Capture a graph under a label
    #[must_use]
    pub fn from_graph(label: impl Into<String>, graph: &Graph) -> Self {
        Self {
            metadata: SnapshotMetadata {
                label: label.into(),
                version: SNAPSHOT_VERSION,
            },
            root: graph.root_id().clone(),
            objects: graph.nodes().cloned().collect(),
        }
    }

    /// Encode snapshot to JSON bytes
    ///
    /// # Errors
    ///
    /// Returns error if encoding fails
    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        serde_json::to_vec_pretty(self).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Decode snapshot from JSON bytes
    ///
    /// # Errors
    ///
    /// Returns error if the bytes are not a snapshot document
    pub fn decode(data: &[u8]) -> Result<Self, SnapshotError> {
        serde_json::from_slice(data).map_err(|e| SnapshotError::Decode(e.to_string()))
    }

    /// Check the format version
    ///
    /// # Errors
    ///
    /// Returns error if the version is not supported
    pub fn validate_version(&self) -> Result<(), SnapshotError> {
        if self.metadata.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                expected: SNAPSHOT_VERSION,
                actual: self.metadata.version,
            });
        }
        Ok(())
    }

    /// Rebuild the graph
    ///
    /// # Errors
    ///
    /// Returns error if the root is empty or absent from the objects
    pub fn into_graph(self) -> Result<Graph, SnapshotError> {
        Ok(Graph::from_parts(self.root, self.objects)?)
    }
}

/// Loads snapshots and caches their graphs by label
#[derive(Debug, Clone, Default)]
pub struct SnapshotLoader {
    cache: IndexMap<String, Graph>,
}

impl SnapshotLoader {
    /// Create a new snapshot loader
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a snapshot and cache its graph under a caller-chosen key
    ///
    /// Returns the metadata stored in the document.
    ///
    /// # Errors
    ///
    /// Returns error if decoding, version validation or root lookup fails
    pub fn load_as(
        &mut self,
        key: impl Into<String>,
        data: &[u8],
    ) -> Result<SnapshotMetadata, SnapshotError> {
        let snapshot = Snapshot::decode(data)?;
        let metadata = snapshot.metadata.clone();
        self.insert_snapshot(key.into(), snapshot)?;
        Ok(metadata)
    }

    fn insert_snapshot(&mut self, key: String, snapshot: Snapshot) -> Result<(), SnapshotError> {
        snapshot.validate_version()?;

        let graph = snapshot.into_graph()?;
        let mismatched = graph.verify_content_ids();
        if !mismatched.is_empty() {
            tracing::warn!(
                key = %key,
                count = mismatched.len(),
                "objects whose stored id differs from their content"
            );
        }

        tracing::debug!(key = %key, objects = graph.len(), "loaded snapshot");
        self.cache.insert(key, graph);
        Ok(())
    }

    /// Get a cached graph
    ///
    /// # Errors
    ///
    /// Returns error if no snapshot with this label was loaded
    pub fn load_by_label(&self, label: &str) -> Result<&Graph, SnapshotError> {
        self.cache.get(label).ok_or_else(|| SnapshotError::NotFound {
            label: label.to_string(),
        })
    }
}

/// Writes graphs as snapshot documents
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotWriter;

impl SnapshotWriter {
    /// Create a new snapshot writer (unit struct)
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Write a graph to bytes
    ///
    /// # Errors
    ///
    /// Returns error if encoding fails
    pub fn write(&self, label: &str, graph: &Graph) -> Result<Vec<u8>, SnapshotError> {
        Snapshot::from_graph(label, graph).encode()
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use graphdelta_core::Value;

    fn sample_graph() -> Graph {
        let line = Node::builder("Objects.Geometry.Line")
            .application_id("L1")
            .member("length", 2.5)
            .build();
        let root = Node::builder("Collection")
            .member("elements", Value::List(vec![Value::NodeRef(line.content_id().clone())]))
            .build();
        Graph::new(root).with_node(line)
    }

    #[test]
    fn test_snapshot_from_graph() {
        let graph = sample_graph();
        let snapshot = Snapshot::from_graph("models/testing", &graph);
        assert_eq!(snapshot.metadata.label, "models/testing");
        assert_eq!(snapshot.metadata.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.objects.len(), 2);
        assert_eq!(&snapshot.root, graph.root_id());
    }

    #[test]
    fn test_snapshot_encode_decode() {
        let graph = sample_graph();
        let bytes = SnapshotWriter::new().write("main", &graph).unwrap();
        let decoded = Snapshot::decode(&bytes).unwrap();
        assert_eq!(decoded.into_graph().unwrap(), graph);
    }

    #[test]
    fn test_decode_document() {
        let json = r#"{
            "metadata": { "label": "models/release", "version": 1 },
            "root": "r",
            "objects": [
                { "id": "r", "type": "Collection",
                  "members": { "elements": { "list": [ { "ref": "w" } ] } } },
                { "id": "w", "applicationId": "W1", "type": "Wall",
                  "members": { "height": { "scalar": 3 } } }
            ]
        }"#;

        let mut loader = SnapshotLoader::new();
        let metadata = loader.load_as("release.json", json.as_bytes()).unwrap();
        assert_eq!(metadata.label, "models/release");
        let graph = loader.load_by_label("release.json").unwrap();
        assert_eq!(graph.len(), 2);
        let wall = graph.get(&ContentId::new("w")).unwrap();
        assert_eq!(wall.application_id().map(|a| a.as_str()), Some("W1"));
        assert_eq!(wall.member("height"), Some(&Value::int(3)));
    }

    #[test]
    fn test_duplicate_object_ids_load_once() {
        let json = r#"{
            "metadata": { "label": "main", "version": 1 },
            "root": "r",
            "objects": [
                { "id": "r", "type": "Collection",
                  "members": { "elements": { "list": [ { "ref": "w" } ] } } },
                { "id": "w", "type": "Wall", "members": { "height": { "scalar": 3 } } },
                { "id": "w", "type": "Wall", "members": { "height": { "scalar": 4 } } }
            ]
        }"#;

        let mut loader = SnapshotLoader::new();
        loader.load_as("main.json", json.as_bytes()).unwrap();
        let graph = loader.load_by_label("main.json").unwrap();
        assert_eq!(graph.len(), 2);
        let wall = graph.get(&ContentId::new("w")).unwrap();
        assert_eq!(wall.content_id(), &ContentId::new("w"));
        assert_eq!(wall.member("height"), Some(&Value::int(3)));
    }

    #[test]
    fn test_load_as_keeps_same_labels_apart() {
        let mut bytes = SnapshotWriter::new().write("main", &sample_graph()).unwrap();
        let mut loader = SnapshotLoader::new();
        let first = loader.load_as("a.json", &bytes).unwrap();

        let changed = Node::builder("Collection").member("elements", Value::List(vec![])).build();
        bytes = SnapshotWriter::new().write("main", &Graph::new(changed)).unwrap();
        let second = loader.load_as("b.json", &bytes).unwrap();

        assert_eq!(first.label, "main");
        assert_eq!(second.label, "main");
        assert_eq!(loader.load_by_label("a.json").unwrap().len(), 2);
        assert_eq!(loader.load_by_label("b.json").unwrap().len(), 1);
    }

    #[test]
    fn test_load_rejects_unsupported_version() {
        let json = r#"{ "metadata": { "label": "x", "version": 2 }, "root": "r", "objects": [] }"#;
        let err = SnapshotLoader::new().load_as("x", json.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            SnapshotError::UnsupportedVersion {
                expected: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn test_load_rejects_absent_root() {
        let json = r#"{ "metadata": { "label": "x", "version": 1 }, "root": "r",
                        "objects": [ { "id": "other", "type": "T" } ] }"#;
        let err = SnapshotLoader::new().load_as("x", json.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            SnapshotError::MissingRoot {
                root: "r".to_string()
            }
        );
    }

    #[test]
    fn test_load_rejects_garbage() {
        let err = SnapshotLoader::new().load_as("x", b"not json").unwrap_err();
        assert!(matches!(err, SnapshotError::Decode(_)));
    }

    #[test]
    fn test_load_by_unknown_label() {
        let loader = SnapshotLoader::new();
        assert_eq!(
            loader.load_by_label("a").unwrap_err(),
            SnapshotError::NotFound {
                label: "a".to_string()
            }
        );
    }

    #[test]
    fn test_snapshot_error_display() {
        let err = SnapshotError::NotFound {
            label: "models/release".to_string(),
        };
        assert_eq!(err.to_string(), "Snapshot not found: models/release");
    }
}
