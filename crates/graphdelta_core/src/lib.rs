//! graphdelta core types
//!
//! Pure types with no I/O: content hashing, identifiers, member values,
//! nodes and the rooted graph arena.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod graph;
pub mod hash;
pub mod id;
pub mod node;
pub mod value;

// Re-exports
pub use error::{CoreError, CoreResult};
pub use graph::Graph;
pub use hash::{ContentHasher, Hash};
pub use id::{ApplicationId, ContentId};
pub use node::{compute_content_id, Node, NodeBuilder};
pub use value::{Scalar, ScalarKind, Value, ValueKind};
