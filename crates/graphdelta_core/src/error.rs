//! Core error types for graphdelta.

use std::fmt;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Root node absent from the graph
    MissingRoot {
        /// Root id that was looked up (empty if none was given)
        root: String,
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRoot { root } if root.is_empty() => {
                write!(f, "Graph has no root node")
            }
            Self::MissingRoot { root } => write!(f, "Root node not found: {}", root),
        }
    }
}

impl std::error::Error for CoreError {}
