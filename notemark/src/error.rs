//! Error types for tree, import, export and format operations

use crate::tree::{NodeKey, NodeType};
use thiserror::Error;

/// Errors raised by arena operations on a [`crate::tree::Document`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The key does not resolve to a live node in this document
    #[error("node {0} does not exist")]
    MissingNode(NodeKey),
    /// The node already has a parent and must be detached first
    #[error("node {0} is already attached to a parent")]
    AlreadyAttached(NodeKey),
    /// Attaching the node would make it its own ancestor
    #[error("attaching node {child} under {parent} would create a cycle")]
    Cycle { parent: NodeKey, child: NodeKey },
    /// The node is a leaf (text) or the root is being moved
    #[error("node {0} cannot hold children")]
    NotAContainer(NodeKey),
    /// A text operation was requested on a non-text node
    #[error("node {0} is not a text node")]
    NotText(NodeKey),
    /// The root cannot be detached, replaced or removed
    #[error("the root node cannot be detached")]
    RootIsFixed,
    /// A split offset is not on a char boundary or past the end of the text
    #[error("offset {offset} is not a valid split point for node {key}")]
    InvalidOffset { key: NodeKey, offset: usize },
}

/// Errors surfaced by [`crate::markdown::import`]
#[derive(Debug, Error)]
pub enum ImportError {
    /// A fenced drawing block whose body is not a JSON array or object
    #[error("malformed drawing payload in fence starting at line {line}: {source}")]
    MalformedDrawing {
        /// 1-based line number of the opening fence
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    /// A drawing body that parsed as JSON but is neither an array nor an object
    #[error("drawing payload in fence starting at line {line} must be a JSON array or object")]
    UnexpectedDrawingShape { line: usize },
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Errors surfaced by [`crate::markdown::export`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// No export transformer claimed a node that is reachable from the exported subtree
    #[error("no export transformer handles {node_type} node {key}")]
    UnhandledNode { key: NodeKey, node_type: NodeType },
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Errors that can occur during format operations
#[derive(Debug, Error)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    /// Error during parsing
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Format does not support the requested operation
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

impl From<ImportError> for FormatError {
    fn from(err: ImportError) -> Self {
        FormatError::ParseError(err.to_string())
    }
}

impl From<ExportError> for FormatError {
    fn from(err: ExportError) -> Self {
        FormatError::SerializationError(err.to_string())
    }
}
