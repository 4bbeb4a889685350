//! Markdown engine: import into a [`Document`] and export back out.
//!
//! The free functions use the process-wide [`TransformerRegistry::shared`] table; the `_with`
//! variants take an explicit registry.

pub mod escape;
pub mod export;
pub mod fence;
pub mod import;
pub mod inline;

use crate::error::{ExportError, ImportError};
use crate::transformers::TransformerRegistry;
use crate::tree::{Document, NodeKey};

/// Replace the content of `target` (default: the root) with the blocks of `markdown`.
pub fn import(
    markdown: &str,
    doc: &mut Document,
    target: Option<NodeKey>,
) -> Result<(), ImportError> {
    import::import_into(markdown, doc, target, TransformerRegistry::shared())
}

pub fn import_with(
    markdown: &str,
    doc: &mut Document,
    target: Option<NodeKey>,
    registry: &TransformerRegistry,
) -> Result<(), ImportError> {
    import::import_into(markdown, doc, target, registry)
}

/// Parse `markdown` into a fresh document.
pub fn parse(markdown: &str, registry: &TransformerRegistry) -> Result<Document, ImportError> {
    let mut doc = Document::new();
    import::import_into(markdown, &mut doc, None, registry)?;
    Ok(doc)
}

/// Serialize the subtree at `node` (default: the whole document).
pub fn export(doc: &Document, node: Option<NodeKey>) -> Result<String, ExportError> {
    export::export_document(doc, node, TransformerRegistry::shared())
}

pub fn export_with(
    doc: &Document,
    node: Option<NodeKey>,
    registry: &TransformerRegistry,
) -> Result<String, ExportError> {
    export::export_document(doc, node, registry)
}
