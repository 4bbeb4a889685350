//! Transformer registry
//!
//!     The importer and the exporter are both driven by one ordered table of transformers. There
//!     are three families, matching the three ways Markdown syntax maps onto the tree:
//!
//!         - element transformers: a whole line's prefix to and from a block node
//!         - text-format transformers: a paired tag (`**`, `_`, `~~`, `` ` ``) to and from format flags
//!         - text-match transformers: a bounded inline span (links, embeds) to and from an inline node
//!
//!     Order is significant inside each family: the first element transformer whose pattern
//!     matches wins, text-format tags that open at the same position are tried in declaration
//!     order, and the earliest text-match wins with ties going to the earlier transformer.
//!
//!     The registry is built once from [`RegistryOptions`] and is read-only afterwards, so one
//!     instance can be shared by every session. [`TransformerRegistry::shared`] hands out the
//!     process-wide default.

pub mod element;
pub mod text_format;
pub mod text_match;

pub use element::ElementTransformer;
pub use text_format::{InlineMatch, TextFormatTable, TextFormatTransformer};
pub use text_match::TextMatchTransformer;

use crate::error::ExportError;
use crate::tree::{Document, NodeKey};
use once_cell::sync::Lazy;

/// Languages accepted in fenced code blocks when nothing else is configured.
pub const DEFAULT_LANGUAGES: &[&str] = &["python", "go", "javascript", "java", "text"];

/// Knobs that shape the transformer table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Language tokens accepted in code fences.
    pub languages: Vec<String>,
    /// Language used for fences that carry no token.
    pub fallback_language: String,
    /// Fence token that marks a drawing payload.
    pub drawing_language: String,
    /// Fail the import on malformed drawing payloads instead of degrading to text.
    pub strict_drawings: bool,
    /// Treat backslash-escaped tags as literals (look-behind emulation).
    pub honor_escapes: bool,
    /// Columns per list nesting level.
    pub list_indent: usize,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        RegistryOptions {
            languages: DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect(),
            fallback_language: "text".to_string(),
            drawing_language: "drawing".to_string(),
            strict_drawings: true,
            honor_escapes: true,
            list_indent: 4,
        }
    }
}

impl RegistryOptions {
    pub fn supports_language(&self, language: &str) -> bool {
        self.languages.iter().any(|l| l == language)
    }

    pub fn is_drawing(&self, language: &str) -> bool {
        self.drawing_language == language
    }
}

/// Mutable state handed to import-side transformers.
pub struct ImportContext<'a> {
    pub doc: &'a mut Document,
    pub options: &'a RegistryOptions,
    /// False when a transformer runs as a typing shortcut rather than during a full import.
    pub is_import: bool,
}

/// Read-only state handed to export-side transformers.
pub struct ExportContext<'a> {
    pub doc: &'a Document,
    pub registry: &'a TransformerRegistry,
}

impl<'a> ExportContext<'a> {
    pub fn new(doc: &'a Document, registry: &'a TransformerRegistry) -> Self {
        ExportContext { doc, registry }
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.registry.options
    }

    /// Render the inline children of `block` as one line of Markdown.
    pub fn inline(&self, block: NodeKey) -> Result<String, ExportError> {
        crate::markdown::export::export_inline(self, block)
    }
}

/// The ordered transformer table.
pub struct TransformerRegistry {
    options: RegistryOptions,
    elements: Vec<Box<dyn ElementTransformer>>,
    text_formats: TextFormatTable,
    text_matches: Vec<Box<dyn TextMatchTransformer>>,
}

static SHARED: Lazy<TransformerRegistry> = Lazy::new(TransformerRegistry::default);

impl TransformerRegistry {
    /// Build the standard table.
    pub fn new(options: RegistryOptions) -> Self {
        TransformerRegistry {
            elements: element::defaults(),
            text_formats: TextFormatTable::new(text_format::defaults(), options.honor_escapes),
            text_matches: text_match::defaults(),
            options,
        }
    }

    /// Build a registry from explicit parts.
    pub fn from_parts(
        options: RegistryOptions,
        elements: Vec<Box<dyn ElementTransformer>>,
        text_formats: Vec<TextFormatTransformer>,
        text_matches: Vec<Box<dyn TextMatchTransformer>>,
    ) -> Self {
        TransformerRegistry {
            elements,
            text_formats: TextFormatTable::new(text_formats, options.honor_escapes),
            text_matches,
            options,
        }
    }

    /// The process-wide registry built from default options.
    pub fn shared() -> &'static TransformerRegistry {
        &SHARED
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    pub fn elements(&self) -> &[Box<dyn ElementTransformer>] {
        &self.elements
    }

    pub fn text_formats(&self) -> &TextFormatTable {
        &self.text_formats
    }

    pub fn text_matches(&self) -> &[Box<dyn TextMatchTransformer>] {
        &self.text_matches
    }

    /// Names of every transformer, in table order.
    pub fn names(&self) -> Vec<&str> {
        self.elements
            .iter()
            .map(|t| t.name())
            .chain(self.text_formats.transformers().iter().map(|t| t.name()))
            .chain(self.text_matches.iter().map(|t| t.name()))
            .collect()
    }
}

impl Default for TransformerRegistry {
    fn default() -> Self {
        Self::new(RegistryOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_order() {
        let registry = TransformerRegistry::default();
        assert_eq!(
            registry.names(),
            vec![
                "code-block",
                "heading",
                "check-list",
                "unordered-list",
                "ordered-list",
                "quote",
                "embed",
                "paragraph",
                "bold-italic-star",
                "bold-italic-underscore",
                "bold-star",
                "bold-underscore",
                "italic-star",
                "italic-underscore",
                "strikethrough",
                "inline-code",
                "file-embed",
                "link",
                "autolink",
            ]
        );
    }

    #[test]
    fn shared_registry_uses_default_languages() {
        let options = TransformerRegistry::shared().options();
        assert!(options.supports_language("python"));
        assert!(!options.supports_language("cobol"));
        assert!(options.is_drawing("drawing"));
    }
}
