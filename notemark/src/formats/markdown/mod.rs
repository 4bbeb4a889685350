//! Markdown format implementation
//!
//! Thin adapter from the [`Format`] interface onto the Markdown engine in [`crate::markdown`]
//! and the front matter codec. Parsing splits off front matter and imports the body; serializing
//! exports the tree and puts the front matter back in front.
//!
//! # Element Mapping Table
//!
//! | Node              | Markdown                                   |
//! |-------------------|--------------------------------------------|
//! | Heading (1..=3)   | `#`, `##`, `###`                           |
//! | Paragraph         | plain line, leading triggers escaped       |
//! | Quote             | `> text`                                   |
//! | Bullet list       | `- item`, indent per nesting level         |
//! | Numbered list     | `N. item`                                  |
//! | Check list        | `- [x] item` / `- [ ] item`                |
//! | Code block        | ```` ```lang id=".." isCollapsed=".." ```` |
//! | Drawing           | ```` ```drawing ```` + JSON payload        |
//! | Image/video/file  | `![alt?width=..&height=..](src)`           |
//! | Link              | `[text](url "title")`                      |
//! | Autolink          | bare URL                                   |
//! | Bold/italic/...   | `**`, `_`, `~~`, `` ` ``                   |
//!
//! # Lossy Conversions
//!
//! - Underline has no Markdown spelling and is dropped
//! - Consecutive quote lines import as separate quotes
//! - Link targets and `rel` attributes are not written

use crate::error::FormatError;
use crate::format::Format;
use crate::note::Note;
use crate::transformers::TransformerRegistry;

/// Format implementation for Markdown notes
pub struct MarkdownFormat {
    registry: TransformerRegistry,
}

impl MarkdownFormat {
    pub fn new(registry: TransformerRegistry) -> Self {
        MarkdownFormat { registry }
    }

    pub fn registry(&self) -> &TransformerRegistry {
        &self.registry
    }
}

impl Default for MarkdownFormat {
    fn default() -> Self {
        Self::new(TransformerRegistry::default())
    }
}

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "Note Markdown with front matter"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Note, FormatError> {
        Ok(Note::load(source, &self.registry)?)
    }

    fn serialize(&self, note: &Note) -> Result<String, FormatError> {
        Ok(note.to_markdown(&self.registry)?)
    }
}
