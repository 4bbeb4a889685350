//! A note as stored on disk: front matter plus a Markdown body.

use crate::error::{ExportError, ImportError};
use crate::frontmatter::{parse_front_matter, serialize_front_matter, FrontMatter};
use crate::markdown;
use crate::transformers::TransformerRegistry;
use crate::tree::Document;

#[derive(Debug, Clone)]
pub struct Note {
    pub front_matter: FrontMatter,
    pub document: Document,
}

impl Note {
    /// Split off the front matter and import the body.
    pub fn load(text: &str, registry: &TransformerRegistry) -> Result<Note, ImportError> {
        let parsed = parse_front_matter(text);
        let document = markdown::parse(&parsed.content, registry)?;
        Ok(Note {
            front_matter: parsed.front_matter,
            document,
        })
    }

    /// Export the body and put the front matter back in front of it.
    pub fn to_markdown(&self, registry: &TransformerRegistry) -> Result<String, ExportError> {
        let body = markdown::export_with(&self.document, None, registry)?;
        if self.front_matter.is_empty() {
            return Ok(body);
        }
        Ok(format!("{}{body}", serialize_front_matter(&self.front_matter)))
    }

    /// Prepare a save against the previously persisted text.
    pub fn save(
        &self,
        previous: Option<String>,
        origin: ChangeOrigin,
        registry: &TransformerRegistry,
    ) -> Result<NoteSave, ExportError> {
        Ok(NoteSave {
            previous,
            markdown: self.to_markdown(registry)?,
            origin,
        })
    }
}

/// Who produced a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Typed in this editor.
    Local,
    /// Loaded because another window or process changed the file.
    External,
}

/// Everything a writer needs to decide whether and how to persist a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSave {
    pub previous: Option<String>,
    pub markdown: String,
    pub origin: ChangeOrigin,
}

impl NoteSave {
    /// True when writing would not change the file.
    pub fn is_unchanged(&self) -> bool {
        self.previous.as_deref() == Some(self.markdown.as_str())
    }

    /// Only local edits that change the text are written back.
    pub fn should_write(&self) -> bool {
        self.origin == ChangeOrigin::Local && !self.is_unchanged()
    }
}
