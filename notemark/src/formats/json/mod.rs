//! JSON format
//!
//! Serializes a note as `{"front_matter": {...}, "document": {...}}`, where the document is the
//! snapshot of the root with every node's attributes inline. Set the `"pretty"` parameter for
//! indented output.

use crate::error::FormatError;
use crate::format::{flag, Format};
use crate::frontmatter::FrontMatter;
use crate::note::Note;
use crate::tree::NodeSnapshot;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Serialize)]
struct JsonNote<'a> {
    front_matter: &'a FrontMatter,
    document: NodeSnapshot,
}

pub fn to_json_value(note: &Note) -> Result<serde_json::Value, FormatError> {
    let document = note
        .document
        .snapshot(note.document.root())
        .map_err(|err| FormatError::SerializationError(err.to_string()))?;
    serde_json::to_value(JsonNote {
        front_matter: &note.front_matter,
        document,
    })
    .map_err(|err| FormatError::SerializationError(err.to_string()))
}

pub struct JsonFormat;

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "JSON snapshot of the document tree and front matter"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, note: &Note) -> Result<String, FormatError> {
        self.serialize_with_options(note, &HashMap::new())
    }

    fn serialize_with_options(
        &self,
        note: &Note,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        let value = to_json_value(note)?;
        let text = if flag(options, "pretty") {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        text.map_err(|err| FormatError::SerializationError(err.to_string()))
    }
}
