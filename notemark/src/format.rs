//! Format trait definition
//!
//! This module defines the Format trait that every output format implements. A format converts
//! between a string representation and a [`Note`] (front matter plus document tree). Formats can
//! support parsing, serialization, or both.

use crate::error::FormatError;
use crate::note::Note;
use std::collections::HashMap;

/// Trait for note formats
///
/// # Examples
///
/// ```ignore
/// struct Outline;
///
/// impl Format for Outline {
///     fn name(&self) -> &str {
///         "outline"
///     }
///
///     fn supports_serialization(&self) -> bool {
///         true
///     }
///
///     fn serialize(&self, note: &Note) -> Result<String, FormatError> {
///         // Walk note.document and render it
///         todo!()
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// The name of this format (e.g., "markdown", "treeviz", "json")
    fn name(&self) -> &str;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// File extensions associated with this format, without the leading dot.
    /// Used for format detection from filenames.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Whether this format supports parsing (source → Note)
    fn supports_parsing(&self) -> bool {
        false
    }

    /// Whether this format supports serialization (Note → source)
    fn supports_serialization(&self) -> bool {
        false
    }

    /// Parse source text into a Note
    fn parse(&self, _source: &str) -> Result<Note, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support parsing",
            self.name()
        )))
    }

    /// Serialize a Note into source text
    fn serialize(&self, _note: &Note) -> Result<String, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support serialization",
            self.name()
        )))
    }

    /// Serialize a Note with extra parameters.
    ///
    /// The default implementation delegates to [`Format::serialize`] and rejects any
    /// parameter. Formats that take parameters override this method.
    fn serialize_with_options(
        &self,
        note: &Note,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        if options.is_empty() {
            self.serialize(note)
        } else {
            Err(FormatError::NotSupported(format!(
                "Format '{}' does not support extra parameters",
                self.name()
            )))
        }
    }
}

/// Read a boolean parameter; anything but `"false"` counts as set.
pub(crate) fn flag(options: &HashMap<String, String>, key: &str) -> bool {
    options
        .get(key)
        .map(|v| !v.eq_ignore_ascii_case("false"))
        .unwrap_or(false)
}
