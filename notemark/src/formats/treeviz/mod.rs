//! Treeviz formatter for note trees
//!
//! Treeviz is a visual representation of the document tree. Each node takes one line:
//!
//! <prefix><connector> <icon> <label> (labels truncated to 30 characters)
//!
//! Example:
//!
//! ⧉ Document (1 front matter keys, 3 blocks)
//! ├─ § h1 Groceries
//! │ └─ ◦ Groceries
//! ├─ ☰ 2 items
//! │ ├─ ☐ [x] milk
//! │ │ └─ ◦ milk
//! │ └─ ☐ [ ] eggs
//! │   └─ ◦ eggs
//! └─ ¶ see the list
//!   └─ ◦ see the list
//!
//! Parameters
//!     - `"front-matter"`: list the front matter keys under a header line
//!     - `"formats"`: append the format flags to every text run label

use super::icons::{get_icon, FRONT_MATTER_ICON};
use crate::error::FormatError;
use crate::format::{flag, Format};
use crate::note::Note;
use crate::tree::{Document, NodeKey, NodeKind, TextFormat};
use std::collections::HashMap;

const LABEL_WIDTH: usize = 30;

fn truncate(label: &str) -> String {
    let flat = label.replace('\n', "↵");
    if flat.chars().count() <= LABEL_WIDTH {
        return flat;
    }
    let mut out: String = flat.chars().take(LABEL_WIDTH - 1).collect();
    out.push('…');
    out
}

fn label(doc: &Document, key: NodeKey, show_formats: bool) -> Result<String, FormatError> {
    let kind = doc.kind(key).map_err(tree_error)?;
    let text = || doc.text_content(key).map_err(tree_error);
    Ok(match kind {
        NodeKind::Root => "Document".to_string(),
        NodeKind::Heading { level } => truncate(&format!("h{} {}", level.get(), text()?)),
        NodeKind::List { .. } => {
            let count = doc.children(key).map_err(tree_error)?.len();
            format!("{count} items")
        }
        NodeKind::ListItem(item) => {
            let marker = match item.checked {
                Some(true) => "[x] ",
                Some(false) => "[ ] ",
                None => "",
            };
            truncate(&format!("{marker}{}", text()?))
        }
        NodeKind::CodeBlock(code) => {
            format!("{} ({} lines)", code.language, code.code.lines().count())
        }
        NodeKind::Drawing(drawing) => match &drawing.elements {
            serde_json::Value::Array(items) => format!("{} elements", items.len()),
            _ => "scene".to_string(),
        },
        NodeKind::Embed(embed) => truncate(&embed.src),
        NodeKind::Link(link) => truncate(&link.url),
        NodeKind::Autolink { url } => truncate(url),
        NodeKind::Text(run) => {
            let mut out = truncate(&run.text);
            if show_formats && run.format != TextFormat::NONE {
                out.push_str(&format!(" [{}]", run.format));
            }
            out
        }
        NodeKind::Paragraph | NodeKind::Quote => truncate(&text()?),
    })
}

fn tree_error(err: crate::error::TreeError) -> FormatError {
    FormatError::SerializationError(err.to_string())
}

fn format_children(
    doc: &Document,
    key: NodeKey,
    prefix: &str,
    show_formats: bool,
    output: &mut String,
) -> Result<(), FormatError> {
    let children = doc.children(key).map_err(tree_error)?;
    for (index, child) in children.iter().enumerate() {
        let is_last = index == children.len() - 1;
        let connector = if is_last { "└─" } else { "├─" };
        let icon = get_icon(doc.node_type(*child).map_err(tree_error)?);
        output.push_str(&format!(
            "{prefix}{connector} {icon} {}\n",
            label(doc, *child, show_formats)?
        ));
        let child_prefix = format!("{prefix}{}", if is_last { "  " } else { "│ " });
        format_children(doc, *child, &child_prefix, show_formats, output)?;
    }
    Ok(())
}

pub fn to_treeviz_str(note: &Note) -> Result<String, FormatError> {
    to_treeviz_str_with_params(note, &HashMap::new())
}

/// Convert a note to a treeviz string with optional parameters
pub fn to_treeviz_str_with_params(
    note: &Note,
    params: &HashMap<String, String>,
) -> Result<String, FormatError> {
    let doc = &note.document;
    let root = doc.root();
    let blocks = doc.children(root).map_err(tree_error)?.len();
    let mut output = format!(
        "{} Document ({} front matter keys, {} blocks)\n",
        get_icon(doc.node_type(root).map_err(tree_error)?),
        note.front_matter.len(),
        blocks
    );

    if flag(params, "front-matter") {
        for (key, value) in &note.front_matter {
            output.push_str(&format!(
                "{FRONT_MATTER_ICON} {}\n",
                truncate(&format!("{key}: {value}"))
            ));
        }
    }

    format_children(doc, root, "", flag(params, "formats"), &mut output)?;
    Ok(output)
}

/// Format implementation for treeviz format
pub struct TreevizFormat;

impl Format for TreevizFormat {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn description(&self) -> &str {
        "Visual tree representation with indentation and Unicode icons"
    }

    fn file_extensions(&self) -> &[&str] {
        &["tree", "treeviz"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, note: &Note) -> Result<String, FormatError> {
        to_treeviz_str(note)
    }

    fn serialize_with_options(
        &self,
        note: &Note,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        to_treeviz_str_with_params(note, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformers::TransformerRegistry;

    #[test]
    fn long_labels_are_truncated() {
        let label = truncate("abcdefghijklmnopqrstuvwxyz0123456789");
        assert_eq!(label.chars().count(), LABEL_WIDTH);
        assert!(label.ends_with('…'));
    }

    #[test]
    fn renders_nested_lists() {
        let note = Note::load("- [x] milk\n- [ ] eggs", &TransformerRegistry::default()).unwrap();
        let output = to_treeviz_str(&note).unwrap();
        let expected = [
            "⧉ Document (0 front matter keys, 1 blocks)",
            "└─ ☰ 2 items",
            "  ├─ ☐ [x] milk",
            "  │ └─ ◦ milk",
            "  └─ ☐ [ ] eggs",
            "    └─ ◦ eggs",
        ];
        assert_eq!(output, format!("{}\n", expected.join("\n")));
    }
}
