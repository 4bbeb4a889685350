//! Markdown shortcuts
//!
//!     While typing, the editor hands over the text node holding the caret after every
//!     keystroke. Three checks run in order and the first one that changes the tree wins:
//!
//!         - element transformers, when the caret sits right after the prefix of the first text
//!           node of a paragraph (`# `, `- `, `` ```py ``)
//!         - text-match transformers whose trigger character was just typed, using their
//!           end-anchored shortcut pattern
//!         - text-format transformers, when the text before the caret ends in a closing tag
//!
//!     Text already formatted as inline code is never rewritten.

use crate::error::TreeError;
use crate::transformers::text_format::is_escaped;
use crate::transformers::{ImportContext, TransformerRegistry};
use crate::tree::{Document, NodeKey, NodeKind, Selection, TextFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKind {
    Element,
    TextMatch,
    TextFormat,
}

/// The shortcut that fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied<'r> {
    pub kind: ShortcutKind,
    pub transformer: &'r str,
}

/// Run the shortcuts for a caret at byte `caret` inside the text node `text`.
pub fn run<'r>(
    doc: &mut Document,
    registry: &'r TransformerRegistry,
    text: NodeKey,
    caret: usize,
) -> Result<Option<Applied<'r>>, TreeError> {
    let content = doc.text(text)?.to_string();
    if caret == 0 || caret > content.len() || !content.is_char_boundary(caret) {
        return Ok(None);
    }
    if doc.format(text)?.contains(TextFormat::CODE) {
        return Ok(None);
    }

    if let Some(name) = run_element(doc, registry, text, &content, caret)? {
        return Ok(Some(Applied {
            kind: ShortcutKind::Element,
            transformer: name,
        }));
    }
    if let Some(name) = run_text_match(doc, registry, text, &content, caret)? {
        return Ok(Some(Applied {
            kind: ShortcutKind::TextMatch,
            transformer: name,
        }));
    }
    if let Some(name) = run_text_format(doc, registry, text, &content, caret)? {
        return Ok(Some(Applied {
            kind: ShortcutKind::TextFormat,
            transformer: name,
        }));
    }
    Ok(None)
}

fn run_element<'r>(
    doc: &mut Document,
    registry: &'r TransformerRegistry,
    text: NodeKey,
    content: &str,
    caret: usize,
) -> Result<Option<&'r str>, TreeError> {
    let prefix = &content[..caret];
    if !prefix.ends_with(char::is_whitespace) {
        return Ok(None);
    }
    let Some(block) = doc.parent(text)? else {
        return Ok(None);
    };
    if !matches!(doc.kind(block)?, NodeKind::Paragraph) || doc.first_child(block)? != Some(text) {
        return Ok(None);
    }

    for transformer in registry.elements() {
        let Some(captures) = transformer.pattern().and_then(|re| re.captures(prefix)) else {
            continue;
        };
        if captures.get(0).map_or(0, |m| m.end()) != caret {
            continue;
        }
        doc.set_text(text, &content[caret..])?;
        let mut cx = ImportContext {
            doc: &mut *doc,
            options: registry.options(),
            is_import: false,
        };
        if transformer.import(&mut cx, block, text, &captures)? {
            let node_selected = matches!(doc.selection(), Some(Selection::Node { .. }));
            if doc.contains(text) && !node_selected {
                doc.set_selection(Some(Selection::Caret {
                    key: text,
                    offset: 0,
                }));
            }
            log::debug!("element shortcut {} applied", transformer.name());
            return Ok(Some(transformer.name()));
        }
        doc.set_text(text, content)?;
    }
    Ok(None)
}

fn run_text_match<'r>(
    doc: &mut Document,
    registry: &'r TransformerRegistry,
    text: NodeKey,
    content: &str,
    caret: usize,
) -> Result<Option<&'r str>, TreeError> {
    let prefix = &content[..caret];
    let Some(typed) = prefix.chars().next_back() else {
        return Ok(None);
    };
    let honor_escapes = registry.options().honor_escapes;

    for transformer in registry.text_matches() {
        if transformer.trigger() != typed {
            continue;
        }
        let Some(captures) = transformer.shortcut_pattern().captures(prefix) else {
            continue;
        };
        let Some(whole) = captures.get(0) else {
            continue;
        };
        if honor_escapes && is_escaped(prefix, whole.start()) {
            continue;
        }
        let Some(replacement) = transformer.replace(&captures) else {
            continue;
        };
        let start = whole.start();
        let end = start + whole.as_str().trim_end().len();

        let format = doc.format(text)?;
        let parts = doc.split_text(text, &[start, end])?;
        let matched = matched_part(&parts, start > 0, text)?;
        let trailing = parts.last().copied().filter(|last| *last != matched);

        let node = doc.create(replacement.kind);
        let child = match replacement.text {
            Some(label) => {
                let child = doc.create_text(label, format);
                doc.append(node, child)?;
                Some(child)
            }
            None => None,
        };
        doc.replace(matched, node)?;

        let selection = match (trailing, child) {
            (Some(trailing), _) => Selection::Caret {
                key: trailing,
                offset: 0,
            },
            (None, Some(child)) => Selection::Caret {
                key: child,
                offset: doc.text(child)?.len(),
            },
            (None, None) => Selection::Node { key: node },
        };
        doc.set_selection(Some(selection));
        log::debug!("text-match shortcut {} applied", transformer.name());
        return Ok(Some(transformer.name()));
    }
    Ok(None)
}

fn run_text_format<'r>(
    doc: &mut Document,
    registry: &'r TransformerRegistry,
    text: NodeKey,
    content: &str,
    caret: usize,
) -> Result<Option<&'r str>, TreeError> {
    let table = registry.text_formats();
    let Some(found) = table.find_closing(&content[..caret]) else {
        return Ok(None);
    };
    let Some(transformer) = table.get(found.transformer) else {
        return Ok(None);
    };

    let parts = doc.split_text(text, &[found.start, found.end])?;
    let matched = matched_part(&parts, found.start > 0, text)?;
    let trailing = parts.last().copied().filter(|last| *last != matched);
    let inner = &content[found.content_start..found.content_end];
    doc.set_text(matched, inner)?;
    doc.add_format(matched, transformer.format)?;

    let selection = match trailing {
        Some(trailing) => Selection::Caret {
            key: trailing,
            offset: 0,
        },
        None => Selection::Caret {
            key: matched,
            offset: inner.len(),
        },
    };
    doc.set_selection(Some(selection));
    log::debug!("text-format shortcut {} applied", transformer.name());
    Ok(Some(transformer.name()))
}

/// The part of a split that holds the matched span.
fn matched_part(parts: &[NodeKey], has_leading: bool, key: NodeKey) -> Result<NodeKey, TreeError> {
    let index = usize::from(has_leading);
    parts.get(index).copied().ok_or(TreeError::MissingNode(key))
}
