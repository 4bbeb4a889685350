//! Element transformers: whole-line syntax to and from block nodes.

use super::{ExportContext, ImportContext};
use crate::error::{ExportError, TreeError};
use crate::markdown::{export, fence};
use crate::transformers::text_match::{parse_embed, render_embed};
use crate::tree::{
    CodeBlock, Drawing, HeadingLevel, ListItem, ListKind, NodeKey, NodeKind, Selection,
};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static CODE_SHORTCUT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```(\w{1,10})?\s").expect("valid code shortcut regex"));
static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,3})\s").expect("valid heading regex"));
static CHECK_LIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\s*)(?:-\s)?\s?(\[(\s|x)?\])\s").expect("valid check list regex")
});
static UNORDERED_LIST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)[-*+]\s").expect("valid unordered list regex"));
static ORDERED_LIST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)(\d{1,})\.\s").expect("valid ordered list regex"));
static QUOTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^>\s").expect("valid quote regex"));
static EMBED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^!\[((?:[^\]\\]|\\.)*)\]\(((?:[^()\\]|\\.)+)\)\s*$").expect("valid embed regex")
});

/// Maps a line prefix onto a block node and back.
pub trait ElementTransformer: Send + Sync {
    fn name(&self) -> &str;

    /// Pattern tested against the untrimmed line. Export-only transformers have none.
    fn pattern(&self) -> Option<&Regex> {
        None
    }

    /// Rewrite `block` (a paragraph holding the single text node `text`, already stripped of
    /// the matched prefix). Returning `Ok(false)` declines the line.
    fn import(
        &self,
        _cx: &mut ImportContext<'_>,
        _block: NodeKey,
        _text: NodeKey,
        _captures: &Captures<'_>,
    ) -> Result<bool, TreeError> {
        Ok(false)
    }

    /// Render `node`, or `Ok(None)` when this transformer does not handle it.
    fn export(&self, cx: &ExportContext<'_>, node: NodeKey) -> Result<Option<String>, ExportError>;
}

/// The standard element table, in match order.
pub fn defaults() -> Vec<Box<dyn ElementTransformer>> {
    vec![
        Box::new(CodeBlockTransformer),
        Box::new(HeadingTransformer),
        Box::new(ListTransformer::check()),
        Box::new(ListTransformer::unordered()),
        Box::new(ListTransformer::ordered()),
        Box::new(QuoteTransformer),
        Box::new(EmbedTransformer),
        Box::new(ParagraphTransformer),
    ]
}

/// `` ```lang `` typed at the start of a line creates an empty code block (or drawing) and
/// selects it. Also renders code blocks and drawings as fences.
pub struct CodeBlockTransformer;

impl ElementTransformer for CodeBlockTransformer {
    fn name(&self) -> &str {
        "code-block"
    }

    fn pattern(&self) -> Option<&Regex> {
        Some(&*CODE_SHORTCUT_RE)
    }

    fn import(
        &self,
        cx: &mut ImportContext<'_>,
        block: NodeKey,
        text: NodeKey,
        captures: &Captures<'_>,
    ) -> Result<bool, TreeError> {
        let language = captures
            .get(1)
            .map_or(cx.options.fallback_language.as_str(), |m| m.as_str())
            .to_string();
        let kind = if cx.options.is_drawing(&language) {
            NodeKind::Drawing(Drawing::default())
        } else if cx.options.supports_language(&language) {
            let code = cx.doc.text(text)?.trim().to_string();
            NodeKind::CodeBlock(CodeBlock::new(language, code))
        } else {
            return Ok(false);
        };
        let node = cx.doc.create(kind);
        cx.doc.replace(block, node)?;
        cx.doc.set_selection(Some(Selection::Node { key: node }));
        Ok(true)
    }

    fn export(&self, cx: &ExportContext<'_>, node: NodeKey) -> Result<Option<String>, ExportError> {
        Ok(match cx.doc.kind(node)? {
            NodeKind::CodeBlock(code) => Some(fence::render_code_block(code)),
            NodeKind::Drawing(drawing) => {
                Some(fence::render_drawing(&cx.options().drawing_language, drawing))
            }
            _ => None,
        })
    }
}

pub struct HeadingTransformer;

impl ElementTransformer for HeadingTransformer {
    fn name(&self) -> &str {
        "heading"
    }

    fn pattern(&self) -> Option<&Regex> {
        Some(&*HEADING_RE)
    }

    fn import(
        &self,
        cx: &mut ImportContext<'_>,
        block: NodeKey,
        _text: NodeKey,
        captures: &Captures<'_>,
    ) -> Result<bool, TreeError> {
        let hashes = captures.get(1).map_or(0, |m| m.as_str().len());
        let Some(level) = u8::try_from(hashes).ok().and_then(HeadingLevel::new) else {
            return Ok(false);
        };
        *cx.doc.kind_mut(block)? = NodeKind::Heading { level };
        Ok(true)
    }

    fn export(&self, cx: &ExportContext<'_>, node: NodeKey) -> Result<Option<String>, ExportError> {
        let NodeKind::Heading { level } = cx.doc.kind(node)? else {
            return Ok(None);
        };
        let hashes = "#".repeat(level.get() as usize);
        Ok(Some(format!("{hashes} {}", cx.inline(node)?)))
    }
}

/// Bullet, numbered and check lists. Items stay flat under one list node and record their
/// nesting depth; adjacent lines of the same family share a list.
pub struct ListTransformer {
    name: &'static str,
    pattern: &'static Lazy<Regex>,
    family: ListKind,
}

impl ListTransformer {
    pub fn check() -> Self {
        ListTransformer {
            name: "check-list",
            pattern: &CHECK_LIST_RE,
            family: ListKind::Check,
        }
    }

    pub fn unordered() -> Self {
        ListTransformer {
            name: "unordered-list",
            pattern: &UNORDERED_LIST_RE,
            family: ListKind::Bullet,
        }
    }

    pub fn ordered() -> Self {
        ListTransformer {
            name: "ordered-list",
            pattern: &ORDERED_LIST_RE,
            family: ListKind::Number { start: 1 },
        }
    }

    /// `None` when the ordered start number does not fit.
    fn item_for(
        &self,
        captures: &Captures<'_>,
        list_indent: usize,
    ) -> Option<(ListKind, ListItem)> {
        let leading = captures.get(1).map_or("", |m| m.as_str());
        let indent = indent_level(leading, list_indent);
        match self.family {
            ListKind::Check => {
                let checked = captures
                    .get(3)
                    .is_some_and(|m| m.as_str().eq_ignore_ascii_case("x"));
                Some((
                    ListKind::Check,
                    ListItem {
                        indent,
                        checked: Some(checked),
                    },
                ))
            }
            ListKind::Number { .. } => {
                let digits = captures.get(2).map_or("1", |m| m.as_str());
                let Ok(start) = digits.parse() else {
                    log::debug!(
                        "ordered list start {digits} does not fit, keeping the line as text"
                    );
                    return None;
                };
                Some((
                    ListKind::Number { start },
                    ListItem {
                        indent,
                        checked: None,
                    },
                ))
            }
            ListKind::Bullet => Some((
                ListKind::Bullet,
                ListItem {
                    indent,
                    checked: None,
                },
            )),
        }
    }
}

/// Nesting depth of a run of leading whitespace. A tab counts as one full level.
pub fn indent_level(leading: &str, list_indent: usize) -> usize {
    let width: usize = leading
        .chars()
        .map(|c| if c == '\t' { list_indent } else { 1 })
        .sum();
    width / list_indent.max(1)
}

impl ElementTransformer for ListTransformer {
    fn name(&self) -> &str {
        self.name
    }

    fn pattern(&self) -> Option<&Regex> {
        Some(Lazy::force(self.pattern))
    }

    fn import(
        &self,
        cx: &mut ImportContext<'_>,
        block: NodeKey,
        _text: NodeKey,
        captures: &Captures<'_>,
    ) -> Result<bool, TreeError> {
        let Some((kind, item)) = self.item_for(captures, cx.options.list_indent) else {
            return Ok(false);
        };
        let item = cx.doc.create(NodeKind::ListItem(item));
        cx.doc.move_children(block, item)?;

        let previous_list = match cx.doc.previous_sibling(block)? {
            Some(prev) => match cx.doc.kind(prev)? {
                NodeKind::List { kind: existing } if existing.same_family(kind) => Some(prev),
                _ => None,
            },
            None => None,
        };

        match previous_list {
            Some(list) => {
                cx.doc.remove(block)?;
                cx.doc.append(list, item)?;
            }
            None => {
                let list = cx.doc.create(NodeKind::List { kind });
                cx.doc.replace(block, list)?;
                cx.doc.append(list, item)?;
            }
        }
        Ok(true)
    }

    fn export(&self, cx: &ExportContext<'_>, node: NodeKey) -> Result<Option<String>, ExportError> {
        let NodeKind::List { kind } = cx.doc.kind(node)? else {
            return Ok(None);
        };
        if !kind.same_family(self.family) {
            return Ok(None);
        }
        let list_indent = cx.options().list_indent;
        let mut lines = Vec::new();
        for (index, child) in cx.doc.children(node)?.iter().enumerate() {
            let NodeKind::ListItem(item) = cx.doc.kind(*child)? else {
                log::error!("list {node} holds a non-item child {child}");
                return Err(ExportError::UnhandledNode {
                    key: *child,
                    node_type: cx.doc.node_type(*child)?,
                });
            };
            let marker = match kind {
                ListKind::Bullet => "-".to_string(),
                ListKind::Number { start } => format!("{}.", *start as usize + index),
                ListKind::Check => {
                    if item.checked == Some(true) {
                        "- [x]".to_string()
                    } else {
                        "- [ ]".to_string()
                    }
                }
            };
            let pad = " ".repeat(item.indent * list_indent);
            lines.push(format!("{pad}{marker} {}", cx.inline(*child)?));
        }
        Ok(Some(lines.join("\n")))
    }
}

pub struct QuoteTransformer;

impl ElementTransformer for QuoteTransformer {
    fn name(&self) -> &str {
        "quote"
    }

    fn pattern(&self) -> Option<&Regex> {
        Some(&*QUOTE_RE)
    }

    fn import(
        &self,
        cx: &mut ImportContext<'_>,
        block: NodeKey,
        _text: NodeKey,
        _captures: &Captures<'_>,
    ) -> Result<bool, TreeError> {
        *cx.doc.kind_mut(block)? = NodeKind::Quote;
        Ok(true)
    }

    fn export(&self, cx: &ExportContext<'_>, node: NodeKey) -> Result<Option<String>, ExportError> {
        if !matches!(cx.doc.kind(node)?, NodeKind::Quote) {
            return Ok(None);
        }
        Ok(Some(format!("> {}", cx.inline(node)?)))
    }
}

/// A line holding nothing but `![alt](src)` becomes a block-level image, video or file.
pub struct EmbedTransformer;

impl ElementTransformer for EmbedTransformer {
    fn name(&self) -> &str {
        "embed"
    }

    fn pattern(&self) -> Option<&Regex> {
        Some(&*EMBED_RE)
    }

    fn import(
        &self,
        cx: &mut ImportContext<'_>,
        block: NodeKey,
        _text: NodeKey,
        captures: &Captures<'_>,
    ) -> Result<bool, TreeError> {
        let (Some(alt), Some(src)) = (captures.get(1), captures.get(2)) else {
            return Ok(false);
        };
        let node = cx.doc.create(NodeKind::Embed(parse_embed(alt.as_str(), src.as_str())));
        cx.doc.replace(block, node)?;
        Ok(true)
    }

    fn export(&self, cx: &ExportContext<'_>, node: NodeKey) -> Result<Option<String>, ExportError> {
        Ok(match cx.doc.kind(node)? {
            NodeKind::Embed(embed) => Some(render_embed(embed)),
            _ => None,
        })
    }
}

/// Fallback for plain paragraphs. Never matches on import.
pub struct ParagraphTransformer;

impl ElementTransformer for ParagraphTransformer {
    fn name(&self) -> &str {
        "paragraph"
    }

    fn export(&self, cx: &ExportContext<'_>, node: NodeKey) -> Result<Option<String>, ExportError> {
        if !matches!(cx.doc.kind(node)?, NodeKind::Paragraph) {
            return Ok(None);
        }
        let line = cx.inline(node)?;
        Ok(Some(export::escape_line_start(cx.registry, &line)))
    }
}
