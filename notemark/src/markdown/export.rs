//! Markdown export
//!
//!     Blocks are rendered by the first element transformer that claims them and joined with
//!     single newlines. Inline children are rendered as a sequence of units (text runs, links,
//!     embeds) and wrapped in tags by a small stack machine:
//!
//!         - before a unit, tags whose format the unit lacks are closed, innermost first
//!         - missing tags are opened, the one that stays open over more following units first
//!         - ties open bold, then strikethrough, then italic, so italic sits innermost
//!
//!     Bold is written `**`, italic `_` and strikethrough `~~`. No two of these share a
//!     character, and plain text never leaves one of them unescaped next to a tag, so tags are
//!     never glued together. Inside italic every `_` is escaped, including the intraword ones
//!     plain text keeps. Inline code is always innermost and adjacent code runs share a span.
//!     Underline has no Markdown spelling and is dropped.

use crate::error::ExportError;
use crate::markdown::escape::{escape_text, escape_text_strict};
use crate::transformers::{ExportContext, TransformerRegistry};
use crate::tree::{Document, NodeKey, NodeKind, TextFormat};

/// Wrapping tags in tie-break order.
const TAGS: [(TextFormat, &str); 3] = [
    (TextFormat::BOLD, "**"),
    (TextFormat::STRIKETHROUGH, "~~"),
    (TextFormat::ITALIC, "_"),
];

const WRAPPING: TextFormat = TextFormat::BOLD
    .union(TextFormat::ITALIC)
    .union(TextFormat::STRIKETHROUGH);

/// Export the subtree at `node` (the whole document when `None`).
pub fn export_document(
    doc: &Document,
    node: Option<NodeKey>,
    registry: &TransformerRegistry,
) -> Result<String, ExportError> {
    let cx = ExportContext::new(doc, registry);
    let node = node.unwrap_or_else(|| doc.root());
    match doc.kind(node)? {
        NodeKind::Root => {
            let blocks = doc
                .children(node)?
                .iter()
                .map(|child| export_block(&cx, *child))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(blocks.join("\n"))
        }
        NodeKind::Text(_) | NodeKind::Link(_) | NodeKind::Autolink { .. } => {
            render_units(&cx, &[node])
        }
        _ => export_block(&cx, node),
    }
}

/// Render one block through the element transformers.
pub fn export_block(cx: &ExportContext<'_>, node: NodeKey) -> Result<String, ExportError> {
    for transformer in cx.registry.elements() {
        if let Some(out) = transformer.export(cx, node)? {
            return Ok(out);
        }
    }
    Err(unhandled(cx.doc, node)?)
}

fn unhandled(doc: &Document, node: NodeKey) -> Result<ExportError, ExportError> {
    let node_type = doc.node_type(node)?;
    log::error!("no export transformer handles {node_type} node {node}");
    Ok(ExportError::UnhandledNode {
        key: node,
        node_type,
    })
}

/// Render the inline children of `block` as one line.
pub fn export_inline(cx: &ExportContext<'_>, block: NodeKey) -> Result<String, ExportError> {
    render_units(cx, cx.doc.children(block)?)
}

struct Unit {
    format: TextFormat,
    body: String,
}

fn collect_units(cx: &ExportContext<'_>, nodes: &[NodeKey]) -> Result<Vec<Unit>, ExportError> {
    let mut units: Vec<Unit> = Vec::with_capacity(nodes.len());
    let mut code: Option<(TextFormat, String)> = None;

    for node in nodes {
        if let NodeKind::Text(run) = cx.doc.kind(*node)? {
            if run.format.contains(TextFormat::CODE) {
                match &mut code {
                    Some((format, text)) if *format == run.format => text.push_str(&run.text),
                    _ => {
                        flush_code(&mut units, code.take());
                        code = Some((run.format, run.text.clone()));
                    }
                }
                continue;
            }
        }
        flush_code(&mut units, code.take());

        let unit = match cx.doc.kind(*node)? {
            NodeKind::Text(run) if run.format.contains(TextFormat::ITALIC) => Unit {
                format: run.format,
                body: escape_text_strict(&run.text),
            },
            NodeKind::Text(run) => Unit {
                format: run.format,
                body: escape_text(&run.text),
            },
            _ => {
                let body = render_text_match(cx, *node)?;
                Unit {
                    format: single_child_format(cx.doc, *node)?,
                    body,
                }
            }
        };
        units.push(unit);
    }
    flush_code(&mut units, code.take());
    Ok(units)
}

fn flush_code(units: &mut Vec<Unit>, code: Option<(TextFormat, String)>) {
    if let Some((format, text)) = code {
        units.push(Unit {
            format,
            body: format!("`{text}`"),
        });
    }
}

fn render_text_match(cx: &ExportContext<'_>, node: NodeKey) -> Result<String, ExportError> {
    for transformer in cx.registry.text_matches() {
        if let Some(out) = transformer.export(cx, node)? {
            return Ok(out);
        }
    }
    Err(unhandled(cx.doc, node)?)
}

/// The format of a link's text, when the link holds exactly one text run.
fn single_child_format(doc: &Document, node: NodeKey) -> Result<TextFormat, ExportError> {
    let children = doc.children(node)?;
    if let [only] = children {
        if let NodeKind::Text(run) = doc.kind(*only)? {
            return Ok(run.format.difference(TextFormat::CODE));
        }
    }
    Ok(TextFormat::NONE)
}

fn render_units(cx: &ExportContext<'_>, nodes: &[NodeKey]) -> Result<String, ExportError> {
    let units = collect_units(cx, nodes)?;
    let mut out = String::new();
    let mut open: Vec<(TextFormat, &'static str)> = Vec::new();

    for (index, unit) in units.iter().enumerate() {
        let needed = unit.format.intersection(WRAPPING);
        while open.iter().any(|(flag, _)| !needed.contains(*flag)) {
            if let Some((_, tag)) = open.pop() {
                out.push_str(tag);
            }
        }

        let mut missing: Vec<(TextFormat, &'static str)> = TAGS
            .into_iter()
            .filter(|(flag, _)| needed.contains(*flag) && !open.iter().any(|(f, _)| f == flag))
            .collect();
        missing.sort_by_key(|(flag, _)| std::cmp::Reverse(persistence(&units[index..], *flag)));
        for (flag, tag) in missing {
            out.push_str(tag);
            open.push((flag, tag));
        }
        out.push_str(&unit.body);
    }
    while let Some((_, tag)) = open.pop() {
        out.push_str(tag);
    }
    Ok(out)
}

/// How many consecutive units, starting at the first, carry `flag`.
fn persistence(units: &[Unit], flag: TextFormat) -> usize {
    units
        .iter()
        .take_while(|u| u.format.contains(flag))
        .count()
}

/// Escape the start of a paragraph line that would otherwise import as another block.
pub fn escape_line_start(registry: &TransformerRegistry, line: &str) -> String {
    let triggers = line.starts_with("---")
        || registry
            .elements()
            .iter()
            .filter_map(|t| t.pattern())
            .any(|re| re.is_match(line));
    if !triggers {
        return line.to_string();
    }
    match line.chars().next() {
        Some(c) if c.is_ascii_punctuation() => format!("\\{line}"),
        Some(c) if c.is_ascii_digit() => {
            let digits = line.chars().take_while(char::is_ascii_digit).count();
            if line[digits..].starts_with('.') {
                format!("{}\\{}", &line[..digits], &line[digits..])
            } else {
                line.to_string()
            }
        }
        _ => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Link;

    fn paragraph(doc: &mut Document, runs: &[(&str, TextFormat)]) -> NodeKey {
        let p = doc.create(NodeKind::Paragraph);
        doc.append(doc.root(), p).unwrap();
        for (text, format) in runs {
            let run = doc.create_text(*text, *format);
            doc.append(p, run).unwrap();
        }
        p
    }

    fn export(doc: &Document) -> String {
        export_document(doc, None, &TransformerRegistry::default()).unwrap()
    }

    #[test]
    fn longer_lived_format_opens_first() {
        let mut doc = Document::new();
        paragraph(
            &mut doc,
            &[
                ("a", TextFormat::ITALIC),
                ("b", TextFormat::ITALIC | TextFormat::BOLD),
                ("c", TextFormat::NONE),
            ],
        );
        assert_eq!(export(&doc), "_a**b**_c");
    }

    #[test]
    fn ties_keep_italic_innermost() {
        let mut doc = Document::new();
        paragraph(&mut doc, &[("x", TextFormat::BOLD | TextFormat::ITALIC)]);
        assert_eq!(export(&doc), "**_x_**");

        let mut doc = Document::new();
        paragraph(
            &mut doc,
            &[
                ("x", TextFormat::STRIKETHROUGH | TextFormat::ITALIC),
                ("y", TextFormat::NONE),
            ],
        );
        assert_eq!(export(&doc), "~~_x_~~y");
    }

    #[test]
    fn tags_keep_their_spelling_next_to_escapes() {
        let mut doc = Document::new();
        paragraph(
            &mut doc,
            &[
                ("a*", TextFormat::NONE),
                ("b", TextFormat::BOLD),
                ("[1]", TextFormat::NONE),
            ],
        );
        assert_eq!(export(&doc), r"a\***b**\[1\]");
    }

    #[test]
    fn underscores_inside_italic_are_all_escaped() {
        let mut doc = Document::new();
        paragraph(
            &mut doc,
            &[
                ("use ", TextFormat::NONE),
                ("my_var", TextFormat::ITALIC),
                (" or my_other", TextFormat::NONE),
            ],
        );
        assert_eq!(export(&doc), r"use _my\_var_ or my_other");
    }

    #[test]
    fn code_is_innermost_and_merged() {
        let mut doc = Document::new();
        paragraph(
            &mut doc,
            &[
                ("a", TextFormat::CODE | TextFormat::BOLD),
                ("b", TextFormat::CODE | TextFormat::BOLD),
            ],
        );
        assert_eq!(export(&doc), "**`ab`**");
    }

    #[test]
    fn underline_is_dropped() {
        let mut doc = Document::new();
        paragraph(&mut doc, &[("u", TextFormat::UNDERLINE)]);
        assert_eq!(export(&doc), "u");
    }

    #[test]
    fn paragraph_line_start_triggers_are_escaped() {
        let registry = TransformerRegistry::default();
        assert_eq!(escape_line_start(&registry, "# not a heading"), r"\# not a heading");
        assert_eq!(escape_line_start(&registry, "12. not a list"), r"12\. not a list");
        assert_eq!(escape_line_start(&registry, "> no"), r"\> no");
        assert_eq!(escape_line_start(&registry, "---"), r"\---");
        assert_eq!(escape_line_start(&registry, "plain"), "plain");
    }

    #[test]
    fn formatted_link_is_wrapped_whole() {
        let mut doc = Document::new();
        let p = paragraph(&mut doc, &[]);
        let link = doc.create(NodeKind::Link(Link {
            url: "https://example.com".into(),
            ..Link::default()
        }));
        let text = doc.create_text("docs", TextFormat::BOLD);
        doc.append(link, text).unwrap();
        doc.append(p, link).unwrap();
        assert_eq!(export(&doc), "**[docs](https://example.com)**");
    }

    #[test]
    fn unhandled_nodes_are_errors() {
        let mut doc = Document::new();
        let item = doc.create(NodeKind::ListItem(Default::default()));
        doc.append(doc.root(), item).unwrap();
        let err = export_document(&doc, None, &TransformerRegistry::default()).unwrap_err();
        assert!(matches!(err, ExportError::UnhandledNode { key, .. } if key == item));
    }
}
