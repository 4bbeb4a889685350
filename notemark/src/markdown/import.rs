//! Line-oriented Markdown import.
//!
//! Each line is first offered to the fence scanner. Lines that do not start a usable fence
//! become a paragraph holding one text node, and the element transformers get a chance to
//! rewrite that paragraph. Whatever text node survives goes through inline resolution.

use crate::error::ImportError;
use crate::markdown::{fence, inline};
use crate::transformers::{ImportContext, TransformerRegistry};
use crate::tree::{Document, NodeKey, NodeKind, Selection, TextFormat};

/// Replace the children of `target` (the root when `None`) with the blocks parsed from
/// `markdown`. Front matter must already be stripped.
pub fn import_into(
    markdown: &str,
    doc: &mut Document,
    target: Option<NodeKey>,
    registry: &TransformerRegistry,
) -> Result<(), ImportError> {
    let target = target.unwrap_or_else(|| doc.root());
    let had_caret = matches!(doc.selection(), Some(Selection::Caret { .. }));
    doc.clear(target)?;

    let lines: Vec<&str> = markdown
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    let mut index = 0;
    while index < lines.len() {
        if let Some(close) = fence::import_fence(doc, target, registry.options(), &lines, index)? {
            index = close + 1;
            continue;
        }
        import_block(doc, target, registry, lines[index])?;
        index += 1;
    }

    if had_caret && !matches!(doc.selection(), Some(Selection::Node { .. })) {
        doc.select_start()?;
    }
    log::debug!(
        "imported {} lines into {} blocks",
        lines.len(),
        doc.children(target)?.len()
    );
    Ok(())
}

/// Import one non-fence line as a block appended to `target`.
pub fn import_block(
    doc: &mut Document,
    target: NodeKey,
    registry: &TransformerRegistry,
    line: &str,
) -> Result<(), ImportError> {
    let trimmed = line.trim();
    let block = doc.create(NodeKind::Paragraph);
    let text = doc.create_text(trimmed, TextFormat::NONE);
    doc.append(block, text)?;
    doc.append(target, block)?;

    for transformer in registry.elements() {
        let Some(captures) = transformer.pattern().and_then(|re| re.captures(line)) else {
            continue;
        };
        let matched_len = captures.get(0).map_or(0, |m| m.end());
        doc.set_text(text, &line[matched_len..])?;
        let mut cx = ImportContext {
            doc: &mut *doc,
            options: registry.options(),
            is_import: true,
        };
        if transformer.import(&mut cx, block, text, &captures)? {
            break;
        }
        doc.set_text(text, trimmed)?;
    }

    if doc.contains(text) {
        inline::resolve(doc, registry, text)?;
    }
    Ok(())
}
