//! Inline format resolution
//!
//!     A text run produced by block import still holds raw Markdown. Resolution finds the
//!     leftmost outermost tag span, splits the run into at most three parts (leading, matched,
//!     trailing), sets the tag's flags on the matched part and recurses into each part. Code
//!     spans are not entered. Recursion depth is bounded by the nesting depth of the tags, since
//!     every step works on a strictly shorter run.
//!
//!     Runs with no tag left are leaves. Leaves first go through the text-match transformers
//!     (links, embeds, bare URLs) and finally lose their backslash escapes.

use crate::error::TreeError;
use crate::markdown::escape::unescape_punctuation;
use crate::transformers::text_format::is_escaped;
use crate::transformers::text_match::Replacement;
use crate::transformers::TransformerRegistry;
use crate::tree::{Document, NodeKey, TextFormat};

/// Resolve every inline construct in the text node `key`.
pub fn resolve(
    doc: &mut Document,
    registry: &TransformerRegistry,
    key: NodeKey,
) -> Result<(), TreeError> {
    let text = doc.text(key)?.to_string();
    let table = registry.text_formats();
    let Some(found) = table.find_outermost(&text) else {
        return resolve_leaf(doc, registry, key);
    };
    let format = table
        .get(found.transformer)
        .map_or(TextFormat::NONE, |t| t.format);

    let (leading, matched, trailing) = split_three(doc, key, found.start, found.end, text.len())?;
    doc.set_text(matched, &text[found.content_start..found.content_end])?;
    doc.add_format(matched, format)?;

    if !doc.format(matched)?.contains(TextFormat::CODE) {
        resolve(doc, registry, matched)?;
    }
    if let Some(leading) = leading {
        resolve(doc, registry, leading)?;
    }
    if let Some(trailing) = trailing {
        resolve(doc, registry, trailing)?;
    }
    Ok(())
}

/// Split `key` around `[start, end)`; the first existing part keeps the key.
fn split_three(
    doc: &mut Document,
    key: NodeKey,
    start: usize,
    end: usize,
    len: usize,
) -> Result<(Option<NodeKey>, NodeKey, Option<NodeKey>), TreeError> {
    let parts = doc.split_text(key, &[start, end])?;
    let mut parts = parts.into_iter();
    let leading = if start > 0 { parts.next() } else { None };
    let matched = parts.next().ok_or(TreeError::MissingNode(key))?;
    let trailing = if end < len { parts.next() } else { None };
    Ok((leading, matched, trailing))
}

fn resolve_leaf(
    doc: &mut Document,
    registry: &TransformerRegistry,
    key: NodeKey,
) -> Result<(), TreeError> {
    let text = doc.text(key)?.to_string();
    let format = doc.format(key)?;
    if format.contains(TextFormat::CODE) {
        return Ok(());
    }

    let Some((start, end, replacement)) = find_text_match(registry, &text) else {
        return doc.set_text(key, unescape_punctuation(&text));
    };

    let (leading, matched, trailing) = split_three(doc, key, start, end, text.len())?;
    let node = doc.create(replacement.kind);
    if let Some(child) = replacement.text {
        let child = doc.create_text(child, format);
        doc.append(node, child)?;
    }
    doc.replace(matched, node)?;

    if let Some(leading) = leading {
        resolve_leaf(doc, registry, leading)?;
    }
    if let Some(trailing) = trailing {
        resolve_leaf(doc, registry, trailing)?;
    }
    Ok(())
}

/// Earliest accepted text-match span; ties go to the earlier transformer.
fn find_text_match(
    registry: &TransformerRegistry,
    text: &str,
) -> Option<(usize, usize, Replacement)> {
    let honor_escapes = registry.options().honor_escapes;
    let mut best: Option<(usize, usize, Replacement)> = None;
    for transformer in registry.text_matches() {
        let found = transformer
            .import_pattern()
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                if honor_escapes && is_escaped(text, whole.start()) {
                    return None;
                }
                let replacement = transformer.replace(&caps)?;
                Some((whole.start(), whole.end(), replacement))
            })
            .next();
        if let Some(candidate) = found {
            if best.as_ref().map_or(true, |b| candidate.0 < b.0) {
                best = Some(candidate);
            }
        }
    }
    best
}
