//! Fenced code blocks and drawings.
//!
//!     ```python id="d5f5ed67-4552-4f32-aeb5-ad4c566ad16a" isCollapsed="false"
//!     print(1)
//!     ```
//!
//! The opening line carries an optional language token and a header of `key="value"` pairs.
//! Values use backslash escapes for `\`, `"` and newlines. The closing fence is the next line
//! matching the same pattern. A fence with no closing line is not a fence at all.

use crate::error::ImportError;
use crate::transformers::text_format::is_escaped;
use crate::transformers::RegistryOptions;
use crate::tree::{CodeBlock, Document, Drawing, NodeKey, NodeKind};
use once_cell::sync::Lazy;
use regex::Regex;

static FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^```(\w{1,10})?(?:\s+(.+))?\s*$").expect("valid code fence regex")
});

pub const ATTR_ID: &str = "id";
pub const ATTR_IS_COLLAPSED: &str = "isCollapsed";
pub const ATTR_LAST_EXECUTED_RESULT: &str = "lastExecutedResult";

/// An opening fence and the index of its closing line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fence<'a> {
    pub language: Option<&'a str>,
    pub header: Option<&'a str>,
    pub open: usize,
    pub close: usize,
}

impl<'a> Fence<'a> {
    /// Recognize a fence opening at `lines[open]`.
    pub fn detect(lines: &[&'a str], open: usize) -> Option<Fence<'a>> {
        let line: &'a str = lines.get(open).copied()?;
        let captures = FENCE_RE.captures(line)?;
        let close = (open + 1..lines.len()).find(|i| FENCE_RE.is_match(lines[*i]));
        let Some(close) = close else {
            log::debug!("unterminated fence at line {}, keeping it as text", open + 1);
            return None;
        };
        Some(Fence {
            language: captures.get(1).map(|m| m.as_str()),
            header: captures.get(2).map(|m| m.as_str()),
            open,
            close,
        })
    }

    pub fn body(&self, lines: &[&str]) -> String {
        lines[self.open + 1..self.close].join("\n")
    }
}

/// Attributes carried on a code fence header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderAttributes {
    pub id: Option<String>,
    pub is_collapsed: bool,
    pub last_executed_result: Option<String>,
}

impl HeaderAttributes {
    pub fn parse(header: &str) -> Self {
        let mut attrs = HeaderAttributes::default();
        for (name, raw) in scan_attributes(header) {
            let value = unescape_attribute(raw);
            match name {
                ATTR_ID => attrs.id = Some(value),
                ATTR_IS_COLLAPSED => attrs.is_collapsed = value == "true",
                ATTR_LAST_EXECUTED_RESULT => attrs.last_executed_result = Some(value),
                _ => {}
            }
        }
        attrs
    }
}

/// Split a header into `(name, raw value)` pairs. Quoted strings without a name are skipped
/// whole, so an attribute-looking fragment inside another value is never picked up.
pub fn scan_attributes(header: &str) -> Vec<(&str, &str)> {
    let bytes = header.as_bytes();
    let len = bytes.len();
    let mut out = Vec::new();
    let mut i = 0;
    while i < len {
        if bytes[i] == b'"' {
            i = closing_quote(header, i + 1).map_or(len, |j| j + 1);
            continue;
        }
        if bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let name_start = i;
        while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'=' && bytes[i] != b'"'
        {
            i += 1;
        }
        let name = &header[name_start..i];
        if i + 1 < len && bytes[i] == b'=' && bytes[i + 1] == b'"' {
            let value_start = i + 2;
            let value_end = closing_quote(header, value_start);
            out.push((name, &header[value_start..value_end.unwrap_or(len)]));
            i = value_end.map_or(len, |j| j + 1);
        } else if i < len && bytes[i] == b'=' {
            i += 1;
        }
    }
    out
}

fn closing_quote(text: &str, from: usize) -> Option<usize> {
    (from..text.len()).find(|j| text.as_bytes()[*j] == b'"' && !is_escaped(text, *j))
}

pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

pub fn unescape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

pub fn render_code_block(code: &CodeBlock) -> String {
    let mut out = format!("```{}", code.language);
    if let Some(id) = &code.id {
        out.push_str(&format!(" {ATTR_ID}=\"{}\"", escape_attribute(id)));
    }
    out.push_str(&format!(" {ATTR_IS_COLLAPSED}=\"{}\"", code.is_collapsed));
    if let Some(result) = &code.last_executed_result {
        out.push_str(&format!(
            " {ATTR_LAST_EXECUTED_RESULT}=\"{}\"",
            escape_attribute(result)
        ));
    }
    if !code.code.is_empty() {
        out.push('\n');
        out.push_str(&code.code);
    }
    out.push_str("\n```");
    out
}

pub fn render_drawing(token: &str, drawing: &Drawing) -> String {
    let body = serde_json::to_string(&drawing.elements).unwrap_or_else(|_| "[]".to_string());
    format!("```{token}\n{body}\n```")
}

/// Try to import a fenced block opening at `lines[index]` into `target`.
///
/// Returns the index of the closing line when a node was appended, `Ok(None)` when the line is
/// not a usable fence and should be imported as ordinary text.
pub fn import_fence(
    doc: &mut Document,
    target: NodeKey,
    options: &RegistryOptions,
    lines: &[&str],
    index: usize,
) -> Result<Option<usize>, ImportError> {
    let Some(fence) = Fence::detect(lines, index) else {
        return Ok(None);
    };
    let line = index + 1;
    let language = fence.language.unwrap_or(&options.fallback_language);

    let kind = if options.is_drawing(language) {
        match parse_drawing(&fence.body(lines), line) {
            Ok(drawing) => NodeKind::Drawing(drawing),
            Err(err) if options.strict_drawings => return Err(err),
            Err(err) => {
                log::debug!("{err}; keeping the fence as text");
                return Ok(None);
            }
        }
    } else if options.supports_language(language) {
        let attrs = fence.header.map(HeaderAttributes::parse).unwrap_or_default();
        NodeKind::CodeBlock(CodeBlock {
            id: attrs.id,
            language: language.to_string(),
            code: fence.body(lines),
            is_collapsed: attrs.is_collapsed,
            last_executed_result: attrs.last_executed_result,
        })
    } else {
        log::debug!("unsupported fence language {language:?} at line {line}");
        return Ok(None);
    };

    let node = doc.create(kind);
    doc.append(target, node)?;
    Ok(Some(fence.close))
}

/// Parse a drawing body. A blank body is an empty drawing.
pub fn parse_drawing(body: &str, line: usize) -> Result<Drawing, ImportError> {
    if body.trim().is_empty() {
        return Ok(Drawing::default());
    }
    let elements: serde_json::Value = serde_json::from_str(body)
        .map_err(|source| ImportError::MalformedDrawing { line, source })?;
    if !(elements.is_array() || elements.is_object()) {
        return Err(ImportError::UnexpectedDrawingShape { line });
    }
    Ok(Drawing { elements })
}
