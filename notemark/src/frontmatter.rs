//! Front matter codec
//!
//!     Notes may start with a metadata block between two `---` lines:
//!
//!         ---
//!         title: Groceries
//!         tags:
//!           - home
//!           - weekly
//!         ---
//!
//!     Each line is split on its first colon and both sides are trimmed. A key with an empty
//!     value followed by `- item` lines holds a list. Lines without a colon (or with nothing
//!     before it) are ignored and a repeated key overwrites the earlier one. Values are written
//!     back verbatim, so a value containing a newline does not survive a round trip.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

static FRONT_MATTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ms)\A---[ \t]*\r?\n(.*?)^---[ \t]*(?:\r?\n|\z)").expect("valid front matter regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FrontMatterValue {
    Text(String),
    List(Vec<String>),
}

impl From<&str> for FrontMatterValue {
    fn from(value: &str) -> Self {
        FrontMatterValue::Text(value.to_string())
    }
}

impl From<String> for FrontMatterValue {
    fn from(value: String) -> Self {
        FrontMatterValue::Text(value)
    }
}

impl fmt::Display for FrontMatterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrontMatterValue::Text(text) => f.write_str(text),
            FrontMatterValue::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

/// Insertion-ordered metadata.
pub type FrontMatter = IndexMap<String, FrontMatterValue>;

/// A note split into its metadata and body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedNote {
    pub front_matter: FrontMatter,
    pub content: String,
}

pub fn has_front_matter(markdown: &str) -> bool {
    FRONT_MATTER_RE.is_match(markdown)
}

/// Split leading front matter from the body. Without front matter the map is empty and the
/// content is the whole input.
pub fn parse_front_matter(markdown: &str) -> ParsedNote {
    let Some(captures) = FRONT_MATTER_RE.captures(markdown) else {
        return ParsedNote {
            front_matter: FrontMatter::new(),
            content: markdown.to_string(),
        };
    };
    let block = captures.get(1).map_or("", |m| m.as_str());
    let end = captures.get(0).map_or(0, |m| m.end());
    ParsedNote {
        front_matter: parse_block(block),
        content: markdown[end..].to_string(),
    }
}

fn parse_block(block: &str) -> FrontMatter {
    let mut front_matter = FrontMatter::new();
    let mut pending_list: Option<(String, Vec<String>)> = None;

    for line in block.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(item) = trimmed.strip_prefix("- ") {
            if let Some((_, items)) = pending_list.as_mut() {
                items.push(item.trim().to_string());
                continue;
            }
        }
        if let Some((key, items)) = pending_list.take() {
            let value = if items.is_empty() {
                FrontMatterValue::Text(String::new())
            } else {
                FrontMatterValue::List(items)
            };
            front_matter.insert(key, value);
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value.trim();
        if value.is_empty() {
            pending_list = Some((key.to_string(), Vec::new()));
        } else {
            front_matter.insert(key.to_string(), FrontMatterValue::Text(value.to_string()));
        }
    }

    if let Some((key, items)) = pending_list {
        let value = if items.is_empty() {
            FrontMatterValue::Text(String::new())
        } else {
            FrontMatterValue::List(items)
        };
        front_matter.insert(key, value);
    }
    front_matter
}

/// Render a front matter block, including both delimiter lines and a trailing newline.
pub fn serialize_front_matter(front_matter: &FrontMatter) -> String {
    let mut out = String::from("---\n");
    for (key, value) in front_matter {
        match value {
            FrontMatterValue::Text(text) => out.push_str(&format!("{key}: {text}\n")),
            FrontMatterValue::List(items) => {
                out.push_str(&format!("{key}:\n"));
                for item in items {
                    out.push_str(&format!("  - {item}\n"));
                }
            }
        }
    }
    out.push_str("---\n");
    out
}

/// Swap the front matter of `markdown` for `front_matter`, or prepend it when there is none.
pub fn replace_front_matter(markdown: &str, front_matter: &FrontMatter) -> String {
    let block = serialize_front_matter(front_matter);
    match FRONT_MATTER_RE.find(markdown) {
        Some(found) => format!("{block}{}", &markdown[found.end()..]),
        None => format!("{block}{markdown}"),
    }
}
