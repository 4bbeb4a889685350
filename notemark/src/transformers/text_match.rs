//! Text-match transformers: inline spans such as links and embeds.
//!
//! Each transformer carries two patterns. The import pattern finds a span anywhere inside a
//! text run during a full import. The shortcut pattern is the same syntax anchored at the end
//! of the text, used while typing once the trigger character has been entered.

use super::ExportContext;
use crate::error::ExportError;
use crate::markdown::escape::{escape_chars, escape_text, unescape_all};
use crate::tree::{Embed, EmbedWidth, Link, NodeKey, NodeKind};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use url::Url;

static FILE_EMBED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!(?:\[((?:[^\]\\]|\\.)*)\])(?:\(((?:[^()\\]|\\.)+)\))")
        .expect("valid file embed regex")
});
static FILE_EMBED_SHORTCUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!(?:\[((?:[^\]\\]|\\.)*)\])(?:\(((?:[^()\\]|\\.)+)\))$")
        .expect("valid file embed shortcut regex")
});
static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:\[([^\[]+)\])(?:\((?:([^()]+?)(?:\s"((?:[^"]*\\")*[^"]*)"\s*)?)\))"#)
        .expect("valid link regex")
});
static LINK_SHORTCUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:\[([^\[]+)\])(?:\((?:([^()]+?)(?:\s"((?:[^"]*\\")*[^"]*)"\s*)?)\))$"#)
        .expect("valid link shortcut regex")
});
static AUTOLINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://[^\s<>()\[\]\\*~`"']*[^\s<>()\[\]\\*~`"'.,;:!?]"#)
        .expect("valid autolink regex")
});
static AUTOLINK_SHORTCUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://[^\s<>()\[\]\\*~`"']*[^\s<>()\[\]\\*~`"'.,;:!?]\s$"#)
        .expect("valid autolink shortcut regex")
});

/// What a matched span turns into: a node, optionally holding one text child that inherits
/// the format of the run it was cut from.
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    pub kind: NodeKind,
    pub text: Option<String>,
}

pub trait TextMatchTransformer: Send + Sync {
    fn name(&self) -> &str;

    /// Unanchored pattern used during import.
    fn import_pattern(&self) -> &Regex;

    /// Pattern anchored at the end of the text, used by typing shortcuts.
    fn shortcut_pattern(&self) -> &Regex;

    /// Character whose insertion runs the shortcut pattern.
    fn trigger(&self) -> char {
        ')'
    }

    /// Describe the node replacing a match, or `None` to leave the text alone.
    fn replace(&self, captures: &Captures<'_>) -> Option<Replacement>;

    /// Render an inline node this transformer owns.
    fn export(&self, cx: &ExportContext<'_>, node: NodeKey) -> Result<Option<String>, ExportError>;
}

pub fn defaults() -> Vec<Box<dyn TextMatchTransformer>> {
    vec![
        Box::new(FileEmbedTransformer),
        Box::new(LinkTransformer),
        Box::new(AutolinkTransformer),
    ]
}

/// Build an embed from the raw (still escaped) alt text and source of `![alt](src)`.
///
/// Dimensions travel as a query string at the end of the alt text:
/// `![diagram?width=320&height=200](diagram.png)`.
pub fn parse_embed(raw_alt: &str, raw_src: &str) -> Embed {
    let alt = unescape_all(raw_alt);
    let mut embed = Embed::new(unescape_all(raw_src), alt.clone());
    let Some((prefix, query)) = alt.rsplit_once('?') else {
        return embed;
    };

    let mut width = None;
    let mut height = None;
    let mut rest = Vec::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "width" => width = Some(value.into_owned()),
            "height" => height = Some(value.into_owned()),
            _ => rest.push((key.into_owned(), value.into_owned())),
        }
    }
    if width.is_none() && height.is_none() {
        return embed;
    }

    embed.alt = if rest.is_empty() {
        prefix.to_string()
    } else {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(rest)
            .finish();
        format!("{prefix}?{query}")
    };
    embed.width = match width.as_deref().map(str::trim) {
        Some(value) => value
            .parse()
            .map(EmbedWidth::Pixels)
            .unwrap_or(EmbedWidth::Full),
        None => EmbedWidth::Full,
    };
    embed.height = height.and_then(|h| h.trim().parse().ok());
    embed
}

/// Render an embed as `![alt?width=..&height=..](src)`.
pub fn render_embed(embed: &Embed) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("width", &embed.width.to_string());
    if let Some(height) = embed.height {
        query.append_pair("height", &height.to_string());
    }
    let alt = format!("{}?{}", embed.alt, query.finish());
    format!(
        "![{}]({})",
        escape_chars(&alt, &['\\', '[', ']']),
        escape_chars(&embed.src, &['\\', '(', ')'])
    )
}

pub struct FileEmbedTransformer;

impl TextMatchTransformer for FileEmbedTransformer {
    fn name(&self) -> &str {
        "file-embed"
    }

    fn import_pattern(&self) -> &Regex {
        &FILE_EMBED_RE
    }

    fn shortcut_pattern(&self) -> &Regex {
        &FILE_EMBED_SHORTCUT_RE
    }

    fn replace(&self, captures: &Captures<'_>) -> Option<Replacement> {
        let src = captures.get(2)?;
        let alt = captures.get(1).map_or("", |m| m.as_str());
        Some(Replacement {
            kind: NodeKind::Embed(parse_embed(alt, src.as_str())),
            text: None,
        })
    }

    fn export(&self, cx: &ExportContext<'_>, node: NodeKey) -> Result<Option<String>, ExportError> {
        Ok(match cx.doc.kind(node)? {
            NodeKind::Embed(embed) => Some(render_embed(embed)),
            _ => None,
        })
    }
}

/// `[text](url "title")`
pub struct LinkTransformer;

impl TextMatchTransformer for LinkTransformer {
    fn name(&self) -> &str {
        "link"
    }

    fn import_pattern(&self) -> &Regex {
        &LINK_RE
    }

    fn shortcut_pattern(&self) -> &Regex {
        &LINK_SHORTCUT_RE
    }

    fn replace(&self, captures: &Captures<'_>) -> Option<Replacement> {
        let text = captures.get(1)?.as_str();
        let url = captures.get(2)?.as_str();
        let title = captures.get(3).map(|m| unescape_all(m.as_str()));
        Some(Replacement {
            kind: NodeKind::Link(Link {
                url: unescape_all(url.trim()),
                title,
                ..Link::default()
            }),
            text: Some(unescape_all(text)),
        })
    }

    fn export(&self, cx: &ExportContext<'_>, node: NodeKey) -> Result<Option<String>, ExportError> {
        let NodeKind::Link(link) = cx.doc.kind(node)? else {
            return Ok(None);
        };
        let text = escape_text(&cx.doc.text_content(node)?);
        let url = escape_chars(&link.url, &['\\', '(', ')']);
        Ok(Some(match &link.title {
            Some(title) => format!("[{text}]({url} \"{}\")", escape_chars(title, &['\\', '"'])),
            None => format!("[{text}]({url})"),
        }))
    }
}

/// Bare `http(s)://` URLs.
pub struct AutolinkTransformer;

impl TextMatchTransformer for AutolinkTransformer {
    fn name(&self) -> &str {
        "autolink"
    }

    fn import_pattern(&self) -> &Regex {
        &AUTOLINK_RE
    }

    fn shortcut_pattern(&self) -> &Regex {
        &AUTOLINK_SHORTCUT_RE
    }

    fn trigger(&self) -> char {
        ' '
    }

    fn replace(&self, captures: &Captures<'_>) -> Option<Replacement> {
        let raw = captures.get(0)?.as_str().trim_end();
        let parsed = Url::parse(raw).ok()?;
        if parsed.host_str().map_or(true, str::is_empty) {
            return None;
        }
        Some(Replacement {
            kind: NodeKind::Autolink {
                url: raw.to_string(),
            },
            text: Some(raw.to_string()),
        })
    }

    fn export(&self, cx: &ExportContext<'_>, node: NodeKey) -> Result<Option<String>, ExportError> {
        Ok(match cx.doc.kind(node)? {
            NodeKind::Autolink { url } => Some(url.clone()),
            _ => None,
        })
    }
}
