//! Node kinds and the attributes they carry.

use super::text_format::TextFormat;
use serde::Serialize;
use std::fmt;

/// Extensions (lowercase, without the dot) rendered as images.
pub const IMAGE_FILE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];

/// Extensions (lowercase, without the dot) rendered as videos.
pub const VIDEO_FILE_EXTENSIONS: &[&str] = &["mov", "mp4", "m4v", "webm"];

/// The payload of a node in the document arena.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NodeKind {
    Root,
    Paragraph,
    Heading { level: HeadingLevel },
    Quote,
    List { kind: ListKind },
    ListItem(ListItem),
    CodeBlock(CodeBlock),
    Drawing(Drawing),
    Embed(Embed),
    Link(Link),
    Autolink { url: String },
    Text(TextRun),
}

impl NodeKind {
    pub fn text(text: impl Into<String>, format: TextFormat) -> Self {
        NodeKind::Text(TextRun {
            text: text.into(),
            format,
        })
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Root => NodeType::Root,
            NodeKind::Paragraph => NodeType::Paragraph,
            NodeKind::Heading { .. } => NodeType::Heading,
            NodeKind::Quote => NodeType::Quote,
            NodeKind::List { kind } => match kind {
                ListKind::Bullet => NodeType::UnorderedList,
                ListKind::Number { .. } => NodeType::OrderedList,
                ListKind::Check => NodeType::CheckList,
            },
            NodeKind::ListItem(item) if item.checked.is_some() => NodeType::CheckListItem,
            NodeKind::ListItem(_) => NodeType::ListItem,
            NodeKind::CodeBlock(_) => NodeType::CodeBlock,
            NodeKind::Drawing(_) => NodeType::Drawing,
            NodeKind::Embed(embed) => match embed.kind {
                EmbedKind::Image => NodeType::Image,
                EmbedKind::Video => NodeType::Video,
                EmbedKind::File => NodeType::File,
            },
            NodeKind::Link(_) => NodeType::Link,
            NodeKind::Autolink { .. } => NodeType::Autolink,
            NodeKind::Text(_) => NodeType::Text,
        }
    }

    /// Whether the node may own children.
    ///
    /// Text runs, embeds, code blocks and drawings are leaves: their content is opaque to the
    /// generic block and inline machinery.
    pub fn is_container(&self) -> bool {
        !matches!(
            self,
            NodeKind::Text(_) | NodeKind::Embed(_) | NodeKind::CodeBlock(_) | NodeKind::Drawing(_)
        )
    }

    /// Atomic nodes are never split or reinterpreted during import or export.
    pub fn is_atomic(&self) -> bool {
        matches!(self, NodeKind::CodeBlock(_) | NodeKind::Drawing(_))
    }

    pub fn as_text(&self) -> Option<&TextRun> {
        match self {
            NodeKind::Text(run) => Some(run),
            _ => None,
        }
    }
}

/// The closed set of node types exposed to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    Root,
    Paragraph,
    Heading,
    Quote,
    UnorderedList,
    OrderedList,
    CheckList,
    ListItem,
    CheckListItem,
    CodeBlock,
    Drawing,
    Image,
    Video,
    File,
    Link,
    Autolink,
    Text,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Root => "root",
            NodeType::Paragraph => "paragraph",
            NodeType::Heading => "heading",
            NodeType::Quote => "quote",
            NodeType::UnorderedList => "unordered-list",
            NodeType::OrderedList => "ordered-list",
            NodeType::CheckList => "check-list",
            NodeType::ListItem => "list-item",
            NodeType::CheckListItem => "check-list-item",
            NodeType::CodeBlock => "code-block",
            NodeType::Drawing => "drawing",
            NodeType::Image => "image",
            NodeType::Video => "video",
            NodeType::File => "file",
            NodeType::Link => "link",
            NodeType::Autolink => "autolink",
            NodeType::Text => "text",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Heading depth, restricted to 1..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const MAX: u8 = 3;

    pub fn new(level: u8) -> Option<Self> {
        (1..=Self::MAX).contains(&level).then_some(HeadingLevel(level))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "style", rename_all = "kebab-case")]
pub enum ListKind {
    Bullet,
    Number { start: u32 },
    Check,
}

impl ListKind {
    /// Lists of the same family merge when their lines are adjacent.
    pub fn same_family(self, other: ListKind) -> bool {
        matches!(
            (self, other),
            (ListKind::Bullet, ListKind::Bullet)
                | (ListKind::Number { .. }, ListKind::Number { .. })
                | (ListKind::Check, ListKind::Check)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ListItem {
    /// Nesting depth, in units of the configured list indent.
    pub indent: usize,
    /// `Some` for check-list items.
    pub checked: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    pub id: Option<String>,
    pub language: String,
    pub code: String,
    pub is_collapsed: bool,
    pub last_executed_result: Option<String>,
}

impl CodeBlock {
    pub fn new(language: impl Into<String>, code: impl Into<String>) -> Self {
        CodeBlock {
            id: None,
            language: language.into(),
            code: code.into(),
            is_collapsed: false,
            last_executed_result: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Drawing {
    /// Vector elements as stored on disk: a JSON array or object.
    pub elements: serde_json::Value,
}

impl Default for Drawing {
    fn default() -> Self {
        Drawing {
            elements: serde_json::Value::Array(Vec::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmbedKind {
    Image,
    Video,
    File,
}

impl EmbedKind {
    /// Classify an attachment by the extension of its source path or URL.
    pub fn from_src(src: &str) -> Self {
        let path = src.split(['?', '#']).next().unwrap_or(src);
        let extension = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if IMAGE_FILE_EXTENSIONS.contains(&extension.as_str()) {
            EmbedKind::Image
        } else if VIDEO_FILE_EXTENSIONS.contains(&extension.as_str()) {
            EmbedKind::Video
        } else {
            EmbedKind::File
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmbedWidth {
    Pixels(u32),
    Full,
}

impl fmt::Display for EmbedWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedWidth::Pixels(px) => write!(f, "{px}"),
            EmbedWidth::Full => f.write_str("100%"),
        }
    }
}

/// An image, video or other file attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub kind: EmbedKind,
    pub src: String,
    pub alt: String,
    pub width: EmbedWidth,
    pub height: Option<u32>,
}

impl Embed {
    pub fn new(src: impl Into<String>, alt: impl Into<String>) -> Self {
        let src = src.into();
        Embed {
            kind: EmbedKind::from_src(&src),
            src,
            alt: alt.into(),
            width: EmbedWidth::Full,
            height: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Link {
    pub url: String,
    pub title: Option<String>,
    pub target: Option<String>,
    pub rel: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub format: TextFormat,
}
