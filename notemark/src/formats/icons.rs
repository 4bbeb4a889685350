//! Icon mapping for the tree visualization format

use crate::tree::NodeType;

/// Get the Unicode icon for a node type
///
/// Returns a single character that identifies the node type at a glance in treeviz output.
pub fn get_icon(node_type: NodeType) -> &'static str {
    match node_type {
        NodeType::Root => "⧉",
        NodeType::Paragraph => "¶",
        NodeType::Heading => "§",
        NodeType::Quote => "\"",
        NodeType::UnorderedList | NodeType::OrderedList | NodeType::CheckList => "☰",
        NodeType::ListItem => "•",
        NodeType::CheckListItem => "☐",
        NodeType::CodeBlock => "𝒱",
        NodeType::Drawing => "✎",
        NodeType::Image => "▣",
        NodeType::Video => "▶",
        NodeType::File => "/",
        NodeType::Link | NodeType::Autolink => "⊕",
        NodeType::Text => "◦",
    }
}

/// Icon shown for the front matter header line.
pub const FRONT_MATTER_ICON: &str = "≔";
