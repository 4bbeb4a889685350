//! Export tests (document tree → Markdown)

use notemark::tree::{CodeBlock, Drawing, Embed, EmbedWidth, ListItem, ListKind};
use notemark::{
    export, export_with, parse, Document, ExportError, NodeKey, NodeKind, RegistryOptions,
    TextFormat, TransformerRegistry,
};

fn block(doc: &mut Document, kind: NodeKind, runs: &[(&str, TextFormat)]) -> NodeKey {
    let node = doc.create(kind);
    for (text, format) in runs {
        let run = doc.create_text(*text, *format);
        doc.append(node, run).unwrap();
    }
    doc.append(doc.root(), node).unwrap();
    node
}

fn roundtrip(md: &str) -> String {
    let doc = parse(md, TransformerRegistry::shared()).unwrap();
    export(&doc, None).unwrap()
}

#[test]
fn test_bold_and_italic_roundtrip() {
    let out = roundtrip("**bold** and *italic*");
    assert_eq!(out, "**bold** and _italic_");

    let again = parse(&out, TransformerRegistry::shared()).unwrap();
    let p = again.children(again.root()).unwrap()[0];
    let formats: Vec<(String, TextFormat)> = again
        .children(p)
        .unwrap()
        .iter()
        .map(|k| (again.text(*k).unwrap().to_string(), again.format(*k).unwrap()))
        .collect();
    assert_eq!(
        formats,
        vec![
            ("bold".to_string(), TextFormat::BOLD),
            (" and ".to_string(), TextFormat::NONE),
            ("italic".to_string(), TextFormat::ITALIC),
        ]
    );
}

#[test]
fn test_blocks_are_joined_by_newlines() {
    let md = "# One\n## Two\n### Three\n> quote\n- a\n    - b\n1. x\n2. y\n- [x] done\n- [ ] todo\n\nplain";
    assert_eq!(roundtrip(md), md);
}

#[test]
fn test_code_block_header() {
    let mut doc = Document::new();
    let code = doc.create(NodeKind::CodeBlock(CodeBlock {
        id: Some("abc".to_string()),
        language: "python".to_string(),
        code: "print(\"hi\")".to_string(),
        is_collapsed: true,
        last_executed_result: Some("say \"hi\"".to_string()),
    }));
    doc.append(doc.root(), code).unwrap();
    assert_eq!(
        export(&doc, None).unwrap(),
        "```python id=\"abc\" isCollapsed=\"true\" lastExecutedResult=\"say \\\"hi\\\"\"\nprint(\"hi\")\n```"
    );
    assert_eq!(roundtrip(&export(&doc, None).unwrap()), export(&doc, None).unwrap());
}

#[test]
fn test_empty_code_block_has_no_body() {
    let mut doc = Document::new();
    let code = doc.create(NodeKind::CodeBlock(CodeBlock::new("go", "")));
    doc.append(doc.root(), code).unwrap();
    assert_eq!(export(&doc, None).unwrap(), "```go isCollapsed=\"false\"\n```");
}

#[test]
fn test_drawing_uses_configured_token() {
    let registry = TransformerRegistry::new(RegistryOptions {
        drawing_language: "excalidraw".to_string(),
        ..RegistryOptions::default()
    });
    let mut doc = Document::new();
    let drawing = doc.create(NodeKind::Drawing(Drawing {
        elements: serde_json::json!([{"id": 1}]),
    }));
    doc.append(doc.root(), drawing).unwrap();
    assert_eq!(
        export_with(&doc, None, &registry).unwrap(),
        "```excalidraw\n[{\"id\":1}]\n```"
    );
}

#[test]
fn test_embed_dimensions() {
    let mut doc = Document::new();
    let mut embed = Embed::new("img/cat.png", "cat");
    embed.width = EmbedWidth::Pixels(320);
    embed.height = Some(200);
    let node = doc.create(NodeKind::Embed(embed));
    doc.append(doc.root(), node).unwrap();
    assert_eq!(
        export(&doc, None).unwrap(),
        "![cat?width=320&height=200](img/cat.png)"
    );
}

#[test]
fn test_literal_syntax_is_escaped() {
    let mut doc = Document::new();
    block(
        &mut doc,
        NodeKind::Paragraph,
        &[("# 1. *star* [x] snake_case `tick`", TextFormat::NONE)],
    );
    block(&mut doc, NodeKind::Paragraph, &[("- not a list", TextFormat::NONE)]);
    let out = export(&doc, None).unwrap();
    assert_eq!(
        out,
        "\\# 1. \\*star\\* \\[x\\] snake_case \\`tick\\`\n\\- not a list"
    );
    assert_eq!(roundtrip(&out), out);
}

#[test]
fn test_nested_formats_close_in_order() {
    let mut doc = Document::new();
    block(
        &mut doc,
        NodeKind::Paragraph,
        &[
            ("a", TextFormat::BOLD),
            ("b", TextFormat::BOLD | TextFormat::ITALIC),
            ("c", TextFormat::BOLD | TextFormat::STRIKETHROUGH),
            (" d", TextFormat::NONE),
        ],
    );
    let out = export(&doc, None).unwrap();
    assert_eq!(out, "**a_b_~~c~~** d");
}

#[test]
fn test_export_single_node() {
    let mut doc = Document::new();
    block(&mut doc, NodeKind::Paragraph, &[("first", TextFormat::NONE)]);
    let list = doc.create(NodeKind::List {
        kind: ListKind::Bullet,
    });
    let item = doc.create(NodeKind::ListItem(ListItem::default()));
    let text = doc.create_text("only", TextFormat::ITALIC);
    doc.append(item, text).unwrap();
    doc.append(list, item).unwrap();
    doc.append(doc.root(), list).unwrap();

    assert_eq!(export(&doc, Some(list)).unwrap(), "- _only_");
    assert_eq!(export(&doc, Some(text)).unwrap(), "_only_");
}

#[test]
fn test_stray_list_item_is_unhandled() {
    let mut doc = Document::new();
    let item = doc.create(NodeKind::ListItem(ListItem::default()));
    doc.append(doc.root(), item).unwrap();
    assert!(matches!(
        export(&doc, None),
        Err(ExportError::UnhandledNode { key, .. }) if key == item
    ));
}
