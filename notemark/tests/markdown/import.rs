//! Import tests (Markdown → document tree)

use insta::assert_snapshot;
use notemark::formats::treeviz::to_treeviz_str_with_params;
use notemark::tree::{CodeBlock, EmbedKind, EmbedWidth, ListItem, ListKind};
use notemark::{
    parse, Document, ImportError, NodeKey, NodeKind, NodeType, Note, RegistryOptions, TextFormat,
    TransformerRegistry,
};
use std::collections::HashMap;

fn md_to_doc(md: &str) -> Document {
    parse(md, TransformerRegistry::shared()).expect("Should parse markdown")
}

fn blocks(doc: &Document) -> Vec<NodeKey> {
    doc.children(doc.root()).unwrap().to_vec()
}

fn top_types(doc: &Document) -> Vec<NodeType> {
    doc.snapshot(doc.root()).unwrap().child_types()
}

fn runs(doc: &Document, block: NodeKey) -> Vec<(String, TextFormat)> {
    doc.children(block)
        .unwrap()
        .iter()
        .filter_map(|key| match doc.kind(*key).unwrap() {
            NodeKind::Text(run) => Some((run.text.clone(), run.format)),
            _ => None,
        })
        .collect()
}

fn code_block(doc: &Document, key: NodeKey) -> CodeBlock {
    match doc.kind(key).unwrap() {
        NodeKind::CodeBlock(code) => code.clone(),
        other => panic!("Expected code block, got {other:?}"),
    }
}

#[test]
fn test_fenced_code_block() {
    let doc = md_to_doc("```python\nprint(1)\n```");
    assert_eq!(top_types(&doc), vec![NodeType::CodeBlock]);
    let code = code_block(&doc, blocks(&doc)[0]);
    assert_eq!(code.language, "python");
    assert_eq!(code.code, "print(1)");
}

#[test]
fn test_unterminated_fence_is_text() {
    let doc = md_to_doc("```python\nprint(1)");
    assert_eq!(
        top_types(&doc),
        vec![NodeType::Paragraph, NodeType::Paragraph]
    );
    let texts: Vec<String> = blocks(&doc)
        .iter()
        .map(|b| doc.text_content(*b).unwrap())
        .collect();
    assert_eq!(texts, vec!["```python", "print(1)"]);
}

#[test]
fn test_unsupported_language_is_text() {
    for md in ["```nonexistentlang\nfoo\n```", "```cobol\nfoo\n```"] {
        let doc = md_to_doc(md);
        assert!(!top_types(&doc).contains(&NodeType::CodeBlock), "{md}");
        let first = blocks(&doc)[0];
        assert_eq!(doc.text_content(first).unwrap(), md.lines().next().unwrap());
    }
}

#[test]
fn test_fence_without_language_uses_fallback() {
    let doc = md_to_doc("```\nplain\n```");
    let code = code_block(&doc, blocks(&doc)[0]);
    assert_eq!(code.language, "text");
}

#[test]
fn test_fence_attribute_header() {
    let doc = md_to_doc(
        "```python id=\"d5f5ed67-4552-4f32-aeb5-ad4c566ad16a\" isCollapsed=\"true\"\nx = 1\n```",
    );
    let code = code_block(&doc, blocks(&doc)[0]);
    assert_eq!(
        code.id.as_deref(),
        Some("d5f5ed67-4552-4f32-aeb5-ad4c566ad16a")
    );
    assert!(code.is_collapsed);
    assert_eq!(code.last_executed_result, None);

    let doc = md_to_doc("```go\nfmt.Println()\n```");
    let code = code_block(&doc, blocks(&doc)[0]);
    assert_eq!(code.id, None);
    assert!(!code.is_collapsed);
    assert_eq!(code.last_executed_result, None);
}

#[test]
fn test_code_body_is_not_interpreted() {
    let doc = md_to_doc("```text\n# not a heading\n**not bold**\n```\nafter");
    assert_eq!(
        top_types(&doc),
        vec![NodeType::CodeBlock, NodeType::Paragraph]
    );
    let code = code_block(&doc, blocks(&doc)[0]);
    assert_eq!(code.code, "# not a heading\n**not bold**");
}

#[test]
fn test_drawing_payloads() {
    let doc = md_to_doc("```drawing\n[{\"type\":\"rect\"}]\n```\n```drawing\n```");
    assert_eq!(top_types(&doc), vec![NodeType::Drawing, NodeType::Drawing]);
    match doc.kind(blocks(&doc)[1]).unwrap() {
        NodeKind::Drawing(drawing) => assert_eq!(drawing.elements, serde_json::json!([])),
        other => panic!("Expected drawing, got {other:?}"),
    }
}

#[test]
fn test_malformed_drawing_is_an_error() {
    let err = parse(
        "intro\n```drawing\n{not json\n```",
        TransformerRegistry::shared(),
    )
    .unwrap_err();
    assert!(matches!(err, ImportError::MalformedDrawing { line: 2, .. }));
}

#[test]
fn test_malformed_drawing_degrades_when_lenient() {
    let registry = TransformerRegistry::new(RegistryOptions {
        strict_drawings: false,
        ..RegistryOptions::default()
    });
    let doc = parse("```drawing\n{not json\n```", &registry).unwrap();
    assert!(!top_types(&doc).contains(&NodeType::Drawing));
    assert_eq!(doc.text_content(blocks(&doc)[1]).unwrap(), "{not json");
}

#[test]
fn test_italic_needs_word_boundaries() {
    let doc = md_to_doc("a*b*c");
    let p = blocks(&doc)[0];
    assert_eq!(runs(&doc, p), vec![("a*b*c".to_string(), TextFormat::NONE)]);

    let doc = md_to_doc("a *b* c");
    let p = blocks(&doc)[0];
    assert_eq!(
        runs(&doc, p),
        vec![
            ("a ".to_string(), TextFormat::NONE),
            ("b".to_string(), TextFormat::ITALIC),
            (" c".to_string(), TextFormat::NONE),
        ]
    );
}

#[test]
fn test_escaped_tags_are_literal() {
    let doc = md_to_doc(r"\*not italic\* and \# sign");
    let p = blocks(&doc)[0];
    assert_eq!(
        runs(&doc, p),
        vec![("*not italic* and # sign".to_string(), TextFormat::NONE)]
    );
}

#[test]
fn test_bold_and_italic_runs() {
    let doc = md_to_doc("**bold** and *italic*");
    let p = blocks(&doc)[0];
    assert_eq!(
        runs(&doc, p),
        vec![
            ("bold".to_string(), TextFormat::BOLD),
            (" and ".to_string(), TextFormat::NONE),
            ("italic".to_string(), TextFormat::ITALIC),
        ]
    );
}

#[test]
fn test_list_nesting_and_merging() {
    let doc = md_to_doc("- a\n    - b\n\t- c\n1. x\n");
    assert_eq!(
        top_types(&doc),
        vec![
            NodeType::UnorderedList,
            NodeType::OrderedList,
            NodeType::Paragraph
        ]
    );
    let bullet = blocks(&doc)[0];
    let indents: Vec<usize> = doc
        .children(bullet)
        .unwrap()
        .iter()
        .map(|item| match doc.kind(*item).unwrap() {
            NodeKind::ListItem(ListItem { indent, .. }) => *indent,
            other => panic!("Expected list item, got {other:?}"),
        })
        .collect();
    assert_eq!(indents, vec![0, 1, 1]);
}

#[test]
fn test_ordered_list_keeps_its_start() {
    let doc = md_to_doc("3. x\n4. y");
    let list = blocks(&doc)[0];
    assert_eq!(
        doc.kind(list).unwrap(),
        &NodeKind::List {
            kind: ListKind::Number { start: 3 }
        }
    );
    assert_eq!(doc.children(list).unwrap().len(), 2);
}

#[test]
fn test_oversized_ordered_start_stays_text() {
    let doc = md_to_doc("99999999999. x\n4294967295. y");
    assert_eq!(top_types(&doc), vec![NodeType::Paragraph, NodeType::OrderedList]);
    assert_eq!(
        runs(&doc, blocks(&doc)[0]),
        vec![("99999999999. x".to_string(), TextFormat::NONE)]
    );
    assert_eq!(
        doc.kind(blocks(&doc)[1]).unwrap(),
        &NodeKind::List {
            kind: ListKind::Number { start: u32::MAX }
        }
    );
    let exported = notemark::export(&doc, None).unwrap();
    assert!(exported.starts_with("99999999999\\. x\n"), "{exported}");
}

#[test]
fn test_block_embed() {
    let doc = md_to_doc("![cat?width=320](img/cat.png)");
    match doc.kind(blocks(&doc)[0]).unwrap() {
        NodeKind::Embed(embed) => {
            assert_eq!(embed.kind, EmbedKind::Image);
            assert_eq!(embed.alt, "cat");
            assert_eq!(embed.width, EmbedWidth::Pixels(320));
        }
        other => panic!("Expected embed, got {other:?}"),
    }
}

#[test]
fn test_inline_embed_and_autolink() {
    let doc = md_to_doc("clip ![demo](demo.mp4) at https://example.com/x.");
    let p = blocks(&doc)[0];
    assert_eq!(
        doc.snapshot(p).unwrap().child_types(),
        vec![
            NodeType::Text,
            NodeType::Video,
            NodeType::Text,
            NodeType::Autolink,
            NodeType::Text
        ]
    );
}

#[test]
fn test_kitchen_sink_tree() {
    let md = "---\ntitle: Groceries\n---\n# Groceries\n- [x] milk\n- [ ] eggs\n> **bold**/_it_\nlinks:[docs](https://example.com)";
    let note = Note::load(md, TransformerRegistry::shared()).unwrap();
    let mut params = HashMap::new();
    params.insert("front-matter".to_string(), "true".to_string());
    params.insert("formats".to_string(), "true".to_string());
    let tree = to_treeviz_str_with_params(&note, &params).unwrap();

    assert_snapshot!(tree, @r#"
⧉ Document (1 front matter keys, 4 blocks)
≔ title: Groceries
├─ § h1 Groceries
│ └─ ◦ Groceries
├─ ☰ 2 items
│ ├─ ☐ [x] milk
│ │ └─ ◦ milk
│ └─ ☐ [ ] eggs
│   └─ ◦ eggs
├─ " bold/it
│ ├─ ◦ bold [bold]
│ ├─ ◦ /
│ └─ ◦ it [italic]
└─ ¶ links:docs
  ├─ ◦ links:
  └─ ⊕ https://example.com
    └─ ◦ docs
"#);
}
