//! Front matter codec tests

use notemark::{
    has_front_matter, parse_front_matter, replace_front_matter, FrontMatter, FrontMatterValue,
    Note, TransformerRegistry,
};
use proptest::prelude::*;

#[test]
fn test_frontmatter_import() {
    let md = "---\ntitle: My Note\nauthor: Me\n---\n\n# Content\nStart of note.\n";
    assert!(has_front_matter(md));

    let parsed = parse_front_matter(md);
    assert_eq!(
        parsed.front_matter.get("title"),
        Some(&FrontMatterValue::from("My Note"))
    );
    assert_eq!(
        parsed.front_matter.get("author"),
        Some(&FrontMatterValue::from("Me"))
    );
    assert_eq!(parsed.content, "\n# Content\nStart of note.\n");
}

#[test]
fn test_frontmatter_export_keeps_order() {
    let md = "---\nzeta: 1\nalpha: 2\n---\nbody";
    let note = Note::load(md, TransformerRegistry::shared()).unwrap();
    assert_eq!(note.to_markdown(TransformerRegistry::shared()).unwrap(), md);
}

#[test]
fn test_no_frontmatter_block_is_written_when_empty() {
    let note = Note::load("just text", TransformerRegistry::shared()).unwrap();
    assert!(note.front_matter.is_empty());
    assert_eq!(
        note.to_markdown(TransformerRegistry::shared()).unwrap(),
        "just text"
    );
}

#[test]
fn test_unclosed_block_is_content() {
    let md = "---\ntitle: x\nno closing line";
    assert!(!has_front_matter(md));
    assert_eq!(parse_front_matter(md).content, md);
}

#[test]
fn test_crlf_delimiters() {
    let parsed = parse_front_matter("---\r\ntitle: Win\r\n---\r\nbody");
    assert_eq!(
        parsed.front_matter.get("title"),
        Some(&FrontMatterValue::from("Win"))
    );
    assert_eq!(parsed.content, "body");
}

fn front_matter_strategy() -> impl Strategy<Value = FrontMatter> {
    let key = "[a-z][a-z0-9_]{0,8}";
    let text = "[A-Za-z0-9][A-Za-z0-9 ./-]{0,15}[A-Za-z0-9]|[A-Za-z0-9]?";
    let value = prop_oneof![
        text.prop_map(FrontMatterValue::Text),
        prop::collection::vec("[A-Za-z0-9]{1,8}", 1..4).prop_map(FrontMatterValue::List),
    ];
    prop::collection::vec((key, value), 0..6)
        .prop_map(|pairs| pairs.into_iter().collect::<FrontMatter>())
}

proptest! {
    #[test]
    fn replace_then_parse_recovers_front_matter(
        front_matter in front_matter_strategy(),
        body in "[a-z #*\n]{0,40}",
        existing in prop::bool::ANY,
    ) {
        let md = if existing {
            format!("---\nold: value\n---\n{body}")
        } else {
            body.clone()
        };
        let replaced = replace_front_matter(&md, &front_matter);
        let parsed = parse_front_matter(&replaced);
        prop_assert_eq!(&parsed.front_matter, &front_matter);
        prop_assert_eq!(parsed.content, body);
    }
}
