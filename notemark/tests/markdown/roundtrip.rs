//! Round-trip tests: import(export(tree)) reproduces the tree

use notemark::transformers::DEFAULT_LANGUAGES;
use notemark::tree::{CodeBlock, HeadingLevel, ListItem, ListKind};
use notemark::{export, parse, Document, NodeKind, TextFormat, TransformerRegistry};
use proptest::prelude::*;

type Runs = Vec<(String, TextFormat)>;

#[derive(Debug, Clone)]
enum Block {
    Paragraph(Runs),
    Heading(u8, Runs),
    Quote(Runs),
    Bullet(usize, Runs),
    Check(bool, Runs),
    Code(CodeBlock),
}

fn format_strategy() -> impl Strategy<Value = TextFormat> {
    prop::sample::select(vec![
        TextFormat::NONE,
        TextFormat::BOLD,
        TextFormat::ITALIC,
        TextFormat::STRIKETHROUGH,
        TextFormat::CODE,
        TextFormat::BOLD | TextFormat::ITALIC,
    ])
}

fn runs_strategy() -> BoxedStrategy<Runs> {
    let run = (
        prop::collection::vec("[a-z0-9]{1,6}", 1..4).prop_map(|words| words.join(" ")),
        format_strategy(),
    );
    prop::collection::vec(run, 1..4)
        .prop_map(|runs| {
            let mut out = Vec::new();
            for (index, run) in runs.into_iter().enumerate() {
                if index > 0 {
                    out.push((" ".to_string(), TextFormat::NONE));
                }
                out.push(run);
            }
            out
        })
        .boxed()
}

fn punctuated_format() -> impl Strategy<Value = TextFormat> {
    prop::sample::select(vec![
        TextFormat::NONE,
        TextFormat::BOLD,
        TextFormat::ITALIC,
        TextFormat::STRIKETHROUGH,
        TextFormat::CODE,
        TextFormat::BOLD | TextFormat::ITALIC,
        TextFormat::ITALIC | TextFormat::STRIKETHROUGH,
        TextFormat::CODE | TextFormat::ITALIC,
        TextFormat::CODE | TextFormat::BOLD,
    ])
}

/// Runs whose edges may be tag characters, escapes or brackets, glued together with no
/// separator. Texts never start or end with whitespace, and code never holds a backtick or
/// a backslash.
fn punctuated_runs_strategy() -> BoxedStrategy<Runs> {
    let run = punctuated_format().prop_flat_map(|format| {
        let text = if format.contains(TextFormat::CODE) {
            r"[a-z0-9*_~.,:!-]([a-z0-9 *_~.,:!-]{0,4}[a-z0-9*_~.,:!-])?".boxed()
        } else {
            r"[a-z0-9*_~\[\]\\.,:!-]([a-z0-9 *_~\[\]\\.,:!-]{0,6}[a-z0-9*_~\[\]\\.,:!-])?"
                .boxed()
        };
        (text, Just(format))
    });
    prop::collection::vec(run, 1..6)
        .prop_map(separate_italics)
        .boxed()
}

/// The character a run shows at one of its ends once exported.
fn edge(run: &(String, TextFormat), end: bool) -> char {
    if run.1.contains(TextFormat::CODE) {
        return '`';
    }
    let edge = if end {
        run.0.chars().next_back()
    } else {
        run.0.chars().next()
    };
    edge.unwrap_or(' ')
}

/// Italic cannot start or stop right next to a letter or digit. Put a `.` in between where
/// a generated sequence asks for that.
fn separate_italics(runs: Runs) -> Runs {
    let mut out: Runs = Vec::with_capacity(runs.len());
    for run in runs {
        let separator = out.last().and_then(|prev| {
            let toggles =
                prev.1.contains(TextFormat::ITALIC) != run.1.contains(TextFormat::ITALIC);
            let touches_word =
                edge(prev, true).is_alphanumeric() || edge(&run, false).is_alphanumeric();
            (toggles && touches_word).then(|| {
                let shared = prev
                    .1
                    .intersection(run.1)
                    .difference(TextFormat::ITALIC | TextFormat::CODE);
                (".".to_string(), shared)
            })
        });
        out.extend(separator);
        out.push(run);
    }
    out
}

fn code_strategy() -> impl Strategy<Value = CodeBlock> {
    (
        prop::sample::select(DEFAULT_LANGUAGES.to_vec()),
        prop::collection::vec("[a-z0-9]{1,10}", 0..4),
        prop::bool::ANY,
        prop::option::of("[a-z0-9]{1,8}"),
    )
        .prop_map(|(language, lines, is_collapsed, result)| {
            let mut code = CodeBlock::new(language, lines.join("\n"));
            code.is_collapsed = is_collapsed;
            code.last_executed_result = result;
            code
        })
}

fn block_strategy(runs: fn() -> BoxedStrategy<Runs>) -> impl Strategy<Value = Block> {
    prop_oneof![
        runs().prop_map(Block::Paragraph),
        (1u8..=3, runs()).prop_map(|(level, runs)| Block::Heading(level, runs)),
        runs().prop_map(Block::Quote),
        (0usize..3, runs()).prop_map(|(indent, runs)| Block::Bullet(indent, runs)),
        (prop::bool::ANY, runs()).prop_map(|(done, runs)| Block::Check(done, runs)),
        code_strategy().prop_map(Block::Code),
    ]
}

fn append_runs(doc: &mut Document, parent: notemark::NodeKey, runs: &[(String, TextFormat)]) {
    for (text, format) in runs {
        let run = doc.create_text(text.clone(), *format);
        doc.append(parent, run).unwrap();
    }
}

/// Build a document, merging adjacent list items of the same kind into one list the way the
/// importer does.
fn build(blocks: &[Block]) -> Document {
    let mut doc = Document::new();
    let root = doc.root();
    let mut current_list: Option<(ListKind, notemark::NodeKey)> = None;

    for block in blocks {
        let (list_kind, item) = match block {
            Block::Bullet(indent, _) => (
                Some(ListKind::Bullet),
                ListItem {
                    indent: *indent,
                    checked: None,
                },
            ),
            Block::Check(done, _) => (
                Some(ListKind::Check),
                ListItem {
                    indent: 0,
                    checked: Some(*done),
                },
            ),
            _ => (None, ListItem::default()),
        };

        if let Some(kind) = list_kind {
            let list = match current_list {
                Some((open, list)) if open == kind => list,
                _ => {
                    let list = doc.create(NodeKind::List { kind });
                    doc.append(root, list).unwrap();
                    current_list = Some((kind, list));
                    list
                }
            };
            let node = doc.create(NodeKind::ListItem(item));
            doc.append(list, node).unwrap();
            if let Block::Bullet(_, runs) | Block::Check(_, runs) = block {
                append_runs(&mut doc, node, runs);
            }
            continue;
        }

        current_list = None;
        let (kind, runs) = match block {
            Block::Paragraph(runs) => (NodeKind::Paragraph, Some(runs)),
            Block::Heading(level, runs) => (
                NodeKind::Heading {
                    level: HeadingLevel::new(*level).unwrap(),
                },
                Some(runs),
            ),
            Block::Quote(runs) => (NodeKind::Quote, Some(runs)),
            Block::Code(code) => (NodeKind::CodeBlock(code.clone()), None),
            Block::Bullet(..) | Block::Check(..) => unreachable!(),
        };
        let node = doc.create(kind);
        doc.append(root, node).unwrap();
        if let Some(runs) = runs {
            append_runs(&mut doc, node, runs);
        }
    }
    doc
}

fn assert_stable(md: &str) {
    let registry = TransformerRegistry::shared();
    let first = parse(md, registry).unwrap();
    let exported = export(&first, None).unwrap();
    let second = parse(&exported, registry).unwrap();
    assert_eq!(
        first.snapshot(first.root()).unwrap().normalized(),
        second.snapshot(second.root()).unwrap().normalized(),
        "unstable export:\n{exported}"
    );
    assert_eq!(export(&second, None).unwrap(), exported);
}

#[test]
fn test_kitchen_sink_is_stable() {
    assert_stable(
        "# Plan\n\
         Some **bold**, *italic*, ~~struck~~ and `code` text.\n\
         > a quote with [a link](https://example.com)\n\
         - [x] done\n\
         - [ ] todo\n\
         1. first\n\
         2. second\n\
         ```python id=\"a1\" isCollapsed=\"true\"\n\
         print('**not bold**')\n\
         ```\n\
         ![diagram](img/diagram.png)\n\
         see https://example.com/path now",
    );
}

#[test]
fn test_escaped_syntax_is_stable() {
    assert_stable("\\# not a heading\n\\- not a list\n1\\. not ordered\nsnake_case and 2 \\* 3");
}

#[test]
fn test_oversized_ordered_start_is_stable() {
    assert_stable("99999999999. kept as text\n7. seven");
}

#[test]
fn test_formatted_run_before_escaped_text_is_stable() {
    assert_stable("**Note**[1] see");
    assert_stable("See `cfg`*");
    assert_stable("*a*_ and ~~b~~\\ and **c\\*** d");

    let doc = parse("**Note**[1] see", TransformerRegistry::shared()).unwrap();
    assert_eq!(export(&doc, None).unwrap(), "**Note**\\[1\\] see");
}

#[test]
fn test_italic_with_underscores_is_stable() {
    assert_stable("use *my_var* here");
    assert_stable("*_*");
    assert_stable("*.a_xaba*");
    assert_stable("*a _*");

    let doc = parse("use *my_var* here", TransformerRegistry::shared()).unwrap();
    assert_eq!(export(&doc, None).unwrap(), "use _my\\_var_ here");
}

#[test]
fn test_code_inside_italic_is_stable() {
    assert_stable("*`_`* and *a`x_`*");
    assert_stable("~~*b*~~ c");
}

#[test]
fn test_crlf_input_exports_with_lf() {
    let doc = parse("# a\r\nb\r\n", TransformerRegistry::shared()).unwrap();
    let md = export(&doc, None).unwrap();
    assert!(!md.contains('\r'));
    assert!(md.starts_with("# a\nb"));
}

fn reproduces(doc: &Document) -> Result<(), TestCaseError> {
    let md = export(doc, None).unwrap();
    let reparsed = parse(&md, TransformerRegistry::shared()).unwrap();
    prop_assert_eq!(
        doc.snapshot(doc.root()).unwrap().normalized(),
        reparsed.snapshot(reparsed.root()).unwrap().normalized(),
        "exported markdown:\n{}",
        md
    );
    Ok(())
}

proptest! {
    #[test]
    fn export_then_import_reproduces_the_tree(
        blocks in prop::collection::vec(block_strategy(runs_strategy), 1..8)
    ) {
        reproduces(&build(&blocks))?;
    }

    #[test]
    fn punctuated_runs_survive_a_round_trip(
        blocks in prop::collection::vec(block_strategy(punctuated_runs_strategy), 1..6)
    ) {
        reproduces(&build(&blocks))?;
    }

    #[test]
    fn import_then_export_is_stable(line in r"a [ab *_~`\[\]\\.,:#>1-]{0,24}") {
        let registry = TransformerRegistry::shared();
        let first = parse(&line, registry).unwrap();
        let exported = export(&first, None).unwrap();
        let second = parse(&exported, registry).unwrap();
        prop_assert_eq!(
            first.snapshot(first.root()).unwrap().normalized(),
            second.snapshot(second.root()).unwrap().normalized(),
            "exported markdown:\n{}",
            exported
        );
    }
}
