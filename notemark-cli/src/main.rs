// Command-line interface for notemark
//
// This binary exposes the Markdown engine behind the notes app: converting notes between the
// registered formats, inspecting what the importer made of a file, editing front matter and
// checking that a note survives an import/export round trip unchanged.
//
// Usage:
//  notemark convert <input> --to <format> [--from <format>] [--output <file>]
//  notemark inspect <path> [<view>]             - Dump the tree (defaults to "treeviz")
//  notemark frontmatter <path> [--set k=v]...   - Print or rewrite the metadata block
//  notemark roundtrip <path>                    - Exit 1 if export(import(x)) is not stable
//
// Engine options come from notemark.toml (current directory, or --config) layered over the
// built-in defaults. Logging goes to stderr.
//
// Extra Parameters:
//
// Format-specific parameters can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix and passes the parameters to the format or view.
// Example:
//  notemark inspect note.md --extra-front-matter --extra-formats

mod logging;
mod transforms;

use clap::{Arg, ArgAction, Command, ValueHint};
use notemark::{
    parse_front_matter, replace_front_matter, ChangeOrigin, FormatRegistry, FrontMatterValue,
    Note, TransformerRegistry,
};
use notemark_config::{Loader, NotemarkConfig};
use std::collections::HashMap;
use std::fs;

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if let Some(key) = arg.strip_prefix("--extra-") {
            let value = args.get(i + 1).filter(|next| !next.starts_with('-'));
            match value {
                Some(value) => {
                    extra_params.insert(key.to_string(), value.clone());
                    i += 2;
                }
                None => {
                    extra_params.insert(key.to_string(), "true".to_string());
                    i += 1;
                }
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("notemark")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Import, export and inspect Markdown notes")
        .long_about(
            "notemark is a command-line tool for the Markdown engine of the notes app.\n\n\
            Commands:\n  \
            - convert:     Transform a note between formats (markdown, treeviz, json)\n  \
            - inspect:     View the imported document tree\n  \
            - frontmatter: Print or rewrite the front matter block\n  \
            - roundtrip:   Check that export(import(note)) is stable\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass format-specific options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            notemark inspect note.md                      # Tree visualization\n  \
            notemark inspect note.md json                 # Full JSON snapshot\n  \
            notemark convert note.md --to markdown        # Normalized Markdown on stdout\n  \
            notemark frontmatter note.md --set title=Plan # Rewrite the title",
        )
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a notemark.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level for stderr output (overrides [log] level)")
                .value_parser(clap::builder::PossibleValuesParser::new(logging::LOG_LEVELS))
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a note between formats")
                .long_about(
                    "Convert notes between the registered formats.\n\n\
                    Supported formats:\n  \
                    - markdown: Markdown with optional front matter (.md, .markdown)\n  \
                    - treeviz:  Tree visualization, output only (.tree)\n  \
                    - json:     JSON snapshot, output only (.json)\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Inspect the document tree of a note")
                .arg(
                    Arg::new("path")
                        .help("Path to the note")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("view")
                        .help("View to render. Defaults to 'treeviz'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            transforms::AVAILABLE_VIEWS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("frontmatter")
                .about("Print or rewrite the front matter of a note")
                .long_about(
                    "Without --set, prints the front matter block of the note.\n\n\
                    With one or more --set key=value, rewrites the block (adding it if the note\n\
                    has none) and prints the whole note, or writes it to -o. The body is copied\n\
                    byte for byte.",
                )
                .arg(
                    Arg::new("path")
                        .help("Path to the note")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("set")
                        .long("set")
                        .value_name("KEY=VALUE")
                        .help("Set a front matter key (repeatable)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("roundtrip")
                .about("Check that exporting an imported note is stable")
                .arg(
                    Arg::new("path")
                        .help("Path to the note")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                ),
        )
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, extra_params) = parse_extra_args(&args);
    let matches = build_cli().get_matches_from(&cleaned_args);

    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    let level = matches
        .get_one::<String>("log-level")
        .cloned()
        .unwrap_or_else(|| config.log.level.clone());
    let _logger = logging::init(&level).unwrap_or_else(|err| {
        eprintln!("Error: {err}");
        std::process::exit(1);
    });
    log::debug!("loaded configuration: {config:?}");

    let result = match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = required(sub_matches, "input");
            let to = required(sub_matches, "to");
            let from = sub_matches.get_one::<String>("from").map(|s| s.as_str());
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(input, from, to, output, &extra_params, &config)
        }
        Some(("inspect", sub_matches)) => {
            let path = required(sub_matches, "path");
            let view = sub_matches
                .get_one::<String>("view")
                .map(|s| s.as_str())
                .unwrap_or("treeviz");
            handle_inspect_command(path, view, &extra_params, &config)
        }
        Some(("frontmatter", sub_matches)) => {
            let path = required(sub_matches, "path");
            let assignments: Vec<&str> = sub_matches
                .get_many::<String>("set")
                .map(|values| values.map(|s| s.as_str()).collect())
                .unwrap_or_default();
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_frontmatter_command(path, &assignments, output)
        }
        Some(("roundtrip", sub_matches)) => {
            handle_roundtrip_command(required(sub_matches, "path"), &config)
        }
        _ => Err("Unknown subcommand. Use --help for usage information.".to_string()),
    };

    if let Err(message) = result {
        eprintln!("Error: {message}");
        std::process::exit(1);
    }
}

fn required<'a>(matches: &'a clap::ArgMatches, name: &str) -> &'a str {
    // clap enforces `.required(true)` before we get here
    matches
        .get_one::<String>(name)
        .map(|s| s.as_str())
        .unwrap_or_default()
}

fn read_source(path: &str) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("reading file '{path}': {e}"))
}

fn write_or_print(output: Option<&str>, text: &str) -> Result<(), String> {
    match output {
        Some(path) => fs::write(path, text).map_err(|e| format!("writing file '{path}': {e}")),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

/// Handle the convert command
fn handle_convert_command(
    input: &str,
    from: Option<&str>,
    to: &str,
    output: Option<&str>,
    extra_params: &HashMap<String, String>,
    config: &NotemarkConfig,
) -> Result<(), String> {
    let registry = FormatRegistry::with_options(config.registry_options());

    let from = match from {
        Some(from) => from.to_string(),
        None => registry.detect_format_from_filename(input).ok_or_else(|| {
            format!("could not detect format from filename '{input}'; specify --from explicitly")
        })?,
    };
    registry.get(&from).map_err(|e| e.to_string())?;
    registry.get(to).map_err(|e| e.to_string())?;

    let source = read_source(input)?;
    let note = registry
        .parse(&source, &from)
        .map_err(|e| format!("parse error: {e}"))?;
    let result = registry
        .serialize_with_options(&note, to, extra_params)
        .map_err(|e| format!("serialization error: {e}"))?;
    log::info!("converted {input} from {from} to {to}");
    write_or_print(output, &result)
}

/// Handle the inspect command
fn handle_inspect_command(
    path: &str,
    view: &str,
    extra_params: &HashMap<String, String>,
    config: &NotemarkConfig,
) -> Result<(), String> {
    let source = read_source(path)?;
    let registry = TransformerRegistry::new(config.registry_options());
    let output = transforms::execute_view(&source, view, &registry, extra_params)?;
    print!("{output}");
    Ok(())
}

/// Handle the frontmatter command
fn handle_frontmatter_command(
    path: &str,
    assignments: &[&str],
    output: Option<&str>,
) -> Result<(), String> {
    let source = read_source(path)?;
    let mut front_matter = parse_front_matter(&source).front_matter;

    if assignments.is_empty() {
        return write_or_print(output, &transforms::front_matter_lines(&front_matter));
    }

    for assignment in assignments {
        let (key, value) = parse_assignment(assignment)?;
        front_matter.insert(key.to_string(), FrontMatterValue::from(value));
    }
    write_or_print(output, &replace_front_matter(&source, &front_matter))
}

fn parse_assignment(assignment: &str) -> Result<(&str, &str), String> {
    let (key, value) = assignment
        .split_once('=')
        .ok_or_else(|| format!("invalid --set '{assignment}': expected key=value"))?;
    let key = key.trim();
    if key.is_empty() || key.contains(':') {
        return Err(format!("invalid --set '{assignment}': bad key"));
    }
    if value.contains('\n') {
        return Err(format!("invalid --set '{assignment}': value spans lines"));
    }
    Ok((key, value.trim()))
}

/// Handle the roundtrip command
///
/// Stable means a second import of the exported text yields the same front matter and tree, and
/// exporting that again yields the same text.
fn handle_roundtrip_command(path: &str, config: &NotemarkConfig) -> Result<(), String> {
    let source = read_source(path)?;
    let registry = TransformerRegistry::new(config.registry_options());

    let first = Note::load(&source, &registry).map_err(|e| format!("import failed: {e}"))?;
    let save = first
        .save(Some(source.clone()), ChangeOrigin::Local, &registry)
        .map_err(|e| format!("export failed: {e}"))?;
    let second =
        Note::load(&save.markdown, &registry).map_err(|e| format!("re-import failed: {e}"))?;
    let again = second
        .to_markdown(&registry)
        .map_err(|e| format!("re-export failed: {e}"))?;

    let same_tree = snapshot(&first)? == snapshot(&second)?;
    let same_front_matter = first.front_matter == second.front_matter;
    if !(same_tree && same_front_matter && again == save.markdown) {
        return Err(format!(
            "'{path}' is not stable under import/export\n--- first export\n{}\n--- second export\n{again}",
            save.markdown
        ));
    }

    if save.is_unchanged() {
        println!("stable: {path} (unchanged)");
    } else {
        println!("stable: {path} (export normalizes the text)");
    }
    Ok(())
}

fn snapshot(note: &Note) -> Result<notemark::tree::NodeSnapshot, String> {
    let doc = &note.document;
    doc.snapshot(doc.root())
        .map(|s| s.normalized())
        .map_err(|e| e.to_string())
}

fn load_cli_config(explicit_path: Option<&str>) -> NotemarkConfig {
    let loader = Loader::new().with_optional_file("notemark.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };
    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}
