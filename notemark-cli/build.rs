use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the views from src/transforms.rs and levels from src/logging.rs
// We need to duplicate these here since build scripts can't access src/ modules
const AVAILABLE_VIEWS: &[&str] = &["treeviz", "json", "frontmatter"];
const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

fn path_arg() -> Arg {
    Arg::new("path")
        .help("Path to the note")
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("notemark")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Import, export and inspect Markdown notes")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_parser(clap::builder::PossibleValuesParser::new(LOG_LEVELS))
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .arg(path_arg())
                .arg(Arg::new("from").long("from").value_hint(ValueHint::Other))
                .arg(Arg::new("to").long("to").value_hint(ValueHint::Other))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("inspect").arg(path_arg()).arg(
                Arg::new("view")
                    .value_parser(clap::builder::PossibleValuesParser::new(AVAILABLE_VIEWS))
                    .index(2)
                    .value_hint(ValueHint::Other),
            ),
        )
        .subcommand(
            Command::new("frontmatter")
                .arg(path_arg())
                .arg(Arg::new("set").long("set").action(ArgAction::Append))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(Command::new("roundtrip").arg(path_arg()));

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "notemark", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "notemark", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "notemark", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
