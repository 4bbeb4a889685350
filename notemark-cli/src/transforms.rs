//! Inspect views
//!
//! Each view turns a note file into a developer-facing dump of what the engine made of it.
//!
//! - `treeviz`: the document tree with Unicode icons (default)
//! - `json`: front matter plus a full snapshot of the tree
//! - `frontmatter`: the metadata block only, one `key: value` per line
//!
//! ## Extra Parameters
//!
//! Views accept extra parameters via `--extra-<name> [value]`, handed to the underlying format:
//!
//! - `front-matter`: list front matter keys in the treeviz header
//! - `formats`: show text format flags in treeviz labels
//! - `pretty`: pretty-print JSON (default true for inspect)
//!
//! Example: `notemark inspect note.md treeviz --extra-formats`

use notemark::formats::json::to_json_value;
use notemark::formats::treeviz::to_treeviz_str_with_params;
use notemark::{FrontMatter, FrontMatterValue, Note, TransformerRegistry};
use std::collections::HashMap;

/// All available inspect views
pub const AVAILABLE_VIEWS: &[&str] = &["treeviz", "json", "frontmatter"];

/// Load `source` as a note and render it with the named view.
///
/// # Examples
///
/// ```ignore
/// let registry = TransformerRegistry::default();
/// let output = execute_view("# Title", "treeviz", &registry, &HashMap::new())?;
/// ```
pub fn execute_view(
    source: &str,
    view: &str,
    registry: &TransformerRegistry,
    extra_params: &HashMap<String, String>,
) -> Result<String, String> {
    let note = Note::load(source, registry).map_err(|e| format!("Import failed: {e}"))?;

    match view {
        "treeviz" => to_treeviz_str_with_params(&note, extra_params)
            .map_err(|e| format!("Treeviz rendering failed: {e}")),
        "json" => {
            let value = to_json_value(&note).map_err(|e| format!("Snapshot failed: {e}"))?;
            let compact = extra_params
                .get("pretty")
                .is_some_and(|v| v.eq_ignore_ascii_case("false"));
            let rendered = if compact {
                serde_json::to_string(&value)
            } else {
                serde_json::to_string_pretty(&value)
            };
            rendered
                .map(|json| format!("{json}\n"))
                .map_err(|e| format!("JSON serialization failed: {e}"))
        }
        "frontmatter" => Ok(front_matter_lines(&note.front_matter)),
        other => Err(format!(
            "Unknown view '{other}'. Available views: {}",
            AVAILABLE_VIEWS.join(", ")
        )),
    }
}

/// One `key: value` line per entry; list values as indented `- item` lines.
pub fn front_matter_lines(front_matter: &FrontMatter) -> String {
    let mut out = String::new();
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
    out
}
