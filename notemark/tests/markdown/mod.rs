//! Markdown engine tests
//!
//! Import, export, front matter and round-trip behaviour of the Markdown engine.

mod export;
mod frontmatter;
mod import;
mod roundtrip;
