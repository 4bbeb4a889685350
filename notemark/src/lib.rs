//! Bidirectional Markdown engine for notes
//!
//!     This crate turns a note's Markdown into an editable document tree and back. It is a pure
//!     library: no code here assumes a shell, a terminal or a file system layout. The CLI in
//!     `notemark-cli` and the configuration loader in `notemark-config` sit on top of it.
//!
//! Architecture
//!
//!     Everything is driven by one ordered table of transformers (./transformers). The importer
//!     walks the input line by line, offers each line to the element transformers and then
//!     resolves inline tags and spans inside whatever text is left. The exporter walks the tree
//!     and asks the same table to render every node. Keeping both directions in one table is what
//!     makes import(export(tree)) stable.
//!
//!     The file structure:
//!     .
//!     ├── error.rs
//!     ├── tree                    # Arena document tree, node kinds, format flags
//!     ├── transformers            # Element, text-format and text-match transformers
//!     ├── markdown
//!     │   ├── import.rs           # Line-oriented block import
//!     │   ├── inline.rs           # Tag and span resolution inside text runs
//!     │   ├── fence.rs            # Fenced code blocks and drawings
//!     │   ├── escape.rs           # Backslash escaping rules
//!     │   └── export.rs           # Block rendering and the tag stack machine
//!     ├── frontmatter.rs          # `---` metadata block codec
//!     ├── shortcuts.rs            # Typing-time transforms
//!     ├── note.rs                 # Note = front matter + document, save decisions
//!     ├── session.rs              # Load tickets for the note open in a view
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     └── formats                 # markdown, treeviz, json
//!
//! Testing
//!     tests
//!     └── markdown
//!         ├── import.rs
//!         ├── export.rs
//!         ├── frontmatter.rs
//!         └── roundtrip.rs
//!
//!     Rust does not discover tests in subdirectories by default, so tests/lib.rs includes them.
//!
//! Round Trip
//!
//!     Export never emits syntax that imports as something else: paragraph lines that look like
//!     a block prefix are escaped, literal tag characters get backslashes, and every `_` inside
//!     italic is escaped so the `_` closer is unambiguous. The property tests in
//!     tests/markdown/roundtrip.rs check this on generated documents.

pub mod error;
pub mod format;
pub mod formats;
pub mod frontmatter;
pub mod markdown;
pub mod note;
pub mod registry;
pub mod session;
pub mod shortcuts;
pub mod transformers;
pub mod tree;

pub use error::{ExportError, FormatError, ImportError, TreeError};
pub use format::Format;
pub use frontmatter::{
    has_front_matter, parse_front_matter, replace_front_matter, serialize_front_matter,
    FrontMatter, FrontMatterValue, ParsedNote,
};
pub use markdown::{export, export_with, import, import_with, parse};
pub use note::{ChangeOrigin, Note, NoteSave};
pub use registry::FormatRegistry;
pub use session::{EditSession, LoadOutcome, LoadTicket};
pub use transformers::{RegistryOptions, TransformerRegistry};
pub use tree::{Document, NodeKey, NodeKind, NodeType, Selection, TextFormat};
