//! Format implementations
//!
//! Each format converts between a [`crate::note::Note`] and a text representation.

pub mod icons;
pub mod json;
pub mod markdown;
pub mod treeviz;

pub use json::JsonFormat;
pub use markdown::MarkdownFormat;
pub use treeviz::TreevizFormat;
