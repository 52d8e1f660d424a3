//! Markdown styling
//!
//! Parses markdown with pulldown-cmark and overlays attributes onto a
//! [`crate::storage::TextStorage`] without touching its text.

pub mod ast;
mod styler;
mod walker;

pub use ast::{parse, Node, NodeKind};
pub use styler::{MarkdownStyler, ParsedSnapshot};
pub use walker::{detect_marker_length, quote_markers, StyleWalker};
