//! Shared helpers for benchmarks

use std::sync::Arc;

use markstyle::{MarkdownStyler, StyleConfiguration};

/// Markdown document with roughly `lines` lines mixing every styled construct
pub fn make_markdown(lines: usize) -> String {
    let block = [
        "## Section with **bold** title",
        "Paragraph text with *emphasis*, `code` and a [link](https://example.com).",
        "",
        "- [ ] task item",
        "- nested parent",
        "    - nested child with **strong**",
        "",
        "> quoted line with ünïcödé 😀",
        "",
        "1. ordered item",
    ];
    let mut text = String::new();
    for i in 0..lines {
        text.push_str(block[i % block.len()]);
        text.push('\n');
    }
    text
}

pub fn styler() -> MarkdownStyler {
    MarkdownStyler::new(Arc::new(StyleConfiguration::default()))
}
