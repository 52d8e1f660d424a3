//! Styling passes over a [`TextStorage`]
//!
//! Three granularities share one walker:
//! - full: reset the whole buffer to defaults and walk the whole document
//! - fragment: reset a range, parse it as standalone text and walk it at its
//!   base offset
//! - chunk: walk a pre-parsed snapshot clipped to a window of lines

use std::ops::Range;
use std::sync::Arc;

use crate::offsets::OffsetTable;
use crate::storage::{AttributedText, TextStorage};
use crate::style::StyleConfiguration;

use super::ast::{parse, Node};
use super::walker::StyleWalker;

/// Text, offset table and AST captured once for a chunked pass
#[derive(Debug, Clone)]
pub struct ParsedSnapshot {
    text: String,
    table: OffsetTable,
    document: Node,
    revision: u64,
}

impl ParsedSnapshot {
    pub fn new(text: String, revision: u64) -> Self {
        let table = OffsetTable::new(&text);
        let document = parse(&text);
        Self {
            text,
            table,
            document,
            revision,
        }
    }

    /// Snapshot the buffer's current text and revision
    pub fn capture<S: TextStorage + ?Sized>(storage: &S) -> Self {
        Self::new(storage.text(), storage.revision())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn table(&self) -> &OffsetTable {
        &self.table
    }

    pub fn document(&self) -> &Node {
        &self.document
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn line_count(&self) -> usize {
        self.table.line_count()
    }

    /// Whether the buffer still holds the text this snapshot was taken from
    pub fn matches<S: TextStorage + ?Sized>(&self, storage: &S) -> bool {
        self.revision == storage.revision() && self.table.len_code_units() == storage.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MarkdownStyler {
    style: Arc<StyleConfiguration>,
}

impl MarkdownStyler {
    pub fn new(style: Arc<StyleConfiguration>) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &StyleConfiguration {
        &self.style
    }

    /// Styled copy of `markdown`, with no pending notifications
    pub fn render(&self, markdown: &str) -> AttributedText {
        let mut storage =
            AttributedText::with_attributes(markdown, &self.style.default_attributes());
        let table = OffsetTable::new(markdown);
        let document = parse(markdown);
        StyleWalker::new(&mut storage, markdown, &table, &self.style).walk(&document);
        storage.take_edits();
        storage
    }

    /// Reset the whole buffer to the default attributes
    pub fn apply_defaults<S: TextStorage + ?Sized>(&self, storage: &mut S) {
        let len = storage.len();
        if len == 0 {
            return;
        }
        storage.begin_editing();
        storage.set_attributes(0..len, &self.style.default_attributes());
        storage.end_editing();
    }

    /// Reset and restyle the whole buffer in one batch
    pub fn apply_full<S: TextStorage + ?Sized>(&self, storage: &mut S) {
        let len = storage.len();
        if len == 0 {
            return;
        }
        let text = storage.text();
        let table = OffsetTable::new(&text);
        let document = parse(&text);

        storage.begin_editing();
        storage.set_attributes(0..len, &self.style.default_attributes());
        StyleWalker::new(storage, &text, &table, &self.style).walk(&document);
        storage.end_editing();
    }

    /// Reset and restyle `range` parsed as standalone text.
    ///
    /// Constructs that span beyond the range are not seen; the next full pass
    /// reconciles them. Returns `false` if the range is empty or out of bounds.
    pub fn apply_fragment<S: TextStorage + ?Sized>(
        &self,
        storage: &mut S,
        range: Range<usize>,
    ) -> bool {
        if range.is_empty() {
            return false;
        }
        let Some(fragment) = storage.text_in(range.clone()) else {
            return false;
        };
        let table = OffsetTable::new(&fragment);
        let document = parse(&fragment);

        storage.begin_editing();
        storage.set_attributes(range.clone(), &self.style.default_attributes());
        StyleWalker::new(storage, &fragment, &table, &self.style)
            .with_base_offset(range.start)
            .walk(&document);
        storage.end_editing();
        true
    }

    /// Style the lines `from_line..to_line` of a snapshot.
    ///
    /// Returns the code-unit window that was styled, or `None` when the
    /// window is empty or the buffer no longer matches the snapshot.
    pub fn apply_chunk<S: TextStorage + ?Sized>(
        &self,
        storage: &mut S,
        snapshot: &ParsedSnapshot,
        from_line: usize,
        to_line: usize,
    ) -> Option<Range<usize>> {
        if !snapshot.matches(storage) || from_line >= to_line {
            return None;
        }
        let window = snapshot.table.line_window(from_line, to_line)?;
        if window.is_empty() {
            return None;
        }

        storage.begin_editing();
        StyleWalker::new(storage, &snapshot.text, &snapshot.table, &self.style)
            .with_clip(window.clone())
            .walk(&snapshot.document);
        storage.end_editing();
        Some(window)
    }
}
