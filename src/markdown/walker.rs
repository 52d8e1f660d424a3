//! AST walker that overlays construct styling onto a text buffer
//!
//! The walker visits nodes in pre-order. Each node's byte range is mapped to
//! code units through the snapshot's [`OffsetTable`], shifted by the base
//! offset of the parsed fragment, and checked against the buffer length.
//! Nodes whose range cannot be mapped are not styled, but their children
//! still are.
//!
//! With a clip range set, every write is intersected with it, so styling one
//! window of a document leaves the rest untouched.

use std::ops::Range;

use crate::attributes::{
    intersect, Attribute, AttributeKey, LinkTarget, ParagraphStyle, UnderlineStyle,
};
use crate::offsets::OffsetTable;
use crate::storage::TextStorage;
use crate::style::{FontDescriptor, StyleConfiguration};

use super::ast::{Node, NodeKind};

const CHECKBOX_MARKERS: [&str; 3] = ["- [ ] ", "- [x] ", "- [X] "];
const BULLET_MARKERS: [&str; 3] = ["- ", "* ", "+ "];

/// Length in characters of the list marker at the start of `text`.
///
/// Checkbox items count the bullet and the box, ordered items count the
/// digits, the period and one following space. Returns 0 when no marker is
/// recognised.
pub fn detect_marker_length(text: &str) -> usize {
    if CHECKBOX_MARKERS.iter().any(|m| text.starts_with(m)) {
        return 6;
    }
    if BULLET_MARKERS.iter().any(|m| text.starts_with(m)) {
        return 2;
    }
    let bytes = text.as_bytes();
    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits > 0 && bytes.get(digits) == Some(&b'.') {
        return if bytes.get(digits + 1) == Some(&b' ') {
            digits + 2
        } else {
            digits + 1
        };
    }
    0
}

/// Byte ranges of line-leading `>` markers in a blockquote's source text.
///
/// A marker covers the `>` and the single space after it, if any. Markers
/// may be preceded by whitespace or by earlier markers on the same line.
/// A `>` anywhere else in the quote, such as `a > b` in its text, is
/// content and keeps the quote's color.
pub fn quote_markers(text: &str) -> Vec<Range<usize>> {
    let mut markers = Vec::new();
    let mut line_start = 0;
    for line in text.split_inclusive('\n') {
        let bytes = line.as_bytes();
        let mut i = 0;
        loop {
            while matches!(bytes.get(i), Some(b' ') | Some(b'\t')) {
                i += 1;
            }
            if bytes.get(i) != Some(&b'>') {
                break;
            }
            let len = if bytes.get(i + 1) == Some(&b' ') { 2 } else { 1 };
            markers.push(line_start + i..line_start + i + len);
            i += len;
        }
        line_start += line.len();
    }
    markers
}

/// A node's position in both coordinate spaces
struct Resolved {
    units: Range<usize>,
    bytes: Range<usize>,
}

pub struct StyleWalker<'a, S: TextStorage + ?Sized> {
    storage: &'a mut S,
    source: &'a str,
    table: &'a OffsetTable,
    style: &'a StyleConfiguration,
    base_offset: usize,
    clip: Option<Range<usize>>,
    list_depth: usize,
}

impl<'a, S: TextStorage + ?Sized> StyleWalker<'a, S> {
    /// `source` is the parsed text and `table` its offset table
    pub fn new(
        storage: &'a mut S,
        source: &'a str,
        table: &'a OffsetTable,
        style: &'a StyleConfiguration,
    ) -> Self {
        Self {
            storage,
            source,
            table,
            style,
            base_offset: 0,
            clip: None,
            list_depth: 0,
        }
    }

    /// Code-unit offset of `source` within the buffer
    pub fn with_base_offset(mut self, base_offset: usize) -> Self {
        self.base_offset = base_offset;
        self
    }

    /// Restrict every write to `clip`
    pub fn with_clip(mut self, clip: Range<usize>) -> Self {
        self.clip = Some(clip);
        self
    }

    pub fn walk(&mut self, root: &Node) {
        self.visit(root);
    }

    fn visit(&mut self, node: &Node) {
        let resolved = self.resolve(node);
        if let (Some(resolved), Some(clip)) = (&resolved, &self.clip) {
            if resolved.units.end <= clip.start || resolved.units.start >= clip.end {
                return;
            }
        }

        match &node.kind {
            NodeKind::Document | NodeKind::Other => self.visit_children(node),
            NodeKind::Heading(level) => {
                if let Some(resolved) = &resolved {
                    self.style_heading(resolved, *level);
                }
                self.visit_children(node);
            }
            NodeKind::Paragraph => {
                if let Some(resolved) = &resolved {
                    self.style_paragraph(resolved);
                }
                self.visit_children(node);
            }
            NodeKind::BlockQuote => {
                self.list_depth += 1;
                if let Some(resolved) = &resolved {
                    self.style_blockquote(resolved);
                }
                self.visit_children(node);
                self.list_depth -= 1;
            }
            NodeKind::UnorderedList | NodeKind::OrderedList => {
                self.list_depth += 1;
                self.visit_children(node);
                self.list_depth -= 1;
            }
            NodeKind::ListItem => {
                if let Some(resolved) = &resolved {
                    self.style_list_item(resolved);
                }
                self.visit_children(node);
            }
            NodeKind::Strong => {
                if let Some(resolved) = &resolved {
                    self.style_delimited(&resolved.units, 2, FontDescriptor::with_bold);
                }
                self.visit_children(node);
            }
            NodeKind::Emphasis => {
                if let Some(resolved) = &resolved {
                    self.style_delimited(&resolved.units, 1, FontDescriptor::with_italic);
                }
                self.visit_children(node);
            }
            NodeKind::InlineCode => {
                if let Some(resolved) = &resolved {
                    self.style_inline_code(&resolved.units);
                }
            }
            NodeKind::Link { destination } => {
                if let Some(resolved) = &resolved {
                    self.style_link(resolved, destination);
                }
                self.visit_children(node);
            }
        }
    }

    fn visit_children(&mut self, node: &Node) {
        for child in &node.children {
            self.visit(child);
        }
    }

    fn resolve(&self, node: &Node) -> Option<Resolved> {
        let bytes = node.range.clone()?;
        self.source.get(bytes.clone())?;
        let max_length = self.storage.len().checked_sub(self.base_offset)?;
        let units = self.table.code_unit_range(bytes.clone(), max_length)?;
        Some(Resolved {
            units: units.start + self.base_offset..units.end + self.base_offset,
            bytes,
        })
    }

    /// Buffer offset of an absolute byte offset in `source`
    fn unit_at(&self, byte: usize) -> Option<usize> {
        self.table
            .code_unit_offset_at(byte)
            .map(|unit| unit + self.base_offset)
    }

    fn clipped(&self, range: Range<usize>) -> Option<Range<usize>> {
        match &self.clip {
            Some(clip) => intersect(&range, clip),
            None => (range.start < range.end).then_some(range),
        }
    }

    fn add(&mut self, range: Range<usize>, attribute: Attribute) {
        if let Some(range) = self.clipped(range) {
            self.storage.add_attribute(range, attribute);
        }
    }

    /// Write a paragraph style only on the runs where it differs
    fn apply_paragraph_style(&mut self, range: Range<usize>, style: ParagraphStyle) {
        let Some(range) = self.clipped(range) else {
            return;
        };
        let wanted = Attribute::Paragraph(style);
        let mut pos = range.start;
        while pos < range.end {
            let Some((current, run)) = self
                .storage
                .attribute(AttributeKey::Paragraph, pos, pos..range.end)
            else {
                break;
            };
            let run_end = run.end.max(pos + 1);
            if current.as_ref() != Some(&wanted) {
                self.storage.add_attribute(pos..run_end, wanted.clone());
            }
            pos = run_end;
        }
    }

    /// Add a font trait to each existing font run, keeping family and size
    fn apply_font_trait(&mut self, range: Range<usize>, apply: fn(FontDescriptor) -> FontDescriptor) {
        let Some(range) = self.clipped(range) else {
            return;
        };
        let body = self.style.body_font();
        let mut pos = range.start;
        while pos < range.end {
            let Some((current, run)) = self
                .storage
                .attribute(AttributeKey::Font, pos, pos..range.end)
            else {
                break;
            };
            let base = match current {
                Some(Attribute::Font(font)) => font,
                _ => body,
            };
            let run_end = run.end.max(pos + 1);
            self.storage
                .add_attribute(pos..run_end, Attribute::Font(apply(base)));
            pos = run_end;
        }
    }

    fn style_heading(&mut self, resolved: &Resolved, level: u8) {
        let units = resolved.units.clone();
        self.add(units.clone(), Attribute::Font(self.style.heading_font(level)));
        self.add(units.clone(), Attribute::Foreground(self.style.heading_color()));
        let paragraph = self
            .style
            .default_paragraph_style()
            .with_line_height(self.style.heading_line_height(level));
        self.apply_paragraph_style(units.clone(), paragraph);

        // Setext headings have no prefix to dim
        if self.source[resolved.bytes.clone()].starts_with('#') {
            let prefix = level as usize + 1;
            if prefix <= units.len() {
                self.add(
                    units.start..units.start + prefix,
                    Attribute::Foreground(self.style.syntax_color()),
                );
            }
        }
    }

    fn style_paragraph(&mut self, resolved: &Resolved) {
        if self.list_depth == 0 {
            return;
        }
        let indent = self.style.list_indent();
        let head = indent * self.list_depth as f32;
        let paragraph = self
            .style
            .default_paragraph_style()
            .with_indents(head, head - indent);
        self.apply_paragraph_style(resolved.units.clone(), paragraph);
    }

    fn style_blockquote(&mut self, resolved: &Resolved) {
        let units = resolved.units.clone();
        self.add(
            units.clone(),
            Attribute::Foreground(self.style.blockquote_bar_color()),
        );
        let paragraph = self
            .style
            .default_paragraph_style()
            .with_indents(self.style.list_indent() * self.list_depth as f32, 0.0)
            .with_spacing(self.style.paragraph_spacing() / 2.0);
        self.apply_paragraph_style(units, paragraph);

        let text = &self.source[resolved.bytes.clone()];
        for marker in quote_markers(text) {
            let start = self.unit_at(resolved.bytes.start + marker.start);
            let end = self.unit_at(resolved.bytes.start + marker.end);
            if let (Some(start), Some(end)) = (start, end) {
                self.add(start..end, Attribute::Foreground(self.style.syntax_color()));
            }
        }
    }

    fn style_list_item(&mut self, resolved: &Resolved) {
        let units = resolved.units.clone();
        let indent = self.style.list_indent();
        let head = indent * self.list_depth as f32;
        let paragraph = self
            .style
            .default_paragraph_style()
            .with_indents(head, head - indent)
            .with_spacing(self.style.paragraph_spacing() / 3.0);
        self.apply_paragraph_style(units.clone(), paragraph);

        // Nested and indented items start at their indentation
        let text = &self.source[resolved.bytes.clone()];
        let marker_text = text.trim_start_matches([' ', '\t']);
        let leading = text.len() - marker_text.len();
        let marker = detect_marker_length(marker_text);
        if marker == 0 {
            return;
        }
        if let Some(start) = self.unit_at(resolved.bytes.start + leading) {
            let end = (start + marker).min(units.end);
            self.add(start..end, Attribute::Foreground(self.style.syntax_color()));
        }
    }

    /// Strong and emphasis: trait on the content, dimmed delimiters
    fn style_delimited(
        &mut self,
        units: &Range<usize>,
        delimiter: usize,
        apply: fn(FontDescriptor) -> FontDescriptor,
    ) {
        if units.len() > delimiter * 2 {
            self.apply_font_trait(units.start + delimiter..units.end - delimiter, apply);
        }
        let syntax = Attribute::Foreground(self.style.syntax_color());
        let open_end = (units.start + delimiter).min(units.end);
        let close_start = units.end.saturating_sub(delimiter).max(units.start);
        self.add(units.start..open_end, syntax.clone());
        self.add(close_start..units.end, syntax);
    }

    fn style_inline_code(&mut self, units: &Range<usize>) {
        self.add(units.clone(), Attribute::Font(self.style.mono_font()));
        if units.len() > 2 {
            self.add(
                units.start + 1..units.end - 1,
                Attribute::Background(self.style.code_background_color()),
            );
        }
        let syntax = Attribute::Foreground(self.style.syntax_color());
        let open_end = (units.start + 1).min(units.end);
        let close_start = units.end.saturating_sub(1).max(units.start);
        self.add(units.start..open_end, syntax.clone());
        self.add(close_start..units.end, syntax);
    }

    fn style_link(&mut self, resolved: &Resolved, destination: &str) {
        let units = resolved.units.clone();
        let text = &self.source[resolved.bytes.clone()];
        // Autolinks and bare URLs have no bracketed text
        let Some(close) = text.find(']') else {
            return;
        };
        let Some(close_unit) = self.unit_at(resolved.bytes.start + close) else {
            return;
        };

        // An empty label still gets its brackets and destination dimmed
        if close > 1 {
            let label = units.start + 1..close_unit;
            self.add(label.clone(), Attribute::Foreground(self.style.link_color()));
            self.add(label.clone(), Attribute::Underline(UnderlineStyle::Single));
            if let Some(target) = LinkTarget::parse(destination) {
                self.add(label, Attribute::Link(target));
            }
        }

        let syntax = Attribute::Foreground(self.style.syntax_color());
        self.add(units.start..units.start + 1, syntax.clone());
        self.add(close_unit..units.end, syntax);
    }
}
