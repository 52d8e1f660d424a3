//! Host text buffer interface and the in-memory reference buffer
//!
//! All ranges are UTF-16 code-unit ranges. Styling only ever writes
//! attributes through [`TextStorage`]; characters change only through the
//! host (here: [`AttributedText::replace`]).

use std::ops::Range;

use ropey::Rope;

use crate::attributes::{Attribute, AttributeKey, Attributes, StyledSpan};
use crate::util::{is_paragraph_separator, utf16_len};

/// What changed in an edit notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// Characters were inserted, removed or replaced
    Characters,
    /// Only attributes changed; text is untouched
    Attributes,
}

/// An edit notification delivered by the host buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub kind: EditKind,
    /// Post-edit range covering the changed characters
    pub range: Range<usize>,
    /// New length minus old length, in code units
    pub change_in_length: isize,
}

/// The styled buffer the engine writes attributes into
pub trait TextStorage {
    /// Length in UTF-16 code units
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counter bumped on every character change
    fn revision(&self) -> u64;

    /// Snapshot of the full text
    fn text(&self) -> String;

    /// Text of a code-unit range, `None` if out of bounds
    fn text_in(&self, range: Range<usize>) -> Option<String>;

    /// Range of the whole paragraph(s) covering `range`, terminators included
    fn paragraph_range(&self, range: Range<usize>) -> Range<usize>;

    /// Start grouping attribute writes into one notification
    fn begin_editing(&mut self);

    fn end_editing(&mut self);

    /// Replace every attribute in `range`
    fn set_attributes(&mut self, range: Range<usize>, attributes: &Attributes);

    /// Set one attribute in `range`, leaving the others alone
    fn add_attribute(&mut self, range: Range<usize>, attribute: Attribute);

    /// Value of `key` at `at` and the longest range within `limit` holding
    /// that same value.
    ///
    /// Returns `None` only when `at` is out of bounds or outside `limit`.
    fn attribute(
        &self,
        key: AttributeKey,
        at: usize,
        limit: Range<usize>,
    ) -> Option<(Option<Attribute>, Range<usize>)>;
}

/// Rope-backed text with one attribute set per code unit
#[derive(Debug, Clone, Default)]
pub struct AttributedText {
    rope: Rope,
    attributes: Vec<Attributes>,
    revision: u64,
    batch_depth: usize,
    batch_range: Option<Range<usize>>,
    edits: Vec<TextEdit>,
}

impl AttributedText {
    pub fn new(text: &str) -> Self {
        Self::with_attributes(text, &Attributes::default())
    }

    pub fn with_attributes(text: &str, attributes: &Attributes) -> Self {
        let rope = Rope::from_str(text);
        let len = rope.len_utf16_cu();
        Self {
            rope,
            attributes: vec![attributes.clone(); len],
            ..Self::default()
        }
    }

    /// Attributes of the code unit at `at`
    pub fn attributes_at(&self, at: usize) -> Option<&Attributes> {
        self.attributes.get(at)
    }

    /// Replace the characters in `range` with `text`, as a user edit would.
    ///
    /// Inserted characters inherit the attributes of the preceding character.
    /// Returns `None` (and changes nothing) for out-of-bounds ranges or ranges
    /// that split a surrogate pair.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> Option<TextEdit> {
        let len = self.len();
        if range.start > range.end
            || range.end > len
            || !self.is_boundary(range.start)
            || !self.is_boundary(range.end)
        {
            return None;
        }

        let start_char = self.rope.utf16_cu_to_char(range.start);
        let end_char = self.rope.utf16_cu_to_char(range.end);
        let inherited = if range.start > 0 {
            self.attributes[range.start - 1].clone()
        } else {
            self.attributes.get(range.end).cloned().unwrap_or_default()
        };

        self.rope.remove(start_char..end_char);
        self.rope.insert(start_char, text);

        let inserted = utf16_len(text);
        self.attributes.splice(
            range.clone(),
            std::iter::repeat(inherited).take(inserted),
        );
        self.revision = self.revision.wrapping_add(1);

        let edit = TextEdit {
            kind: EditKind::Characters,
            range: range.start..range.start + inserted,
            change_in_length: inserted as isize - range.len() as isize,
        };
        self.edits.push(edit.clone());
        Some(edit)
    }

    /// Insert `text` at `at`
    pub fn insert(&mut self, at: usize, text: &str) -> Option<TextEdit> {
        self.replace(at..at, text)
    }

    /// Drain pending edit notifications
    pub fn take_edits(&mut self) -> Vec<TextEdit> {
        std::mem::take(&mut self.edits)
    }

    /// Coalesced runs of identical attributes covering the whole text
    pub fn runs(&self) -> Vec<StyledSpan> {
        let mut runs: Vec<StyledSpan> = Vec::new();
        for (i, attrs) in self.attributes.iter().enumerate() {
            match runs.last_mut() {
                Some(run) if run.attributes == *attrs => run.range.end = i + 1,
                _ => runs.push(StyledSpan {
                    range: i..i + 1,
                    attributes: attrs.clone(),
                }),
            }
        }
        runs
    }

    fn is_boundary(&self, code_unit: usize) -> bool {
        code_unit >= self.len()
            || self
                .rope
                .char_to_utf16_cu(self.rope.utf16_cu_to_char(code_unit))
                == code_unit
    }

    fn clamp(&self, range: Range<usize>) -> Option<Range<usize>> {
        let len = self.len();
        let start = range.start.min(len);
        let end = range.end.min(len);
        (start < end).then_some(start..end)
    }

    fn attributes_changed(&mut self, range: Range<usize>) {
        if self.batch_depth > 0 {
            self.batch_range = Some(match self.batch_range.take() {
                Some(pending) => pending.start.min(range.start)..pending.end.max(range.end),
                None => range,
            });
        } else {
            self.edits.push(TextEdit {
                kind: EditKind::Attributes,
                range,
                change_in_length: 0,
            });
        }
    }
}

impl TextStorage for AttributedText {
    fn len(&self) -> usize {
        self.rope.len_utf16_cu()
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn text(&self) -> String {
        self.rope.to_string()
    }

    fn text_in(&self, range: Range<usize>) -> Option<String> {
        if range.start > range.end || range.end > self.len() {
            return None;
        }
        let start = self.rope.utf16_cu_to_char(range.start);
        let end = self.rope.utf16_cu_to_char(range.end);
        Some(self.rope.slice(start..end).to_string())
    }

    fn paragraph_range(&self, range: Range<usize>) -> Range<usize> {
        let len_chars = self.rope.len_chars();
        let start_char = self.rope.utf16_cu_to_char(range.start.min(self.len()));
        let end_char = self.rope.utf16_cu_to_char(range.end.min(self.len()));

        let mut chars = self.rope.chars_at(start_char);
        let mut para_start = start_char;
        while let Some(ch) = chars.prev() {
            if is_paragraph_separator(ch) {
                break;
            }
            para_start -= 1;
        }

        let last_char = if end_char > start_char {
            end_char - 1
        } else {
            start_char
        };
        let mut para_end = len_chars;
        let mut chars = self.rope.chars_at(last_char).peekable();
        let mut idx = last_char;
        while let Some(ch) = chars.next() {
            if is_paragraph_separator(ch) {
                para_end = idx + 1;
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    para_end += 1;
                }
                break;
            }
            idx += 1;
        }

        self.rope.char_to_utf16_cu(para_start)..self.rope.char_to_utf16_cu(para_end)
    }

    fn begin_editing(&mut self) {
        self.batch_depth += 1;
    }

    fn end_editing(&mut self) {
        self.batch_depth = self.batch_depth.saturating_sub(1);
        if self.batch_depth == 0 {
            if let Some(range) = self.batch_range.take() {
                self.attributes_changed(range);
            }
        }
    }

    fn set_attributes(&mut self, range: Range<usize>, attributes: &Attributes) {
        let Some(range) = self.clamp(range) else {
            return;
        };
        self.attributes[range.clone()].fill(attributes.clone());
        self.attributes_changed(range);
    }

    fn add_attribute(&mut self, range: Range<usize>, attribute: Attribute) {
        let Some(range) = self.clamp(range) else {
            return;
        };
        for attrs in &mut self.attributes[range.clone()] {
            attrs.set(attribute.clone());
        }
        self.attributes_changed(range);
    }

    fn attribute(
        &self,
        key: AttributeKey,
        at: usize,
        limit: Range<usize>,
    ) -> Option<(Option<Attribute>, Range<usize>)> {
        if !limit.contains(&at) {
            return None;
        }
        let current = self.attributes.get(at)?;
        let floor = limit.start;
        let ceiling = limit.end.min(self.attributes.len());
        let mut start = at;
        while start > floor && self.attributes[start - 1].same_value(current, key) {
            start -= 1;
        }
        let mut end = at + 1;
        while end < ceiling && self.attributes[end].same_value(current, key) {
            end += 1;
        }
        Some((current.get(key), start..end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    fn red() -> Attribute {
        Attribute::Foreground(Color::rgb(255, 0, 0))
    }

    #[test]
    fn test_len_counts_code_units() {
        let text = AttributedText::new("a😀é");
        assert_eq!(text.len(), 4);
        assert_eq!(text.text(), "a😀é");
    }

    #[test]
    fn test_text_in() {
        let text = AttributedText::new("a😀bc");
        assert_eq!(text.text_in(1..3).as_deref(), Some("😀"));
        assert_eq!(text.text_in(3..5).as_deref(), Some("bc"));
        assert_eq!(text.text_in(3..9), None);
    }

    #[test]
    fn test_replace_reports_post_edit_range() {
        let mut text = AttributedText::new("hello world");
        let edit = text.replace(6..11, "there!").unwrap();
        assert_eq!(text.text(), "hello there!");
        assert_eq!(edit.range, 6..12);
        assert_eq!(edit.change_in_length, 1);
        assert_eq!(edit.kind, EditKind::Characters);
        assert_eq!(text.revision(), 1);
    }

    #[test]
    fn test_replace_rejects_split_surrogate() {
        let mut text = AttributedText::new("a😀b");
        assert!(text.replace(2..3, "x").is_none());
        assert!(text.replace(0..9, "x").is_none());
        assert_eq!(text.revision(), 0);
    }

    #[test]
    fn test_inserted_text_inherits_previous_attributes() {
        let mut text = AttributedText::new("ab");
        text.add_attribute(0..1, red());
        text.insert(1, "xy").unwrap();
        assert_eq!(text.attributes_at(1), text.attributes_at(0));
        assert_eq!(text.attributes_at(2), text.attributes_at(0));
        assert_ne!(text.attributes_at(3), text.attributes_at(0));
    }

    #[test]
    fn test_attribute_effective_range() {
        let mut text = AttributedText::new("abcdef");
        text.add_attribute(1..4, red());
        let (value, range) = text.attribute(AttributeKey::Foreground, 2, 0..6).unwrap();
        assert_eq!(value, Some(red()));
        assert_eq!(range, 1..4);
        let (value, range) = text.attribute(AttributeKey::Foreground, 5, 0..6).unwrap();
        assert_eq!(value, None);
        assert_eq!(range, 4..6);
        let (_, range) = text.attribute(AttributeKey::Foreground, 2, 2..3).unwrap();
        assert_eq!(range, 2..3);
        assert!(text.attribute(AttributeKey::Foreground, 6, 0..9).is_none());
        assert!(text.attribute(AttributeKey::Foreground, 1, 2..6).is_none());
    }

    #[test]
    fn test_writes_are_clamped() {
        let mut text = AttributedText::new("abc");
        text.add_attribute(2..10, red());
        text.set_attributes(5..9, &Attributes::default());
        assert_eq!(text.runs().len(), 2);
    }

    #[test]
    fn test_batch_coalesces_attribute_notifications() {
        let mut text = AttributedText::new("abcdef");
        text.begin_editing();
        text.add_attribute(0..2, red());
        text.add_attribute(4..5, red());
        text.end_editing();
        let edits = text.take_edits();
        assert_eq!(
            edits,
            vec![TextEdit {
                kind: EditKind::Attributes,
                range: 0..5,
                change_in_length: 0,
            }]
        );
    }

    #[test]
    fn test_paragraph_range() {
        let text = AttributedText::new("one\ntwo\r\nthree");
        assert_eq!(text.paragraph_range(5..5), 4..9);
        assert_eq!(text.paragraph_range(0..0), 0..4);
        assert_eq!(text.paragraph_range(2..6), 0..9);
        assert_eq!(text.paragraph_range(10..11), 9..14);
        assert_eq!(text.paragraph_range(14..14), 9..14);
    }

    #[test]
    fn test_paragraph_range_after_trailing_newline() {
        let text = AttributedText::new("abc\n");
        assert_eq!(text.paragraph_range(4..4), 4..4);
        assert_eq!(text.paragraph_range(3..3), 0..4);
    }

    #[test]
    fn test_runs_coalesce() {
        let mut text = AttributedText::new("abcd");
        text.add_attribute(1..3, red());
        let runs = text.runs();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1].range, 1..3);
    }
}
