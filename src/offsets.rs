//! UTF-8 byte offset → UTF-16 code-unit offset mapping
//!
//! The parser reports byte positions; the host buffer addresses UTF-16 code
//! units. [`OffsetTable`] is built once per text snapshot with a single
//! linear scan and answers conversions in O(1). It is never patched: when the
//! text changes, build a new table.

use std::ops::Range;

/// A 1-based line / 1-based byte column position, as parsers report them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Pre-computed byte → code-unit mapping for one text snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetTable {
    /// `byte_to_code_unit[i]` is the code-unit offset of the character that
    /// contains byte `i`. The final entry is the total code-unit length.
    byte_to_code_unit: Vec<usize>,
    /// Byte offset of each line's first byte; `line_starts[0]` is line 1
    line_starts: Vec<usize>,
}

impl OffsetTable {
    pub fn new(text: &str) -> Self {
        let mut byte_to_code_unit = vec![0; text.len() + 1];
        let mut line_starts = vec![0];
        let mut code_unit = 0;

        for (byte, ch) in text.char_indices() {
            // Continuation bytes share their lead byte's offset
            byte_to_code_unit[byte..byte + ch.len_utf8()].fill(code_unit);
            if ch == '\n' {
                line_starts.push(byte + 1);
            }
            // Supplementary-plane characters are a surrogate pair
            code_unit += ch.len_utf16();
        }
        byte_to_code_unit[text.len()] = code_unit;

        Self {
            byte_to_code_unit,
            line_starts,
        }
    }

    /// Length of the described text in bytes
    pub fn len_bytes(&self) -> usize {
        self.byte_to_code_unit.len() - 1
    }

    /// Length of the described text in code units
    pub fn len_code_units(&self) -> usize {
        self.byte_to_code_unit[self.len_bytes()]
    }

    /// Number of lines (a trailing newline starts an empty final line)
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset where the 0-based `line_index` starts
    pub fn line_start(&self, line_index: usize) -> Option<usize> {
        self.line_starts.get(line_index).copied()
    }

    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }

    /// Code-unit offset of an absolute byte offset (`len_bytes()` is valid)
    pub fn code_unit_offset_at(&self, byte: usize) -> Option<usize> {
        self.byte_to_code_unit.get(byte).copied()
    }

    /// Code-unit offset of a 1-based line/column location
    pub fn code_unit_offset(&self, location: SourceLocation) -> Option<usize> {
        self.byte_offset(location)
            .and_then(|byte| self.code_unit_offset_at(byte))
    }

    /// Absolute byte offset of a 1-based line/column location
    pub fn byte_offset(&self, location: SourceLocation) -> Option<usize> {
        if location.line == 0 || location.column == 0 {
            return None;
        }
        let line_start = self.line_start(location.line - 1)?;
        let byte = line_start.checked_add(location.column - 1)?;
        (byte <= self.len_bytes()).then_some(byte)
    }

    /// Convert a byte range into a code-unit range that fits in `max_length`
    pub fn code_unit_range(&self, bytes: Range<usize>, max_length: usize) -> Option<Range<usize>> {
        let start = self.code_unit_offset_at(bytes.start)?;
        let end = self.code_unit_offset_at(bytes.end)?;
        Self::checked_range(start, end, max_length)
    }

    /// Convert a line/column range into a code-unit range that fits in `max_length`
    pub fn code_unit_range_for_locations(
        &self,
        start: SourceLocation,
        end: SourceLocation,
        max_length: usize,
    ) -> Option<Range<usize>> {
        let start = self.code_unit_offset(start)?;
        let end = self.code_unit_offset(end)?;
        Self::checked_range(start, end, max_length)
    }

    /// Code-unit range of the 0-based lines `from_line..to_line`
    pub fn line_window(&self, from_line: usize, to_line: usize) -> Option<Range<usize>> {
        let start_byte = self.line_start(from_line)?;
        let end_byte = self.line_start(to_line).unwrap_or(self.len_bytes());
        let start = self.code_unit_offset_at(start_byte)?;
        let end = self.code_unit_offset_at(end_byte)?;
        (start <= end).then_some(start..end)
    }

    fn checked_range(start: usize, end: usize, max_length: usize) -> Option<Range<usize>> {
        (start <= end && end <= max_length).then_some(start..end)
    }
}
