//! Text measurement helpers for UTF-16 addressed buffers

/// Number of UTF-16 code units needed to encode `text`
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Characters that end a paragraph in the host buffer
pub fn is_paragraph_separator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2029}')
}

/// Check if inserted text starts a new paragraph
pub fn contains_paragraph_break(text: &str) -> bool {
    text.chars().any(is_paragraph_separator)
}
