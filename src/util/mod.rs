//! Utility modules

pub mod text;

pub use text::{contains_paragraph_break, is_paragraph_separator, utf16_len};
