//! Styling scenarios for each markdown construct

mod common;

use markstyle::attributes::{StyledSpan, UnderlineStyle};
use markstyle::markdown::detect_marker_length;
use markstyle::storage::{AttributedText, TextStorage};

fn attrs_at(storage: &AttributedText, at: usize) -> &markstyle::Attributes {
    storage.attributes_at(at).unwrap()
}

fn span_covering(storage: &AttributedText, at: usize) -> StyledSpan {
    storage
        .runs()
        .into_iter()
        .find(|run| run.range.contains(&at))
        .unwrap()
}

// ========================================================================
// Headings
// ========================================================================

#[test]
fn test_title_scenario() {
    let style = common::style();
    let storage = common::render("# Title");
    for i in 0..7 {
        assert_eq!(attrs_at(&storage, i).font, Some(style.heading_font(1)));
    }
    for i in 0..2 {
        assert_eq!(attrs_at(&storage, i).foreground, Some(style.syntax_color()));
    }
    assert_eq!(span_covering(&storage, 3).range, 2..7);
}

#[test]
fn test_heading_fonts_per_level() {
    let style = common::style();
    let storage = common::render("# a\n## b\n### c\n#### d\n##### e\n###### f\n");
    let text = storage.text_in(0..storage.len()).unwrap();
    for (level, letter) in ["a", "b", "c", "d", "e", "f"].iter().enumerate() {
        let at = text.find(letter).unwrap();
        let font = attrs_at(&storage, at).font.unwrap();
        if level < 3 {
            assert_eq!(font, style.heading_font(level as u8 + 1));
            assert_ne!(font, style.body_font());
        } else {
            assert_eq!(font, style.body_font());
        }
    }
}

// ========================================================================
// Inline constructs
// ========================================================================

#[test]
fn test_bold_scenario() {
    let style = common::style();
    let storage = common::render("**bold**");
    assert_eq!(span_covering(&storage, 3).range, 2..6);
    assert!(attrs_at(&storage, 3).font.unwrap().is_bold());
    for i in [0, 1, 6, 7] {
        assert_eq!(attrs_at(&storage, i).foreground, Some(style.syntax_color()));
        assert!(!attrs_at(&storage, i).font.unwrap().is_bold());
    }
}

#[test]
fn test_underscore_strong_and_emphasis() {
    let style = common::style();
    let storage = common::render("__b__ _i_");
    assert!(attrs_at(&storage, 2).font.unwrap().is_bold());
    assert!(attrs_at(&storage, 7).font.unwrap().italic);
    assert_eq!(attrs_at(&storage, 6).foreground, Some(style.syntax_color()));
}

#[test]
fn test_bold_inside_heading_keeps_heading_size() {
    let style = common::style();
    let storage = common::render("## a **b**");
    let font = attrs_at(&storage, 7).font.unwrap();
    assert!(font.is_bold());
    assert_eq!(font.size, style.heading_font(2).size);
}

#[test]
fn test_code_span_background_only_inside() {
    let style = common::style();
    let storage = common::render("`x`");
    assert_eq!(attrs_at(&storage, 0).background, None);
    assert_eq!(attrs_at(&storage, 1).background, Some(style.code_background_color()));
    assert_eq!(attrs_at(&storage, 2).background, None);
    assert_eq!(attrs_at(&storage, 2).font, Some(style.mono_font()));
}

#[test]
fn test_link_with_multibyte_label() {
    let style = common::style();
    // 😀 is two code units, so ']' sits at 3
    let storage = common::render("[😀](https://x.y)");
    assert_eq!(attrs_at(&storage, 1).foreground, Some(style.link_color()));
    assert_eq!(attrs_at(&storage, 2).underline, Some(UnderlineStyle::Single));
    assert_eq!(attrs_at(&storage, 3).foreground, Some(style.syntax_color()));
    assert_eq!(attrs_at(&storage, 3).underline, None);
}

// ========================================================================
// Lists and quotes
// ========================================================================

#[test]
fn test_marker_lengths() {
    assert_eq!(detect_marker_length("- [ ] task"), 6);
    assert_eq!(detect_marker_length("1. first"), 3);
    assert_eq!(detect_marker_length("* star"), 2);
}

#[test]
fn test_checkbox_marker_colored() {
    let style = common::style();
    let storage = common::render("- [ ] task");
    for i in 0..6 {
        assert_eq!(attrs_at(&storage, i).foreground, Some(style.syntax_color()), "at {}", i);
    }
    assert_eq!(attrs_at(&storage, 6).foreground, Some(style.text_color()));
}

#[test]
fn test_nested_indentation() {
    let text = "- outer\n    - inner";
    let storage = common::render(text);
    let outer = attrs_at(&storage, text.find("outer").unwrap()).paragraph.unwrap();
    let inner = attrs_at(&storage, text.find("inner").unwrap()).paragraph.unwrap();
    assert!(inner.head_indent > outer.head_indent);
}

#[test]
fn test_list_item_spacing_is_reduced() {
    let style = common::style();
    let storage = common::render("- a\n- b");
    let para = attrs_at(&storage, 2).paragraph.unwrap();
    assert_eq!(para.paragraph_spacing, style.paragraph_spacing() / 3.0);
}

#[test]
fn test_loose_list_paragraph_aligns_under_text() {
    let style = common::style();
    let storage = common::render("- a\n\n- b\n");
    let para = attrs_at(&storage, 2).paragraph.unwrap();
    assert_eq!(para.head_indent, style.list_indent());
    assert_eq!(para.first_line_head_indent, 0.0);
}

#[test]
fn test_nested_blockquote_markers() {
    let style = common::style();
    let storage = common::render("> > deep");
    for i in 0..4 {
        assert_eq!(attrs_at(&storage, i).foreground, Some(style.syntax_color()));
    }
    assert_eq!(attrs_at(&storage, 4).foreground, Some(style.blockquote_bar_color()));
    let para = attrs_at(&storage, 5).paragraph.unwrap();
    assert_eq!(para.head_indent, style.list_indent() * 2.0);
}

#[test]
fn test_blockquote_spacing_is_halved() {
    let style = common::style();
    let storage = common::render("> a\n> b");
    // the leading marker lies outside the inner paragraph
    let para = attrs_at(&storage, 0).paragraph.unwrap();
    assert_eq!(para.paragraph_spacing, style.paragraph_spacing() / 2.0);
    assert_eq!(para.head_indent, style.list_indent());
    assert_eq!(para.first_line_head_indent, 0.0);
}

// ========================================================================
// Unstyled content
// ========================================================================

#[test]
fn test_fenced_code_keeps_defaults() {
    let style = common::style();
    let text = "```\n**x**\n```";
    let storage = common::render(text);
    assert_eq!(attrs_at(&storage, 6), &style.default_attributes());
}

#[test]
fn test_garbage_input_never_panics() {
    for text in ["[", "**", "`", "> ", "- ", "#", "[a](", "\u{0}\u{FFFF}", "😀**😀"] {
        let storage = common::render(text);
        assert_eq!(storage.text_in(0..storage.len()).unwrap(), text);
    }
}
