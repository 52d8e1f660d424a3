//! Attribute model shared by the walker and the host buffer

use std::ops::Range;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::style::{Color, FontDescriptor};

/// Paragraph layout attributes, in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParagraphStyle {
    pub head_indent: f32,
    pub first_line_head_indent: f32,
    pub min_line_height: f32,
    pub max_line_height: f32,
    pub paragraph_spacing: f32,
}

impl ParagraphStyle {
    pub fn with_indents(self, head_indent: f32, first_line_head_indent: f32) -> Self {
        Self {
            head_indent,
            first_line_head_indent,
            ..self
        }
    }

    pub fn with_line_height(self, line_height: f32) -> Self {
        Self {
            min_line_height: line_height,
            max_line_height: line_height,
            ..self
        }
    }

    pub fn with_spacing(self, paragraph_spacing: f32) -> Self {
        Self {
            paragraph_spacing,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnderlineStyle {
    Single,
}

/// A validated, absolute link destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget(Arc<str>);

impl LinkTarget {
    /// Returns `None` unless `destination` parses as an absolute URL
    pub fn parse(destination: &str) -> Option<Self> {
        let url = url::Url::parse(destination.trim()).ok()?;
        Some(Self(Arc::from(url.as_str())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Serialize for LinkTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKey {
    Font,
    Foreground,
    Background,
    Paragraph,
    Underline,
    Link,
}

/// A single keyed attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Font(FontDescriptor),
    Foreground(Color),
    Background(Color),
    Paragraph(ParagraphStyle),
    Underline(UnderlineStyle),
    Link(LinkTarget),
}

impl Attribute {
    pub fn key(&self) -> AttributeKey {
        match self {
            Attribute::Font(_) => AttributeKey::Font,
            Attribute::Foreground(_) => AttributeKey::Foreground,
            Attribute::Background(_) => AttributeKey::Background,
            Attribute::Paragraph(_) => AttributeKey::Paragraph,
            Attribute::Underline(_) => AttributeKey::Underline,
            Attribute::Link(_) => AttributeKey::Link,
        }
    }
}

/// The full attribute set at one position
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<FontDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph: Option<ParagraphStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<UnderlineStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<LinkTarget>,
}

impl Attributes {
    pub fn get(&self, key: AttributeKey) -> Option<Attribute> {
        match key {
            AttributeKey::Font => self.font.map(Attribute::Font),
            AttributeKey::Foreground => self.foreground.map(Attribute::Foreground),
            AttributeKey::Background => self.background.map(Attribute::Background),
            AttributeKey::Paragraph => self.paragraph.map(Attribute::Paragraph),
            AttributeKey::Underline => self.underline.map(Attribute::Underline),
            AttributeKey::Link => self.link.clone().map(Attribute::Link),
        }
    }

    /// Whether `key` holds the same value in both sets, without cloning
    pub fn same_value(&self, other: &Attributes, key: AttributeKey) -> bool {
        match key {
            AttributeKey::Font => self.font == other.font,
            AttributeKey::Foreground => self.foreground == other.foreground,
            AttributeKey::Background => self.background == other.background,
            AttributeKey::Paragraph => self.paragraph == other.paragraph,
            AttributeKey::Underline => self.underline == other.underline,
            AttributeKey::Link => self.link == other.link,
        }
    }

    pub fn set(&mut self, attr: Attribute) {
        match attr {
            Attribute::Font(font) => self.font = Some(font),
            Attribute::Foreground(color) => self.foreground = Some(color),
            Attribute::Background(color) => self.background = Some(color),
            Attribute::Paragraph(style) => self.paragraph = Some(style),
            Attribute::Underline(style) => self.underline = Some(style),
            Attribute::Link(target) => self.link = Some(target),
        }
    }
}

/// A code-unit range and the attributes that cover it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledSpan {
    pub range: Range<usize>,
    pub attributes: Attributes,
}

/// Intersection of two half-open ranges, `None` when empty
pub fn intersect(a: &Range<usize>, b: &Range<usize>) -> Option<Range<usize>> {
    let start = a.start.max(b.start);
    let end = a.end.min(b.end);
    (start < end).then_some(start..end)
}
