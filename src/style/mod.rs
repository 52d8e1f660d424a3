//! Style configuration
//!
//! [`StyleConfiguration`] is the immutable description of every visual
//! attribute the walker applies. It is built once from a [`StyleProfile`]
//! with font metrics resolved through a [`ResourceProvider`], then shared by
//! reference (usually `Arc`) across every open document.

mod color;
mod font;
mod profile;

use std::collections::BTreeMap;

pub use color::Color;
pub use font::{
    EstimatedMetrics, FontDescriptor, FontFamily, FontMetrics, FontWeight, FontdueMetrics,
    ResourceProvider,
};
pub use profile::{
    from_file as profile_from_file, list_profiles, load_profile, BuiltinProfile, ProfileInfo,
    ProfileSource, StyleProfile, BUILTIN_PROFILES,
};

use crate::attributes::{Attributes, ParagraphStyle};

/// Resolved, immutable styling parameters
#[derive(Debug, Clone, PartialEq)]
pub struct StyleConfiguration {
    profile: StyleProfile,
    body_line_height: f32,
    heading_line_heights: BTreeMap<u8, f32>,
}

impl Default for StyleConfiguration {
    fn default() -> Self {
        Self::new(StyleProfile::default(), &EstimatedMetrics)
    }
}

impl StyleConfiguration {
    pub fn new(profile: StyleProfile, resources: &dyn ResourceProvider) -> Self {
        let body_line_height = resources.font_metrics(&profile.body_font).line_height();
        let heading_line_heights = profile
            .heading_fonts
            .iter()
            .map(|(level, font)| (*level, resources.font_metrics(font).line_height()))
            .collect();
        Self {
            profile,
            body_line_height,
            heading_line_heights,
        }
    }

    pub fn profile(&self) -> &StyleProfile {
        &self.profile
    }

    pub fn body_font(&self) -> FontDescriptor {
        self.profile.body_font
    }

    pub fn mono_font(&self) -> FontDescriptor {
        self.profile.mono_font
    }

    /// Configured font for a heading level, body font for unconfigured levels
    pub fn heading_font(&self, level: u8) -> FontDescriptor {
        self.profile
            .heading_fonts
            .get(&level)
            .copied()
            .unwrap_or(self.profile.body_font)
    }

    /// Line height matching [`Self::heading_font`]
    pub fn heading_line_height(&self, level: u8) -> f32 {
        self.heading_line_heights
            .get(&level)
            .copied()
            .unwrap_or(self.body_line_height)
    }

    pub fn body_line_height(&self) -> f32 {
        self.body_line_height
    }

    pub fn text_color(&self) -> Color {
        self.profile.text_color
    }

    pub fn syntax_color(&self) -> Color {
        self.profile.syntax_color
    }

    pub fn heading_color(&self) -> Color {
        self.profile.heading_color
    }

    pub fn link_color(&self) -> Color {
        self.profile.link_color
    }

    pub fn code_background_color(&self) -> Color {
        self.profile.code_background_color
    }

    pub fn blockquote_bar_color(&self) -> Color {
        self.profile.blockquote_bar_color
    }

    pub fn paragraph_spacing(&self) -> f32 {
        self.profile.paragraph_spacing
    }

    pub fn list_indent(&self) -> f32 {
        self.profile.list_indent
    }

    /// Paragraph style applied to all text, including empty lines.
    ///
    /// Uses a fixed line height so attribute changes never cause layout jitter.
    pub fn default_paragraph_style(&self) -> ParagraphStyle {
        ParagraphStyle {
            head_indent: 0.0,
            first_line_head_indent: 0.0,
            min_line_height: self.body_line_height,
            max_line_height: self.body_line_height,
            paragraph_spacing: self.profile.paragraph_spacing,
        }
    }

    /// Baseline attributes applied before any construct-specific overlay
    pub fn default_attributes(&self) -> Attributes {
        Attributes {
            font: Some(self.profile.body_font),
            foreground: Some(self.profile.text_color),
            paragraph: Some(self.default_paragraph_style()),
            ..Attributes::default()
        }
    }
}
