//! Logical font descriptors and metric resolution
//!
//! Style profiles name fonts abstractly (family, size, weight, slant). A
//! [`ResourceProvider`] turns a descriptor into concrete metrics; the host
//! renderer is responsible for picking the actual face.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Generic font family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    SansSerif,
    Serif,
    Monospace,
}

/// Font weight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// A logical font: what the styling pass asks for, not a loaded face
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontDescriptor {
    pub family: FontFamily,
    /// Point size
    pub size: f32,
    #[serde(default)]
    pub weight: FontWeight,
    #[serde(default)]
    pub italic: bool,
}

impl FontDescriptor {
    pub const fn new(family: FontFamily, size: f32) -> Self {
        Self {
            family,
            size,
            weight: FontWeight::Regular,
            italic: false,
        }
    }

    pub const fn bold(family: FontFamily, size: f32) -> Self {
        Self {
            family,
            size,
            weight: FontWeight::Bold,
            italic: false,
        }
    }

    /// Same face with the bold trait added
    pub fn with_bold(self) -> Self {
        Self {
            weight: FontWeight::Bold,
            ..self
        }
    }

    /// Same face with the italic trait added
    pub fn with_italic(self) -> Self {
        Self {
            italic: true,
            ..self
        }
    }

    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }
}

/// Vertical metrics of a resolved font, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub ascender: f32,
    /// Negative below the baseline
    pub descender: f32,
    pub leading: f32,
}

impl FontMetrics {
    /// Fixed line height used for min/max paragraph line height
    pub fn line_height(&self) -> f32 {
        self.ascender - self.descender + self.leading
    }
}

/// Resolves logical font descriptors into concrete metrics
pub trait ResourceProvider {
    fn font_metrics(&self, font: &FontDescriptor) -> FontMetrics;
}

/// Proportional estimate from the point size; needs no font files
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedMetrics;

impl ResourceProvider for EstimatedMetrics {
    fn font_metrics(&self, font: &FontDescriptor) -> FontMetrics {
        let (ascent, descent, gap) = match font.family {
            FontFamily::Monospace => (0.96, 0.24, 0.0),
            FontFamily::SansSerif | FontFamily::Serif => (0.95, 0.25, 0.0),
        };
        FontMetrics {
            ascender: font.size * ascent,
            descender: -font.size * descent,
            leading: font.size * gap,
        }
    }
}

/// Metrics read from real font files with fontdue
///
/// Families without a registered face fall back to [`EstimatedMetrics`].
#[derive(Default)]
pub struct FontdueMetrics {
    faces: HashMap<FontFamily, fontdue::Font>,
}

impl FontdueMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register font data (TTF/OTF bytes) for a family
    pub fn register(&mut self, family: FontFamily, data: &[u8]) -> anyhow::Result<()> {
        let font = fontdue::Font::from_bytes(data, fontdue::FontSettings::default())
            .map_err(|e| anyhow::anyhow!("Failed to load font for {:?}: {}", family, e))?;
        self.faces.insert(family, font);
        Ok(())
    }

    pub fn has_face(&self, family: FontFamily) -> bool {
        self.faces.contains_key(&family)
    }
}

impl ResourceProvider for FontdueMetrics {
    fn font_metrics(&self, font: &FontDescriptor) -> FontMetrics {
        let line_metrics = self
            .faces
            .get(&font.family)
            .and_then(|face| face.horizontal_line_metrics(font.size));
        match line_metrics {
            Some(m) => FontMetrics {
                ascender: m.ascent,
                descender: m.descent,
                leading: m.line_gap,
            },
            None => EstimatedMetrics.font_metrics(font),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_bold_preserves_family_and_size() {
        let mono = FontDescriptor::new(FontFamily::Monospace, 13.0);
        let bold = mono.with_bold();
        assert_eq!(bold.family, FontFamily::Monospace);
        assert_eq!(bold.size, 13.0);
        assert!(bold.is_bold());
        assert!(!bold.italic);
    }

    #[test]
    fn test_traits_compose() {
        let font = FontDescriptor::new(FontFamily::SansSerif, 14.0)
            .with_italic()
            .with_bold();
        assert!(font.is_bold());
        assert!(font.italic);
    }

    #[test]
    fn test_estimated_line_height_scales_with_size() {
        let small = EstimatedMetrics.font_metrics(&FontDescriptor::new(FontFamily::SansSerif, 14.0));
        let large = EstimatedMetrics.font_metrics(&FontDescriptor::bold(FontFamily::SansSerif, 24.0));
        assert!(small.line_height() > 14.0);
        assert!(large.line_height() > small.line_height());
    }

    #[test]
    fn test_fontdue_without_faces_falls_back() {
        let provider = FontdueMetrics::new();
        let font = FontDescriptor::new(FontFamily::Serif, 16.0);
        assert!(!provider.has_face(FontFamily::Serif));
        assert_eq!(
            provider.font_metrics(&font),
            EstimatedMetrics.font_metrics(&font)
        );
    }

    #[test]
    fn test_fontdue_rejects_garbage() {
        let mut provider = FontdueMetrics::new();
        assert!(provider.register(FontFamily::Serif, b"not a font").is_err());
    }
}
