//! YAML style profiles
//!
//! Provides compile-time embedded profiles and user-defined profiles from
//! the config directory.
//!
//! Profile loading priority:
//! 1. User config: `~/.config/markstyle/styles/{id}.yaml`
//! 2. Embedded: Built-in profiles compiled into binary

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{anyhow, Context};
use serde::Deserialize;

use super::color::Color;
use super::font::{FontDescriptor, FontFamily};

// Embed profile YAML files at compile time
pub const DEFAULT_YAML: &str = include_str!("../../styles/default.yaml");
pub const COMPACT_YAML: &str = include_str!("../../styles/compact.yaml");

/// A built-in profile entry
pub struct BuiltinProfile {
    /// Stable identifier for config (e.g. "default", "compact")
    pub id: &'static str,
    /// Embedded YAML content
    pub yaml: &'static str,
}

/// Registry of all built-in profiles
pub const BUILTIN_PROFILES: &[BuiltinProfile] = &[
    BuiltinProfile {
        id: "default",
        yaml: DEFAULT_YAML,
    },
    BuiltinProfile {
        id: "compact",
        yaml: COMPACT_YAML,
    },
];

/// Where the profile came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSource {
    /// User-defined profile in ~/.config/markstyle/styles/
    User,
    /// Built-in profile embedded in binary
    Builtin,
}

/// Information about an available profile
#[derive(Debug, Clone)]
pub struct ProfileInfo {
    pub id: String,
    pub name: String,
    pub source: ProfileSource,
}

/// Raw profile data as parsed from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct StyleProfileData {
    pub version: u32,
    pub name: String,
    pub fonts: FontsData,
    pub colors: ColorsData,
    #[serde(default)]
    pub spacing: SpacingData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FontsData {
    pub body: FontDescriptor,
    pub mono: FontDescriptor,
    #[serde(default)]
    pub headings: BTreeMap<u8, FontDescriptor>,
}

/// Construct colors (raw strings from YAML)
#[derive(Debug, Clone, Deserialize)]
pub struct ColorsData {
    pub text: String,
    pub syntax: String,
    pub heading: String,
    pub link: String,
    pub code_background: String,
    pub blockquote_bar: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpacingData {
    #[serde(default = "default_paragraph_spacing")]
    pub paragraph: f32,
    #[serde(default = "default_list_indent")]
    pub list_indent: f32,
}

fn default_paragraph_spacing() -> f32 {
    12.0
}

fn default_list_indent() -> f32 {
    24.0
}

impl Default for SpacingData {
    fn default() -> Self {
        Self {
            paragraph: default_paragraph_spacing(),
            list_indent: default_list_indent(),
        }
    }
}

/// Resolved profile with parsed colors
#[derive(Debug, Clone, PartialEq)]
pub struct StyleProfile {
    pub name: String,
    pub heading_fonts: BTreeMap<u8, FontDescriptor>,
    pub body_font: FontDescriptor,
    pub mono_font: FontDescriptor,
    pub text_color: Color,
    pub syntax_color: Color,
    pub heading_color: Color,
    pub link_color: Color,
    pub code_background_color: Color,
    pub blockquote_bar_color: Color,
    pub paragraph_spacing: f32,
    pub list_indent: f32,
}

impl Default for StyleProfile {
    fn default() -> Self {
        let heading_fonts = BTreeMap::from([
            (1, FontDescriptor::bold(FontFamily::SansSerif, 24.0)),
            (2, FontDescriptor::bold(FontFamily::SansSerif, 20.0)),
            (3, FontDescriptor::bold(FontFamily::SansSerif, 17.0)),
        ]);
        Self {
            name: "Default".to_string(),
            heading_fonts,
            body_font: FontDescriptor::new(FontFamily::SansSerif, 14.0),
            mono_font: FontDescriptor::new(FontFamily::Monospace, 13.0),
            text_color: Color::rgb(0x1d, 0x1d, 0x1f),
            syntax_color: Color::rgba(0x3c, 0x3c, 0x43, 0x4c),
            heading_color: Color::rgb(0x1d, 0x1d, 0x1f),
            link_color: Color::rgb(0x0a, 0x66, 0xd8),
            code_background_color: Color::rgba(0x3c, 0x3c, 0x43, 0x1a),
            blockquote_bar_color: Color::rgb(0x00, 0x7a, 0xff),
            paragraph_spacing: 12.0,
            list_indent: 24.0,
        }
    }
}

impl StyleProfile {
    /// Parse and resolve a profile from YAML
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let data: StyleProfileData =
            serde_yaml::from_str(yaml).context("Failed to parse style profile YAML")?;
        Self::from_data(data)
    }

    /// Resolve raw profile data, parsing every color
    pub fn from_data(data: StyleProfileData) -> anyhow::Result<Self> {
        let parse = |field: &str, value: &str| {
            Color::from_hex(value).map_err(|e| anyhow!("colors.{}: {}", field, e))
        };
        let colors = &data.colors;
        Ok(Self {
            name: data.name,
            heading_fonts: data.fonts.headings,
            body_font: data.fonts.body,
            mono_font: data.fonts.mono,
            text_color: parse("text", &colors.text)?,
            syntax_color: parse("syntax", &colors.syntax)?,
            heading_color: parse("heading", &colors.heading)?,
            link_color: parse("link", &colors.link)?,
            code_background_color: parse("code_background", &colors.code_background)?,
            blockquote_bar_color: parse("blockquote_bar", &colors.blockquote_bar)?,
            paragraph_spacing: data.spacing.paragraph,
            list_indent: data.spacing.list_indent,
        })
    }

    /// Load a built-in profile by id
    pub fn from_builtin(id: &str) -> anyhow::Result<Self> {
        let builtin = BUILTIN_PROFILES
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| anyhow!("Unknown style profile: {}", id))?;
        Self::from_yaml(builtin.yaml)
    }
}

/// Load a profile from a YAML file
pub fn from_file(path: &Path) -> anyhow::Result<StyleProfile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read style profile {}", path.display()))?;
    StyleProfile::from_yaml(&content).with_context(|| format!("In {}", path.display()))
}

/// Load profile by id with priority: user → builtin
pub fn load_profile(id: &str) -> anyhow::Result<StyleProfile> {
    if let Some(user_dir) = crate::config_paths::styles_dir() {
        let user_path = user_dir.join(format!("{}.yaml", id));
        if user_path.exists() {
            tracing::info!("Loading user style profile from {}", user_path.display());
            return from_file(&user_path);
        }
    }

    tracing::info!("Loading builtin style profile: {}", id);
    StyleProfile::from_builtin(id)
}

/// List all available profiles; user profiles shadow builtins with the same id
pub fn list_profiles() -> Vec<ProfileInfo> {
    let mut profiles = Vec::new();
    let mut seen_ids = HashSet::new();

    if let Some(user_dir) = crate::config_paths::styles_dir() {
        if let Ok(entries) = std::fs::read_dir(&user_dir) {
            for entry in entries.filter_map(|e| e.ok()) {
                let path = entry.path();
                if !path
                    .extension()
                    .is_some_and(|ext| ext == "yaml" || ext == "yml")
                {
                    continue;
                }
                let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                if seen_ids.insert(id.to_string()) {
                    let name = from_file(&path)
                        .map(|p| p.name)
                        .unwrap_or_else(|_| id.to_string());
                    profiles.push(ProfileInfo {
                        id: id.to_string(),
                        name,
                        source: ProfileSource::User,
                    });
                }
            }
        }
    }

    for builtin in BUILTIN_PROFILES {
        if seen_ids.insert(builtin.id.to_string()) {
            let name = StyleProfile::from_yaml(builtin.yaml)
                .map(|p| p.name)
                .unwrap_or_else(|_| builtin.id.to_string());
            profiles.push(ProfileInfo {
                id: builtin.id.to_string(),
                name,
                source: ProfileSource::Builtin,
            });
        }
    }

    profiles
}
