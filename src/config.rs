//! Engine configuration persistence
//!
//! Stores settings in `~/.config/markstyle/config.yaml`

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Engine configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Selected style profile id (e.g., "default", "compact")
    #[serde(default = "default_style")]
    pub style: String,

    #[serde(default)]
    pub scheduling: SchedulingConfig,
}

fn default_style() -> String {
    "default".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            style: default_style(),
            scheduling: SchedulingConfig::default(),
        }
    }
}

/// Tuning constants for the update coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Documents at least this long (in code units) load in chunks
    pub chunk_threshold: usize,
    pub lines_per_chunk: usize,
    /// Pause between chunks
    pub chunk_yield_ms: u64,
    /// Idle time after the last edit before a full pass
    pub debounce_ms: u64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            chunk_threshold: 50_000,
            lines_per_chunk: 500,
            chunk_yield_ms: 10,
            debounce_ms: 500,
        }
    }
}

impl SchedulingConfig {
    pub fn chunk_yield(&self) -> Duration {
        Duration::from_millis(self.chunk_yield_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl EngineConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("{:#}", e);
                Self::default()
            }
        }
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = crate::config_paths::config_file().context("No config directory available")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}
