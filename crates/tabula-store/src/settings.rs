//! User preferences for the table grid and search

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TabulaSettings {
    pub grid: GridSettings,
    pub search: SearchSettings,
}

impl TabulaSettings {
    /// Load from the user config directory, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        serde_json::from_str(&content).with_context(|| "Failed to parse settings JSON")
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory: {:?}", parent))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;
        tracing::debug!(path = ?path, "saved settings");
        Ok(())
    }

    pub fn settings_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not find config directory")?;
        Ok(config_dir.join("tabula").join("settings.json"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Width of columns without an explicit width
    pub default_column_width: f32,
    pub min_column_width: f32,
    pub max_column_width: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            default_column_width: 180.0,
            min_column_width: 60.0,
            max_column_width: 800.0,
        }
    }
}

impl GridSettings {
    /// Clamp a requested width into the configured bounds
    pub fn clamp_width(&self, width: f32) -> f32 {
        let (min, max) = if self.min_column_width <= self.max_column_width {
            (self.min_column_width, self.max_column_width)
        } else {
            (self.max_column_width, self.min_column_width)
        };
        if width.is_nan() {
            return self.default_column_width.clamp(min, max);
        }
        width.clamp(min, max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Queries shorter than this (after trimming) do not narrow the rows
    pub min_query_length: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { min_query_length: 1 }
    }
}
