use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils::LayoutResult;

use super::layout::Orientation;

pub const NODE_WIDTH: f32 = 180.0;
pub const NODE_HEIGHT: f32 = 80.0;
/// Avstånd i sidled mellan makar och syskon, vertikalt träd
pub const HORIZONTAL_GAP: f32 = 40.0;
/// Avstånd i höjdled mellan makar och syskon, horisontellt träd
pub const VERTICAL_GAP: f32 = 30.0;
/// Extra avstånd mellan generationsrader, vertikalt träd
pub const VERTICAL_SPACING: f32 = 100.0;
/// Extra avstånd mellan generationskolumner, horisontellt träd
pub const HORIZONTAL_SPACING: f32 = 120.0;
pub const MARRIAGE_NODE_SIZE: f32 = 24.0;

/// Geometri för layoutmotorn. Saknade nycklar i TOML-filen ger standardvärden.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    pub horizontal_gap: f32,
    pub vertical_gap: f32,
    pub vertical_spacing: f32,
    pub horizontal_spacing: f32,
    pub marriage_node_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: NODE_WIDTH,
            node_height: NODE_HEIGHT,
            horizontal_gap: HORIZONTAL_GAP,
            vertical_gap: VERTICAL_GAP,
            vertical_spacing: VERTICAL_SPACING,
            horizontal_spacing: HORIZONTAL_SPACING,
            marriage_node_size: MARRIAGE_NODE_SIZE,
        }
    }
}

impl LayoutConfig {
    /// Nodens storlek längs syskonaxeln (bredd vertikalt, höjd horisontellt)
    pub fn lateral_size(&self, orientation: Orientation) -> f32 {
        match orientation {
            Orientation::Vertical => self.node_width,
            Orientation::Horizontal => self.node_height,
        }
    }

    /// Mellanrum mellan makar och mellan syskonträd
    pub fn lateral_gap(&self, orientation: Orientation) -> f32 {
        match orientation {
            Orientation::Vertical => self.horizontal_gap,
            Orientation::Horizontal => self.vertical_gap,
        }
    }

    /// Steget från en generation till nästa längs generationsaxeln
    pub fn generation_step(&self, orientation: Orientation) -> f32 {
        match orientation {
            Orientation::Vertical => self.node_height + self.vertical_spacing,
            Orientation::Horizontal => self.node_width + self.horizontal_spacing,
        }
    }

    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("se", "genlib", "Genlib")
            .map(|dirs| dirs.config_dir().join("layout.toml"))
            .unwrap_or_else(|| PathBuf::from("layout.toml"))
    }

    /// Ladda från standardsökvägen, annars standardvärden
    pub fn load() -> Self {
        let path = Self::default_path();
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("Använder standardlayout ({:?}): {}", path, e);
                Self::default()
            }
        }
    }

    pub fn from_toml_str(content: &str) -> LayoutResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Kunde inte läsa layoutkonfiguration {:?}", path))?;
        Self::from_toml_str(&content).context("Ogiltig layoutkonfiguration")
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
