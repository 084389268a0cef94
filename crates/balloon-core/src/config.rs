use crate::error::BalloonError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable thresholds of the extraction and placement pipeline.
///
/// Every section falls back to its defaults when omitted from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub assembly: AssemblyConfig,
    pub frames: FrameConfig,
    pub filter: FilterConfig,
    pub placement: PlacementConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Largest gap between a token's bottom edge and the next line's top edge
    /// for the two to be merged.
    pub merge_gap: f32,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        AssemblyConfig { merge_gap: 15.0 }
    }
}

/// Raster GD&T frame detection. Sizes are in image pixels, exclusive bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub enabled: bool,
    /// Gray level above which a pixel counts as background.
    pub threshold: u8,
    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,
    /// Polygon approximation tolerance as a fraction of the contour perimeter.
    pub epsilon_ratio: f64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        FrameConfig {
            enabled: true,
            threshold: 200,
            min_width: 20,
            max_width: 500,
            min_height: 10,
            max_height: 100,
            epsilon_ratio: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub min_cell_width: f32,
    pub max_cell_width: f32,
    pub min_cell_height: f32,
    pub max_cell_height: f32,
    /// Expansion applied before testing two cells for contact.
    pub touch_tolerance: f32,
    pub min_table_cells: usize,
    /// Fraction of the page height, measured from the bottom, treated as title-block band.
    pub bottom_fraction: f32,
    pub title_block_near_pad: f32,
    pub title_block_far_pad: f32,
    pub header_left_pad: f32,
    pub header_top_pad: f32,
    /// Width of the border band holding zone index labels.
    pub margin: f32,
    pub zone_label_max_chars: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            min_cell_width: 10.0,
            max_cell_width: 400.0,
            min_cell_height: 5.0,
            max_cell_height: 200.0,
            touch_tolerance: 1.0,
            min_table_cells: 3,
            bottom_fraction: 0.3,
            title_block_near_pad: 20.0,
            title_block_far_pad: 500.0,
            header_left_pad: 20.0,
            header_top_pad: 10.0,
            margin: 30.0,
            zone_label_max_chars: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub balloon_radius: f32,
    pub min_offset: f32,
    pub offset_step: f32,
    /// Offsets stay strictly below this value.
    pub max_offset: f32,
    /// Treat suppressed features as obstacles too.
    pub avoid_suppressed: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        PlacementConfig {
            balloon_radius: 8.0,
            min_offset: 15.0,
            offset_step: 15.0,
            max_offset: 100.0,
            avoid_suppressed: false,
        }
    }
}

impl PlacementConfig {
    /// Radial offsets tried for every feature, nearest first.
    ///
    /// A step that is not positive, or an unbounded range, yields `min_offset` alone.
    pub fn offsets(&self) -> Vec<f32> {
        if !(self.min_offset < self.max_offset) {
            return Vec::new();
        }
        if !(self.offset_step > 0.0 && self.max_offset.is_finite()) {
            return vec![self.min_offset];
        }
        let mut offsets = Vec::new();
        let mut i = 0u32;
        loop {
            let offset = self.min_offset + self.offset_step * i as f32;
            if !(offset < self.max_offset) {
                break;
            }
            offsets.push(offset);
            i += 1;
        }
        offsets
    }
}

/// Load a pipeline config from a JSON file.
pub fn load_config(path: &Path) -> Result<PipelineConfig, BalloonError> {
    let content = std::fs::read_to_string(path).map_err(|e| BalloonError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let config: PipelineConfig =
        serde_json::from_str(&content).map_err(|e| BalloonError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse a pipeline config from a JSON string (no file path context).
pub fn parse_config_str(json: &str) -> Result<PipelineConfig, BalloonError> {
    let config: PipelineConfig = serde_json::from_str(json)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate that a config is usable.
pub fn validate_config(config: &PipelineConfig) -> Result<(), BalloonError> {
    if !(config.assembly.merge_gap >= 0.0) {
        return Err(BalloonError::ConfigInvalid(
            "assembly.merge_gap must not be negative".into(),
        ));
    }

    let frames = &config.frames;
    if frames.min_width >= frames.max_width || frames.min_height >= frames.max_height {
        return Err(BalloonError::ConfigInvalid(
            "frames: min sizes must be below max sizes".into(),
        ));
    }
    if !(frames.epsilon_ratio > 0.0 && frames.epsilon_ratio < 1.0) {
        return Err(BalloonError::ConfigInvalid(format!(
            "frames.epsilon_ratio {} must lie in (0, 1)",
            frames.epsilon_ratio
        )));
    }

    let filter = &config.filter;
    if filter.min_cell_width >= filter.max_cell_width
        || filter.min_cell_height >= filter.max_cell_height
    {
        return Err(BalloonError::ConfigInvalid(
            "filter: min cell sizes must be below max cell sizes".into(),
        ));
    }
    if !(filter.bottom_fraction > 0.0 && filter.bottom_fraction < 1.0) {
        return Err(BalloonError::ConfigInvalid(format!(
            "filter.bottom_fraction {} must lie in (0, 1)",
            filter.bottom_fraction
        )));
    }
    if filter.min_table_cells == 0 {
        return Err(BalloonError::ConfigInvalid(
            "filter.min_table_cells must be at least 1".into(),
        ));
    }
    if !(filter.margin >= 0.0) {
        return Err(BalloonError::ConfigInvalid(
            "filter.margin must not be negative".into(),
        ));
    }

    let placement = &config.placement;
    if !(placement.balloon_radius > 0.0) {
        return Err(BalloonError::ConfigInvalid(
            "placement.balloon_radius must be positive".into(),
        ));
    }
    if !(placement.offset_step > 0.0) {
        return Err(BalloonError::ConfigInvalid(
            "placement.offset_step must be positive".into(),
        ));
    }
    if !(placement.min_offset >= 0.0
        && placement.min_offset < placement.max_offset
        && placement.max_offset.is_finite())
    {
        return Err(BalloonError::ConfigInvalid(format!(
            "placement offsets [{}, {}) are empty",
            placement.min_offset, placement.max_offset
        )));
    }

    Ok(())
}
