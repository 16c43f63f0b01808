//! Versioned JSON presets for the pipeline configuration.
//!
//! Unknown keys are ignored, missing keys inherit defaults, and a version
//! mismatch is a warning rather than an error.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

use super::config::PipelineConfig;

pub const PRESET_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct PresetFile {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    stages: PipelineConfig,
}

fn default_version() -> u32 {
    PRESET_VERSION
}

fn preset_file(config: &PipelineConfig) -> PresetFile {
    PresetFile {
        version: PRESET_VERSION,
        stages: config.clone(),
    }
}

/// Serialize a configuration to the preset wire format, pretty-printed.
pub fn to_json(config: &PipelineConfig) -> Result<String> {
    Ok(serde_json::to_string_pretty(&preset_file(config))?)
}

/// Single-line form of the preset wire format, for piping.
pub fn to_json_compact(config: &PipelineConfig) -> Result<String> {
    Ok(serde_json::to_string(&preset_file(config))?)
}

/// Parse a preset, clamping every loaded value into its declared bounds.
pub fn from_json(text: &str) -> Result<PipelineConfig> {
    let file: PresetFile = serde_json::from_str(text)?;
    if file.version != PRESET_VERSION {
        warn!(
            found = file.version,
            expected = PRESET_VERSION,
            "preset version mismatch, loading with defaults for unknown fields"
        );
    }
    let mut config = file.stages;
    config.clamp_all();
    Ok(config)
}

/// Write a preset atomically: write to a sibling temp file, then rename.
pub fn save_preset(config: &PipelineConfig, path: &Path) -> Result<()> {
    let json = to_json(config)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Load a preset from disk.
pub fn load_preset(path: &Path) -> Result<PipelineConfig> {
    let text = fs::read_to_string(path)?;
    from_json(&text)
}
