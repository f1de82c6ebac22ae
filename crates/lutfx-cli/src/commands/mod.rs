//! CLI command implementations

pub mod colorspaces;
pub mod import;
pub mod info;
pub mod resample;
pub mod verify;

use anyhow::{Context, Result};
use lutfx_lut::{cube, CubeFile, Lut3D};
use lutfx_ocio::ColorConfig;
use std::path::Path;

/// Parse a .cube file without validating completeness
pub fn read_cube(path: &Path) -> Result<CubeFile> {
    cube::read(path).with_context(|| format!("Failed to read: {}", path.display()))
}

/// Load a complete LUT
pub fn load_lut(path: &Path) -> Result<Lut3D> {
    read_cube(path)?
        .into_lut()
        .with_context(|| format!("Invalid LUT: {}", path.display()))
}

/// Resolve the LUT color space, checking it against the config
pub fn lut_space(config: &ColorConfig, requested: Option<&str>) -> Result<String> {
    match requested {
        Some(name) if !config.contains(name) => {
            anyhow::bail!(
                "Unknown color space '{}' (see `lutfx colorspaces`)",
                name
            )
        }
        Some(name) => Ok(name.to_string()),
        None => Ok(config.scene_linear().to_string()),
    }
}

/// File stem used to name outputs
pub fn stem(path: &Path) -> &str {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("lut")
}
