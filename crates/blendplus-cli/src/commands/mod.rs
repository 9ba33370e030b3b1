//! CLI command implementations

pub mod modes;
pub mod preset;
pub mod render;

use anyhow::{Context, Result};
use blendplus_core::Surface;
use std::path::Path;

/// Load image from path
pub fn load_image(path: &Path) -> Result<Surface> {
    blendplus_io::read(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save image to path
pub fn save_image(path: &Path, image: &Surface) -> Result<()> {
    blendplus_io::save(path, image).with_context(|| format!("Failed to save: {}", path.display()))
}
