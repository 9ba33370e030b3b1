//! Effect settings and the configuration phase.
//!
//! [`EffectSettings`] is what the user picks: overlay source, placement,
//! blend mode and the swap flag. [`configure`] turns it into the frozen
//! [`RenderConfig`] that every render call reads. It acquires and places
//! the overlay exactly once; failures there never abort the effect, they
//! leave the overlay absent so rendering copies the base.
//!
//! Settings load from YAML presets:
//!
//! ```yaml
//! source:
//!   file: overlays/paper.png
//! placement: fill
//! blend-mode: soft-light
//! swap-layers: false
//! ```

use std::path::{Path, PathBuf};

use blendplus_core::{Rect, Surface};
use blendplus_io::{ImageSource, SourceProvider};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::blend::BlendMode;
use crate::placement::{place, PlacementPolicy};
use crate::render::{Overlay, RenderConfig};
use crate::resize::Resampler;
use crate::{OpsError, OpsResult};

/// User-facing effect parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EffectSettings {
    /// Where the overlay comes from.
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub source: ImageSource,
    /// How the overlay is mapped into the selection.
    pub placement: PlacementPolicy,
    /// Per-pixel blend function.
    pub blend_mode: BlendMode,
    /// Blend the base onto the overlay instead.
    pub swap_layers: bool,
}

impl EffectSettings {
    /// Loads settings from a YAML preset file.
    pub fn from_file(path: impl AsRef<Path>) -> OpsResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OpsError::PresetNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let mut settings = Self::from_yaml_str(&content)?;

        // relative overlay paths are relative to the preset
        if let ImageSource::File(file) = &settings.source {
            if file.is_relative() && !file.as_os_str().is_empty() {
                let dir = path.parent().map(PathBuf::from).unwrap_or_default();
                settings.source = ImageSource::File(dir.join(file));
            }
        }
        Ok(settings)
    }

    /// Parses settings from YAML. Missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> OpsResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serializes settings as YAML.
    pub fn to_yaml(&self) -> OpsResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Builds the render configuration for one settings change.
///
/// The overlay is acquired from `provider` and placed on a `canvas`-sized
/// surface inside `selection`. Any acquisition or placement error is logged
/// and yields [`Overlay::Absent`].
pub fn configure(
    settings: &EffectSettings,
    canvas: (u32, u32),
    selection: Rect,
    provider: &dyn SourceProvider,
    resampler: &dyn Resampler,
) -> RenderConfig {
    let overlay = match build_overlay(settings, canvas, selection, provider, resampler) {
        Ok(surface) => Overlay::Placed(surface),
        Err(err) => {
            warn!(source = %settings.source, error = %err, "no overlay configured");
            Overlay::Absent
        }
    };

    debug!(
        mode = %settings.blend_mode,
        placement = %settings.placement,
        swap = settings.swap_layers,
        overlay = !overlay.is_absent(),
        "configured"
    );

    RenderConfig {
        blend_mode: settings.blend_mode,
        swap_layers: settings.swap_layers,
        placement: settings.placement,
        overlay,
    }
}

fn build_overlay(
    settings: &EffectSettings,
    canvas: (u32, u32),
    selection: Rect,
    provider: &dyn SourceProvider,
    resampler: &dyn Resampler,
) -> OpsResult<Surface> {
    let image = provider.acquire(&settings.source)?;
    place(&image, canvas, selection, settings.placement, resampler)
}
