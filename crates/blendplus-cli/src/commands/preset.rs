//! Preset command

use crate::PresetArgs;
use anyhow::{Context, Result};
use blendplus_ops::EffectSettings;
use tracing::debug;

pub fn run(args: PresetArgs) -> Result<()> {
    let settings = EffectSettings::from_file(&args.preset)
        .with_context(|| format!("Invalid preset: {}", args.preset.display()))?;
    debug!(?settings, "preset loaded");

    print!("{}", settings.to_yaml()?);
    Ok(())
}
