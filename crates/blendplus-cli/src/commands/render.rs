//! Render command

use crate::RenderArgs;
use anyhow::{bail, Context, Result};
use blendplus_core::Surface;
use blendplus_io::{Format, ImageProvider, ImageSource, MemoryClipboard};
use blendplus_ops::parallel::render_tiles;
use blendplus_ops::{configure, EffectSettings, FilterResampler, NeverCancel, RenderStatus};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Preset (if any) with command-line overrides applied.
fn settings(args: &RenderArgs) -> Result<EffectSettings> {
    let mut settings = match &args.preset {
        Some(path) => EffectSettings::from_file(path)
            .with_context(|| format!("Invalid preset: {}", path.display()))?,
        None => EffectSettings::default(),
    };
    if let Some(path) = &args.overlay {
        settings.source = ImageSource::File(path.clone());
    }
    if args.clipboard_file.is_some() {
        settings.source = ImageSource::Clipboard;
    }
    if let Some(mode) = args.mode {
        settings.blend_mode = mode;
    }
    if let Some(placement) = args.placement {
        settings.placement = placement;
    }
    if args.swap {
        settings.swap_layers = true;
    }
    Ok(settings)
}

/// Loads `--clipboard-file` into an in-memory clipboard. PNG data is kept
/// encoded so it goes through the same path as a real clipboard PNG.
fn clipboard(args: &RenderArgs) -> Result<Option<Arc<MemoryClipboard>>> {
    let Some(path) = &args.clipboard_file else {
        return Ok(None);
    };
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read: {}", path.display()))?;
    let clipboard = MemoryClipboard::new();
    if Format::from_bytes(&data) == Format::Png {
        clipboard.set_png(data);
    } else {
        let bitmap = blendplus_io::decode(&data)
            .with_context(|| format!("Failed to decode: {}", path.display()))?;
        clipboard.set_bitmap(bitmap);
    }
    Ok(Some(Arc::new(clipboard)))
}

pub fn run(args: RenderArgs, verbose: u8) -> Result<()> {
    let base = super::load_image(&args.base)?;
    if base.is_empty() {
        bail!("Base image is empty: {}", args.base.display());
    }

    let settings = settings(&args)?;
    let mut provider = ImageProvider::new();
    if let Some(clipboard) = clipboard(&args)? {
        provider = provider.with_clipboard(clipboard);
    }

    let selection = match args.selection {
        Some(sel) => sel
            .intersect(&base.bounds())
            .with_context(|| format!("Selection {sel} lies outside the image"))?,
        None => base.bounds(),
    };

    if verbose > 0 {
        println!(
            "Blending {} onto {} with mode '{}' ({}{})",
            settings.source,
            args.base.display(),
            settings.blend_mode,
            settings.placement,
            if settings.swap_layers { ", swapped" } else { "" }
        );
    }

    let config = configure(
        &settings,
        base.dimensions(),
        selection,
        &provider,
        &FilterResampler::new(args.filter),
    );
    if config.overlay.is_absent() {
        warn!("no overlay available, output equals the base image");
    }

    // pixels outside the selection keep the base
    let mut output: Surface = base.clone();
    let status = render_tiles(&mut output, &base, &config, selection, args.tile, &NeverCancel)?;
    debug!(?status, tile = args.tile, "render finished");
    if status == RenderStatus::Cancelled {
        bail!("Render was cancelled");
    }

    super::save_image(&args.output, &output)?;
    info!(output = %args.output.display(), "saved");

    if verbose > 0 {
        println!("Done.");
    }

    Ok(())
}
