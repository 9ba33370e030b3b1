//! Modes command

use crate::ModesArgs;
use anyhow::Result;
use blendplus_ops::BlendMode;

/// Preset/flag spelling of a mode, e.g. `color-burn`.
fn key(mode: BlendMode) -> String {
    mode.name().to_ascii_lowercase().replace(' ', "-")
}

pub fn run(args: ModesArgs) -> Result<()> {
    for mode in BlendMode::ALL {
        if args.short {
            println!("{}", key(mode));
        } else {
            println!("{:>2}  {:<18} {}", mode.index(), key(mode), mode.name());
        }
    }
    Ok(())
}
