//! Resample command
//!
//! Runs the full round trip on the software host: the input LUT is imported
//! as an adjustment layer (atlas + lookup graph) and that layer is exported
//! again through the grid sampler at the requested size.

use crate::ResampleArgs;
use anyhow::{Context, Result};
use lutfx_host::{export_cube, import_cube, ExportOptions, ImportOptions, Progress, SoftwareHost};
use lutfx_ocio::ColorConfig;
use std::ops::ControlFlow;
use tracing::info;

pub fn run(args: ResampleArgs, config: ColorConfig, verbose: u8) -> Result<()> {
    let mut host = SoftwareHost::new(config);

    let imported = import_cube(
        &mut host,
        &args.input,
        &ImportOptions {
            color_space: args.color_space.clone(),
            ..ImportOptions::default()
        },
    )
    .with_context(|| format!("Failed to import: {}", args.input.display()))?;

    let options = ExportOptions {
        size: args.size,
        title: args.title.clone(),
    };
    let mut last_percent = 0;
    let lut = export_cube(&mut host, &args.output, &options, |p: Progress| {
        let percent = (p.fraction() * 100.0) as u32;
        if verbose > 0 && percent >= last_percent + 10 {
            last_percent = percent;
            eprintln!("  {percent}%");
        }
        ControlFlow::Continue(())
    })
    .with_context(|| format!("Failed to export: {}", args.output.display()))?;

    info!(from = imported.size, to = lut.size(), "resampled");
    if verbose > 0 {
        println!(
            "Resampled {} ({}^3) -> {} ({}^3)",
            args.input.display(),
            imported.size,
            args.output.display(),
            lut.size()
        );
    }
    Ok(())
}
