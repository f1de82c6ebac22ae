//! LUT information command

use crate::InfoArgs;
use anyhow::Result;
use tracing::debug;

pub fn run(args: InfoArgs, verbose: u8) -> Result<()> {
    for path in &args.input {
        let file = super::read_cube(path)?;
        debug!(path = %path.display(), "read cube");

        println!("{}", path.display());
        println!("  Title:    {}", file.title.as_deref().unwrap_or("-"));
        println!("  Size:     {0}x{0}x{0}", file.size);
        println!("  Samples:  {} / {}", file.samples.len(), file.expected_samples());
        println!("  Skipped:  {}", file.skipped);
        println!("  Complete: {}", if file.is_complete() { "yes" } else { "no" });

        if verbose > 0 && file.is_complete() {
            let (min, max) = range(&file.samples);
            println!(
                "  Range:    [{:.4}, {:.4}, {:.4}] .. [{:.4}, {:.4}, {:.4}]",
                min[0], min[1], min[2], max[0], max[1], max[2]
            );
        }
    }
    Ok(())
}

/// Per-channel minimum and maximum
fn range(samples: &[[f32; 3]]) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for rgb in samples {
        for c in 0..3 {
            min[c] = min[c].min(rgb[c]);
            max[c] = max[c].max(rgb[c]);
        }
    }
    (min, max)
}
