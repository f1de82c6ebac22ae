//! Graph verification command
//!
//! Evaluates the lookup graph at `K^3` cell-centered points and compares the
//! results with CPU trilinear interpolation of the same LUT.

use crate::VerifyArgs;
use anyhow::{bail, Context, Result};
use lutfx_graph::{build_lut_graph, GraphInterpreter, GraphResult, LutGraphParams};
use lutfx_host::BuiltinConverter;
use lutfx_lut::{Atlas, Lut3D, MAX_SIZE};
use lutfx_ocio::ColorConfig;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::info;

pub fn run(args: VerifyArgs, config: &ColorConfig, verbose: u8) -> Result<()> {
    if !(1..=MAX_SIZE).contains(&args.samples) {
        bail!("--samples must be between 1 and {}", MAX_SIZE);
    }
    let lut = super::load_lut(&args.input)?;
    let report = compare(&lut, config.scene_linear(), args.samples)
        .with_context(|| format!("Failed to evaluate graph for {}", args.input.display()))?;

    info!(points = report.points, max_error = report.max_error, "verified");
    if verbose > 0 || report.max_error > args.tolerance {
        println!("Points:    {}", report.points);
        println!("Max error: {:.3e}", report.max_error);
        println!("Worst at:  {:?}", report.worst);
    }
    if report.max_error > args.tolerance {
        bail!(
            "graph deviates from trilinear by {:.3e} (tolerance {:.3e})",
            report.max_error,
            args.tolerance
        );
    }
    println!("OK");
    Ok(())
}

/// Result of a graph/reference comparison
#[derive(Debug, Clone, Copy)]
pub struct Report {
    pub points: usize,
    pub max_error: f32,
    pub worst: [f32; 3],
}

/// Compare the lookup graph with `Lut3D::apply` on a `k^3` grid of cell centers
pub fn compare(lut: &Lut3D, working_space: &str, k: usize) -> GraphResult<Report> {
    let texture = "lut";
    let graph = build_lut_graph(&LutGraphParams {
        name: "verify".into(),
        size: lut.size(),
        texture: texture.into(),
        lut_space: working_space.into(),
        working_space: working_space.into(),
    });
    let textures = HashMap::from([(texture.to_string(), Atlas::from_lut(lut))]);
    let converter = BuiltinConverter::new(working_space);
    let interp = GraphInterpreter::new(&graph, &textures, &converter)?;

    let points = k * k * k;
    let (max_error, worst) = (0..points)
        .into_par_iter()
        .map(|i| {
            let p = [
                ((i % k) as f32 + 0.5) / k as f32,
                ((i / k % k) as f32 + 0.5) / k as f32,
                ((i / (k * k)) as f32 + 0.5) / k as f32,
            ];
            let got = interp.evaluate_rgb(p)?;
            let want = lut.apply(p);
            let err = (0..3).map(|c| (got[c] - want[c]).abs()).fold(0.0f32, f32::max);
            Ok((err, p))
        })
        .try_reduce(|| (0.0, [0.0; 3]), |a, b| Ok(if b.0 > a.0 { b } else { a }))?;

    Ok(Report {
        points,
        max_error,
        worst,
    })
}
