//! Atlas + graph import command
//!
//! Writes what a compositing host needs to apply the LUT: the atlas as a
//! 32-bit float EXR and the lookup node graph as JSON.

use crate::ImportArgs;
use anyhow::{Context, Result};
use lutfx_graph::{build_lut_graph, LutGraphParams, NodeGraph};
use lutfx_lut::Atlas;
use lutfx_ocio::ColorConfig;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn run(args: ImportArgs, config: &ColorConfig, verbose: u8) -> Result<()> {
    let lut = super::load_lut(&args.input)?;
    let lut_space = super::lut_space(config, args.color_space.as_deref())?;
    let name = super::stem(&args.input).to_string();

    let atlas = Atlas::from_lut(&lut);
    let graph = build_lut_graph(&LutGraphParams {
        name: name.clone(),
        size: lut.size(),
        texture: format!("{name}.exr"),
        lut_space,
        working_space: config.scene_linear().to_string(),
    });

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create: {}", args.output.display()))?;
    let (exr_path, json_path) = output_paths(&args.output, &name);
    write_atlas(&exr_path, &atlas)?;
    write_graph(&json_path, &graph)?;

    info!(size = lut.size(), nodes = graph.nodes.len(), "imported {}", args.input.display());
    if verbose > 0 {
        println!("Atlas: {} ({}x{})", exr_path.display(), atlas.width(), atlas.height());
        println!("Graph: {} ({} nodes)", json_path.display(), graph.nodes.len());
    }
    Ok(())
}

fn output_paths(dir: &Path, name: &str) -> (PathBuf, PathBuf) {
    (dir.join(format!("{name}.exr")), dir.join(format!("{name}.graph.json")))
}

/// Write an atlas as RGBA f32 EXR
pub fn write_atlas(path: &Path, atlas: &Atlas) -> Result<()> {
    use exr::prelude::*;

    let width = atlas.width();
    let height = atlas.height();
    let data = atlas.data();

    let layer = Layer::new(
        (width, height),
        LayerAttributes::named("RGBA"),
        Encoding::SMALL_LOSSLESS,
        SpecificChannels::rgba(|pos: Vec2<usize>| {
            let i = (pos.y() * width + pos.x()) * Atlas::CHANNELS;
            (data[i], data[i + 1], data[i + 2], data[i + 3])
        }),
    );

    Image::from_layer(layer)
        .write()
        .to_file(path)
        .with_context(|| format!("Failed to save: {}", path.display()))
}

/// Write a graph as pretty JSON
pub fn write_graph(path: &Path, graph: &NodeGraph) -> Result<()> {
    let json = serde_json::to_string_pretty(graph).context("Failed to serialize graph")?;
    std::fs::write(path, json).with_context(|| format!("Failed to save: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lutfx_lut::Lut3D;

    #[test]
    fn writes_atlas_and_graph() {
        let dir = tempfile::tempdir().unwrap();
        let (exr_path, json_path) = output_paths(dir.path(), "grade");
        assert!(exr_path.ends_with("grade.exr"));
        assert!(json_path.ends_with("grade.graph.json"));

        let lut = Lut3D::identity(3).unwrap();
        write_atlas(&exr_path, &Atlas::from_lut(&lut)).unwrap();
        assert!(std::fs::metadata(&exr_path).unwrap().len() > 0);

        let graph = build_lut_graph(&LutGraphParams {
            name: "grade".into(),
            size: 3,
            texture: "grade.exr".into(),
            lut_space: "sRGB".into(),
            working_space: "Linear Rec.709".into(),
        });
        write_graph(&json_path, &graph).unwrap();
        let text = std::fs::read_to_string(&json_path).unwrap();
        let back: NodeGraph = serde_json::from_str(&text).unwrap();
        assert_eq!(back, graph);
    }
}
