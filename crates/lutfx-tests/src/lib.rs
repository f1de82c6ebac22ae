//! Integration tests for lutfx crates.
//!
//! End-to-end scenarios across the LUT types, the lookup graph and the
//! host pipelines, run against the in-memory software host.

#[cfg(test)]
mod tests {
    use std::ops::ControlFlow;
    use std::path::Path;

    use approx::assert_abs_diff_eq;
    use lutfx_host::{
        export_cube, import_cube, EffectHandle, EffectHost, ExportOptions, HostError, ImportOptions,
        Progress, SoftwareHost,
    };
    use lutfx_lut::{cube, Atlas, GridIndex, Lut3D, LutError};
    use lutfx_ocio::ColorConfig;
    use tempfile::tempdir;

    fn keep_going(_: Progress) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn write_lut(path: &Path, lut: &Lut3D) {
        cube::write(path, lut, &cube::CubeHeader::titled("test")).expect("write cube");
    }

    fn render(host: &mut SoftwareHost, effect: EffectHandle, rgb: [f32; 3]) -> [f32; 3] {
        let mut ctx = host.open_evaluation(effect).expect("open evaluation");
        ctx.evaluate(rgb).expect("evaluate")
    }

    fn assert_rgb(actual: [f32; 3], expected: [f32; 3], eps: f32) {
        for c in 0..3 {
            assert_abs_diff_eq!(actual[c], expected[c], epsilon = eps);
        }
    }

    /// Identity effect -> .cube -> adjustment layer reproduces the grid.
    #[test]
    fn test_identity_export_import_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("identity.cube");

        let mut host = SoftwareHost::default();
        host.add_adjustment("identity", |rgb| rgb);
        export_cube(&mut host, &path, &ExportOptions::with_size(5), keep_going).unwrap();

        let file = cube::read(&path).unwrap();
        assert_eq!(file.size, 5);
        assert_eq!(file.skipped, 0);
        let grid = GridIndex::new(5);
        for (i, rgb) in file.samples.iter().enumerate() {
            assert_rgb(*rgb, grid.color(i), 1e-6);
        }

        let imported = import_cube(&mut host, &path, &ImportOptions::default()).unwrap();
        assert_eq!(imported.size, 5);
        for i in 0..grid.len() {
            let input = grid.color(i);
            assert_rgb(render(&mut host, imported.effect, input), input, 1e-5);
        }
        assert_eq!(host.open_contexts(), 0);
    }

    /// Exporting an imported LUT at the same size gives the same samples.
    #[test]
    fn test_resample_same_size_is_lossless() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.cube");
        let second = dir.path().join("second.cube");

        let mut host = SoftwareHost::default();
        host.add_adjustment("look", |[r, g, b]| [r * r, 0.8 * g + 0.1, (r + b) * 0.5]);
        let original = export_cube(&mut host, &first, &ExportOptions::with_size(9), keep_going).unwrap();

        import_cube(&mut host, &first, &ImportOptions::default()).unwrap();
        let resampled = export_cube(&mut host, &second, &ExportOptions::with_size(9), keep_going).unwrap();

        for (a, b) in original.samples().iter().zip(resampled.samples()) {
            assert_rgb(*b, *a, 1e-5);
        }
    }

    /// Resampling to a coarser grid matches trilinear lookup of the source.
    #[test]
    fn test_resample_to_other_size() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.cube");
        let dst = dir.path().join("dst.cube");

        let lut = Lut3D::from_fn(17, |[r, g, b]| [g, b, (r * 2.0).min(1.0)]).unwrap();
        write_lut(&src, &lut);

        let mut host = SoftwareHost::default();
        import_cube(&mut host, &src, &ImportOptions::default()).unwrap();
        let coarse = export_cube(&mut host, &dst, &ExportOptions::with_size(5), keep_going).unwrap();

        let grid = coarse.grid();
        for (i, rgb) in coarse.samples().iter().enumerate() {
            assert_rgb(*rgb, lut.apply(grid.color(i)), 1e-5);
        }
    }

    /// A LUT authored in sRGB wraps its lookup in linear <-> sRGB conversions.
    #[test]
    fn test_srgb_lut_space() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("srgb_identity.cube");
        write_lut(&path, &Lut3D::identity(9).unwrap());

        let mut host = SoftwareHost::default();
        let options = ImportOptions {
            color_space: Some("sRGB".into()),
            ..ImportOptions::default()
        };
        let imported = import_cube(&mut host, &path, &options).unwrap();
        assert_eq!(imported.color_space, "sRGB");

        for rgb in [[0.0, 0.18, 1.0], [0.5, 0.02, 0.75]] {
            assert_rgb(render(&mut host, imported.effect, rgb), rgb, 1e-5);
        }
    }

    /// Midway between two blue strips the result is the average of both.
    #[test]
    fn test_blue_strip_blend_through_host() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("strips.cube");
        let a = [0.2, 0.4, 0.6];
        let b = [1.0, 0.0, 0.2];
        write_lut(&path, &Lut3D::from_fn(2, |[_, _, z]| if z < 0.5 { a } else { b }).unwrap());

        let mut host = SoftwareHost::default();
        let imported = import_cube(&mut host, &path, &ImportOptions::default()).unwrap();
        for (r, g) in [(0.0, 0.0), (0.25, 0.75), (1.0, 0.5)] {
            assert_rgb(render(&mut host, imported.effect, [r, g, 0.5]), [0.6, 0.2, 0.4], 1e-5);
        }
    }

    /// Atlas placement of a 2x2x2 file.
    #[test]
    fn test_atlas_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corners.cube");
        let lut = Lut3D::from_fn(2, |rgb| rgb).unwrap();
        write_lut(&path, &lut);

        let mut host = SoftwareHost::default();
        let imported = import_cube(&mut host, &path, &ImportOptions::default()).unwrap();
        let atlas: &Atlas = host.texture(&imported.name).unwrap();

        assert_eq!((atlas.width(), atlas.height()), (4, 2));
        assert_eq!(atlas.pixel(0, 0), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(atlas.pixel(1, 0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(atlas.pixel(2, 0), [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(atlas.pixel(3, 1), [1.0, 1.0, 1.0, 1.0]);
    }

    /// One malformed line is skipped, and the incomplete file is rejected
    /// before any host resource exists.
    #[test]
    fn test_malformed_line_rejected_before_import() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.cube");

        let mut text = String::from("LUT_3D_SIZE 2\n");
        let grid = GridIndex::new(2);
        for i in 0..grid.len() {
            let [r, g, b] = grid.color(i);
            if i == 3 {
                text.push_str("0.5 oops 0.5\n");
            } else {
                text.push_str(&format!("{r} {g} {b}\n"));
            }
        }
        std::fs::write(&path, text).unwrap();

        let file = cube::read(&path).unwrap();
        assert_eq!(file.samples.len(), 7);
        assert_eq!(file.skipped, 1);

        let mut host = SoftwareHost::default();
        let result = import_cube(&mut host, &path, &ImportOptions::default());
        assert!(matches!(result, Err(HostError::Lut(LutError::SampleCount { .. }))));
        assert_eq!(host.adjustment_count(), 0);
        assert_eq!(host.texture_count(), 0);
        assert_eq!(host.node_group_count(), 0);
    }

    /// The scene-linear role of the config ends up in exported headers.
    #[test]
    fn test_config_scene_linear_in_header() {
        let config = ColorConfig::from_yaml_str(
            "roles:\n  scene_linear: ACEScg\ncolorspaces:\n  - name: ACEScg\n  - name: sRGB\n",
        )
        .unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("aces.cube");

        let mut host = SoftwareHost::new(config);
        assert_eq!(host.color_spaces(), vec!["ACEScg", "sRGB"]);
        host.add_adjustment("id", |rgb| rgb);
        export_cube(&mut host, &path, &ExportOptions::with_size(2), keep_going).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("# Expected input color profile: ACEScg\n"));
    }

    /// Two imports of the same file behave identically.
    #[test]
    fn test_repeated_import_is_deterministic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("look.cube");
        write_lut(&path, &Lut3D::from_fn(6, |[r, g, b]| [b, r, g]).unwrap());

        let mut host = SoftwareHost::default();
        let first = import_cube(&mut host, &path, &ImportOptions::default()).unwrap();
        let second = import_cube(&mut host, &path, &ImportOptions::default()).unwrap();

        let a = host.node_group(first.group).unwrap();
        let b = host.node_group(second.group).unwrap();
        assert_eq!(a.links, b.links);
        assert_eq!(a.nodes.len(), b.nodes.len());

        for rgb in [[0.1, 0.2, 0.3], [0.9, 0.45, 0.05], [1.0, 1.0, 0.0]] {
            let x = render(&mut host, first.effect, rgb);
            let y = render(&mut host, second.effect, rgb);
            assert_eq!(x, y);
        }
    }

    /// Graph JSON dumps reload into an equivalent graph.
    #[test]
    fn test_imported_graph_serializes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("id.cube");
        write_lut(&path, &Lut3D::identity(4).unwrap());

        let mut host = SoftwareHost::default();
        let imported = import_cube(&mut host, &path, &ImportOptions::default()).unwrap();
        let graph = host.node_group(imported.group).unwrap();

        let json = serde_json::to_string(graph).unwrap();
        let back: lutfx_graph::NodeGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, graph);
        assert_eq!(back.textures().collect::<Vec<_>>(), vec![imported.name.as_str()]);
    }
}
