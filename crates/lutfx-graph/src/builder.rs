//! Trilinear LUT lookup graph.
//!
//! Compositing hosts sample 2D images only, so the 3D lookup is split into
//! two bilinear atlas lookups and one linear blend:
//!
//! - red and blue are interpolated by the bilinear filter itself: red moves
//!   inside a tile, blue moves between atlas rows;
//! - green selects the tile, so it is resolved explicitly by looking up the
//!   `floor` and the clamped `ceil` tile and mixing them by the fraction.
//!
//! Texel positions are scaled by `N - 1` and shifted by half a pixel so that
//! grid points land exactly on pixel centers. The red and blue coordinates
//! are never clamped; extend addressing handles the edges.
//!
//! The topology is fixed. Only the LUT size, the LUT's color space, the
//! working space and the texture name change between instances.

use tracing::debug;

use crate::{Extension, Filter, MathOp, NodeGraph, Op, VectorOp};

/// Stable node ids of the lookup graph.
pub mod ids {
    /// Incoming color.
    pub const INPUT: &str = "group_input";
    /// Working space -> LUT space.
    pub const TO_LUT_SPACE: &str = "to_lut_space";
    /// `N`.
    pub const LUT_SIZE: &str = "lut_size";
    /// `N - 1`.
    pub const MAX_INDEX: &str = "max_index";
    /// Color scaled to grid units.
    pub const SCALE: &str = "grid_scale";
    /// Scaled color split into channels.
    pub const SEPARATE: &str = "grid_separate";
    /// Atlas texture.
    pub const IMAGE: &str = "lut_image";
    /// Atlas resolution.
    pub const IMAGE_INFO: &str = "lut_image_info";
    /// Half-pixel offset in normalized coordinates.
    pub const HALF_PIXEL: &str = "half_pixel";
    /// `N²`.
    pub const ATLAS_WIDTH: &str = "atlas_width";
    /// `(N², N, 1)`.
    pub const ATLAS_SIZE: &str = "atlas_size";
    /// `floor(green)`.
    pub const TILE_FLOOR: &str = "tile_floor";
    /// `ceil(green)`.
    pub const TILE_CEIL: &str = "tile_ceil";
    /// `clamp(ceil(green), 0, N - 1)`.
    pub const TILE_CEIL_CLAMPED: &str = "tile_ceil_clamped";
    /// Column offset of the floor tile.
    pub const FLOOR_OFFSET: &str = "floor_offset";
    /// Texel column in the floor tile.
    pub const FLOOR_COLUMN: &str = "floor_column";
    /// Texel position in the floor tile.
    pub const FLOOR_TEXEL: &str = "floor_texel";
    /// Normalized floor position.
    pub const FLOOR_UV: &str = "floor_uv";
    /// Normalized floor position at pixel center.
    pub const FLOOR_UV_CENTERED: &str = "floor_uv_centered";
    /// Column offset of the ceil tile.
    pub const CEIL_OFFSET: &str = "ceil_offset";
    /// Texel column in the ceil tile.
    pub const CEIL_COLUMN: &str = "ceil_column";
    /// Texel position in the ceil tile.
    pub const CEIL_TEXEL: &str = "ceil_texel";
    /// Normalized ceil position.
    pub const CEIL_UV: &str = "ceil_uv";
    /// Normalized ceil position at pixel center.
    pub const CEIL_UV_CENTERED: &str = "ceil_uv_centered";
    /// Bilinear lookup in the floor tile.
    pub const FLOOR_LOOKUP: &str = "floor_lookup";
    /// Bilinear lookup in the ceil tile.
    pub const CEIL_LOOKUP: &str = "ceil_lookup";
    /// `green - floor(green)`.
    pub const BLEND_FACTOR: &str = "blend_factor";
    /// Floor/ceil blend.
    pub const BLEND: &str = "blend";
    /// LUT space -> working space.
    pub const TO_WORKING_SPACE: &str = "to_working_space";
    /// Outgoing color.
    pub const OUTPUT: &str = "group_output";
}

/// Parameters of one lookup graph instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LutGraphParams {
    /// Node group name.
    pub name: String,
    /// LUT samples per axis.
    pub size: usize,
    /// Name of the atlas texture resource.
    pub texture: String,
    /// Color space the LUT expects its input in and produces its output in.
    pub lut_space: String,
    /// Host working (scene-linear) space the group receives and returns.
    pub working_space: String,
}

/// Builds the lookup graph. Pure: equal parameters give equal graphs.
///
/// # Example
///
/// ```rust
/// use lutfx_graph::{build_lut_graph, LutGraphParams};
///
/// let params = LutGraphParams {
///     name: "grade".into(),
///     size: 33,
///     texture: "grade_atlas".into(),
///     lut_space: "Linear Rec.709".into(),
///     working_space: "Linear Rec.709".into(),
/// };
/// let graph = build_lut_graph(&params);
/// assert!(graph.topological_order().is_ok());
/// assert_eq!(graph, build_lut_graph(&params));
/// ```
pub fn build_lut_graph(params: &LutGraphParams) -> NodeGraph {
    let mut g = NodeGraph::new(&params.name);
    let n = params.size as f32;

    let math = |op| Op::Math {
        op,
        defaults: [0.0, 0.0],
    };
    let vector = |op| Op::VectorMath {
        op,
        defaults: [[0.0; 3]; 2],
    };
    let lookup = || Op::MapUv {
        filter: Filter::Bilinear,
        extension: Extension::Extend,
    };
    let texel = || Op::CombineXyz {
        defaults: [0.0, 0.0, 1.0],
    };

    let input = g.add(ids::INPUT, Op::GroupInput, [0, 3]);
    let to_lut = g.add(
        ids::TO_LUT_SPACE,
        Op::ConvertColorSpace {
            from: params.working_space.clone(),
            to: params.lut_space.clone(),
        },
        [1, 3],
    );

    // Grid scaling.
    let lut_size = g.add(ids::LUT_SIZE, Op::Value { value: n }, [0, 5]);
    let max_index = g.add(
        ids::MAX_INDEX,
        Op::Math {
            op: MathOp::Subtract,
            defaults: [0.0, 1.0],
        },
        [1, 5],
    );
    let scale = g.add(ids::SCALE, vector(VectorOp::Multiply), [2, 3]);
    let separate = g.add(ids::SEPARATE, Op::SeparateXyz, [3, 3]);

    // Atlas geometry.
    let image = g.add(
        ids::IMAGE,
        Op::Image {
            texture: params.texture.clone(),
        },
        [0, 1],
    );
    let info = g.add(ids::IMAGE_INFO, Op::ImageInfo, [0, 0]);
    let half_pixel = g.add(
        ids::HALF_PIXEL,
        Op::VectorMath {
            op: VectorOp::Divide,
            defaults: [[0.5; 3], [1.0; 3]],
        },
        [1, 0],
    );
    let atlas_width = g.add(
        ids::ATLAS_WIDTH,
        Op::Math {
            op: MathOp::Power,
            defaults: [0.0, 2.0],
        },
        [2, 5],
    );
    let atlas_size = g.add(ids::ATLAS_SIZE, texel(), [3, 5]);

    // Tile selection.
    let tile_floor = g.add(ids::TILE_FLOOR, math(MathOp::Floor), [4, 4]);
    let tile_ceil = g.add(ids::TILE_CEIL, math(MathOp::Ceil), [4, 1]);
    let tile_ceil_clamped = g.add(
        ids::TILE_CEIL_CLAMPED,
        Op::Clamp { min: 0.0, max: 1.0 },
        [5, 1],
    );

    // Floor tile lookup position.
    let floor_offset = g.add(ids::FLOOR_OFFSET, math(MathOp::Multiply), [5, 4]);
    let floor_column = g.add(ids::FLOOR_COLUMN, math(MathOp::Add), [6, 4]);
    let floor_texel = g.add(ids::FLOOR_TEXEL, texel(), [7, 4]);
    let floor_uv = g.add(ids::FLOOR_UV, vector(VectorOp::Divide), [8, 4]);
    let floor_centered = g.add(ids::FLOOR_UV_CENTERED, vector(VectorOp::Add), [9, 4]);

    // Ceil tile lookup position.
    let ceil_offset = g.add(ids::CEIL_OFFSET, math(MathOp::Multiply), [6, 1]);
    let ceil_column = g.add(ids::CEIL_COLUMN, math(MathOp::Add), [7, 1]);
    let ceil_texel = g.add(ids::CEIL_TEXEL, texel(), [8, 1]);
    let ceil_uv = g.add(ids::CEIL_UV, vector(VectorOp::Divide), [9, 1]);
    let ceil_centered = g.add(ids::CEIL_UV_CENTERED, vector(VectorOp::Add), [10, 1]);

    // Lookups and blend.
    let floor_lookup = g.add(ids::FLOOR_LOOKUP, lookup(), [11, 4]);
    let ceil_lookup = g.add(ids::CEIL_LOOKUP, lookup(), [11, 1]);
    let blend_factor = g.add(ids::BLEND_FACTOR, math(MathOp::Subtract), [11, 3]);
    let blend = g.add(ids::BLEND, Op::Mix { clamp_factor: true }, [12, 3]);
    let to_working = g.add(
        ids::TO_WORKING_SPACE,
        Op::ConvertColorSpace {
            from: params.lut_space.clone(),
            to: params.working_space.clone(),
        },
        [13, 3],
    );
    let output = g.add(ids::OUTPUT, Op::GroupOutput, [14, 3]);

    g.connect(&input, 0, &to_lut, 0);
    g.connect(&lut_size, 0, &max_index, 0);
    g.connect(&to_lut, 0, &scale, 0);
    g.connect(&max_index, 0, &scale, 1);
    g.connect(&scale, 0, &separate, 0);

    g.connect(&image, 0, &info, 0);
    g.connect(&info, 0, &half_pixel, 1);
    g.connect(&lut_size, 0, &atlas_width, 0);
    g.connect(&atlas_width, 0, &atlas_size, 0);
    g.connect(&lut_size, 0, &atlas_size, 1);

    g.connect(&separate, 1, &tile_floor, 0);
    g.connect(&separate, 1, &tile_ceil, 0);
    g.connect(&tile_ceil, 0, &tile_ceil_clamped, 0);
    g.connect(&max_index, 0, &tile_ceil_clamped, 2);

    g.connect(&lut_size, 0, &floor_offset, 0);
    g.connect(&tile_floor, 0, &floor_offset, 1);
    g.connect(&floor_offset, 0, &floor_column, 0);
    g.connect(&separate, 0, &floor_column, 1);
    g.connect(&floor_column, 0, &floor_texel, 0);
    g.connect(&separate, 2, &floor_texel, 1);
    g.connect(&floor_texel, 0, &floor_uv, 0);
    g.connect(&atlas_size, 0, &floor_uv, 1);
    g.connect(&floor_uv, 0, &floor_centered, 0);
    g.connect(&half_pixel, 0, &floor_centered, 1);

    g.connect(&lut_size, 0, &ceil_offset, 0);
    g.connect(&tile_ceil_clamped, 0, &ceil_offset, 1);
    g.connect(&ceil_offset, 0, &ceil_column, 0);
    g.connect(&separate, 0, &ceil_column, 1);
    g.connect(&ceil_column, 0, &ceil_texel, 0);
    g.connect(&separate, 2, &ceil_texel, 1);
    g.connect(&ceil_texel, 0, &ceil_uv, 0);
    g.connect(&atlas_size, 0, &ceil_uv, 1);
    g.connect(&ceil_uv, 0, &ceil_centered, 0);
    g.connect(&half_pixel, 0, &ceil_centered, 1);

    g.connect(&image, 0, &floor_lookup, 0);
    g.connect(&floor_centered, 0, &floor_lookup, 1);
    g.connect(&image, 0, &ceil_lookup, 0);
    g.connect(&ceil_centered, 0, &ceil_lookup, 1);

    g.connect(&separate, 1, &blend_factor, 0);
    g.connect(&tile_floor, 0, &blend_factor, 1);
    g.connect(&blend_factor, 0, &blend, 0);
    g.connect(&floor_lookup, 0, &blend, 1);
    g.connect(&ceil_lookup, 0, &blend, 2);
    g.connect(&blend, 0, &to_working, 0);
    g.connect(&to_working, 0, &output, 0);

    debug!(
        name = %params.name,
        size = params.size,
        nodes = g.nodes.len(),
        links = g.links.len(),
        "built LUT lookup graph"
    );
    g
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(size: usize) -> LutGraphParams {
        LutGraphParams {
            name: "lut".into(),
            size,
            texture: "lut_atlas".into(),
            lut_space: "sRGB".into(),
            working_space: "Linear Rec.709".into(),
        }
    }

    #[test]
    fn graph_is_valid_dag() {
        let g = build_lut_graph(&params(33));
        let order = g.topological_order().expect("valid graph");
        assert_eq!(order.len(), g.nodes.len());
        assert_eq!(g.nodes.len(), 30);
        assert_eq!(g.textures().collect::<Vec<_>>(), vec!["lut_atlas"]);
    }

    #[test]
    fn only_parameters_change_between_sizes() {
        let a = build_lut_graph(&params(17));
        let b = build_lut_graph(&params(65));
        assert_eq!(a.links, b.links);
        let ids_a: Vec<_> = a.nodes.iter().map(|n| &n.id).collect();
        let ids_b: Vec<_> = b.nodes.iter().map(|n| &n.id).collect();
        assert_eq!(ids_a, ids_b);
        assert_eq!(a.node(ids::LUT_SIZE).unwrap().op, Op::Value { value: 17.0 });
        assert_eq!(b.node(ids::LUT_SIZE).unwrap().op, Op::Value { value: 65.0 });
    }

    #[test]
    fn color_space_nodes_are_symmetric() {
        let g = build_lut_graph(&params(5));
        assert_eq!(
            g.node(ids::TO_LUT_SPACE).unwrap().op,
            Op::ConvertColorSpace {
                from: "Linear Rec.709".into(),
                to: "sRGB".into()
            }
        );
        assert_eq!(
            g.node(ids::TO_WORKING_SPACE).unwrap().op,
            Op::ConvertColorSpace {
                from: "sRGB".into(),
                to: "Linear Rec.709".into()
            }
        );
    }

    #[test]
    fn ceil_tile_is_clamped_to_max_index() {
        let g = build_lut_graph(&params(5));
        let link = g.input_link(ids::TILE_CEIL_CLAMPED, 2).expect("max linked");
        assert_eq!(link.from.node.as_str(), ids::MAX_INDEX);
        assert!(g.input_link(ids::TILE_CEIL_CLAMPED, 1).is_none());
    }

    #[test]
    fn serializes_to_json() {
        let g = build_lut_graph(&params(9));
        let json = serde_json::to_string(&g).unwrap();
        let back: NodeGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(g, back);
    }
}
