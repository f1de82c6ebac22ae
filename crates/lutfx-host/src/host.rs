//! Collaborator traits implemented by video-editor hosts.
//!
//! The pipelines never touch host state directly. Export needs a way to
//! render one color through an adjustment effect ([`EvaluationContext`]);
//! import needs a way to create and remove resources ([`EffectHost`]).

use std::fmt;

use lutfx_graph::NodeGraph;
use lutfx_lut::Atlas;

use crate::HostResult;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

handle!(
    /// Adjustment effect (strip) owned by the host.
    EffectHandle,
    "effect"
);
handle!(
    /// Texture resource owned by the host.
    TextureHandle,
    "texture"
);
handle!(
    /// Node group resource owned by the host.
    GroupHandle,
    "group"
);

/// Placement of a newly created adjustment effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustmentSpec {
    /// Display name.
    pub name: String,
    /// Track the effect is placed on.
    pub channel: u32,
    /// First frame.
    pub frame_start: i64,
    /// Length in frames.
    pub length: u32,
}

impl Default for AdjustmentSpec {
    fn default() -> Self {
        Self {
            name: "LUT".into(),
            channel: 1,
            frame_start: 0,
            length: 100,
        }
    }
}

/// Isolated render state for evaluating one effect.
///
/// Dropping the context tears down whatever scratch state the host set up
/// for it, on every exit path.
pub trait EvaluationContext {
    /// Renders `rgb` through the effect and returns the resulting color.
    fn evaluate(&mut self, rgb: [f32; 3]) -> HostResult<[f32; 3]>;
}

/// Host operations used by the export and import pipelines.
pub trait EffectHost {
    /// Whether a document (sequencer scene) is open.
    fn has_document(&self) -> bool;

    /// The selected adjustment effect, if the selection is one.
    fn active_adjustment(&self) -> Option<EffectHandle>;

    /// Sets up scratch render state for `effect`.
    fn open_evaluation(&mut self, effect: EffectHandle) -> HostResult<Box<dyn EvaluationContext + '_>>;

    /// Name of the scene-linear working space.
    fn scene_linear(&self) -> String;

    /// Names of the valid color spaces, scene linear first.
    fn color_spaces(&self) -> Vec<String>;

    /// Creates an adjustment effect.
    fn create_adjustment(&mut self, spec: &AdjustmentSpec) -> HostResult<EffectHandle>;

    /// Creates a non-color float texture holding `atlas`.
    fn create_texture(&mut self, name: &str, atlas: &Atlas) -> HostResult<TextureHandle>;

    /// Creates a node group with the contents of `graph`.
    fn create_node_group(&mut self, graph: &NodeGraph) -> HostResult<GroupHandle>;

    /// Makes `group` the compositor of `effect`.
    fn attach_node_group(&mut self, effect: EffectHandle, group: GroupHandle) -> HostResult<()>;

    /// Removes an adjustment effect.
    fn remove_adjustment(&mut self, effect: EffectHandle) -> HostResult<()>;

    /// Removes a texture.
    fn remove_texture(&mut self, texture: TextureHandle) -> HostResult<()>;

    /// Removes a node group.
    fn remove_node_group(&mut self, group: GroupHandle) -> HostResult<()>;
}
