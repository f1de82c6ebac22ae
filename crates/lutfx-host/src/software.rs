//! In-memory effect host.
//!
//! [`SoftwareHost`] keeps adjustment effects, textures and node groups in
//! maps and renders colors on the CPU. Effects are either a plain color
//! transform or an attached node group, which is evaluated with the
//! [`GraphInterpreter`]. Used by the CLI and by tests, which can also make
//! individual host operations fail on demand.

use std::cell::Cell;
use std::collections::BTreeMap;

use lutfx_graph::{GraphInterpreter, NodeGraph};
use lutfx_lut::Atlas;
use lutfx_ocio::ColorConfig;
use tracing::debug;

use crate::{
    AdjustmentSpec, BuiltinConverter, EffectHandle, EffectHost, EvaluationContext, GroupHandle,
    HostError, HostResult, TextureHandle,
};

/// Color transform applied by a software adjustment effect.
pub type Transform = Box<dyn Fn([f32; 3]) -> [f32; 3] + Send + Sync>;

/// Host operation that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    /// [`EffectHost::create_adjustment`]
    CreateAdjustment,
    /// [`EffectHost::create_texture`]
    CreateTexture,
    /// [`EffectHost::create_node_group`]
    CreateNodeGroup,
    /// [`EffectHost::attach_node_group`]
    AttachNodeGroup,
    /// The n-th (zero based) evaluation of a context.
    Evaluate(usize),
}

struct Effect {
    spec: AdjustmentSpec,
    transform: Option<Transform>,
    group: Option<GroupHandle>,
}

/// CPU implementation of [`EffectHost`].
pub struct SoftwareHost {
    config: ColorConfig,
    converter: BuiltinConverter,
    document: bool,
    next_id: u64,
    effects: BTreeMap<u64, Effect>,
    selected: Option<EffectHandle>,
    textures: BTreeMap<String, Atlas>,
    texture_names: BTreeMap<u64, String>,
    groups: BTreeMap<u64, NodeGraph>,
    fail: Option<FailPoint>,
    open_contexts: Cell<usize>,
}

impl Default for SoftwareHost {
    fn default() -> Self {
        Self::new(ColorConfig::default())
    }
}

impl SoftwareHost {
    /// Creates a host with an open document and no effects.
    pub fn new(config: ColorConfig) -> Self {
        let converter = BuiltinConverter::new(config.scene_linear());
        Self {
            config,
            converter,
            document: true,
            next_id: 1,
            effects: BTreeMap::new(),
            selected: None,
            textures: BTreeMap::new(),
            texture_names: BTreeMap::new(),
            groups: BTreeMap::new(),
            fail: None,
            open_contexts: Cell::new(0),
        }
    }

    /// Closes the document.
    pub fn without_document(mut self) -> Self {
        self.document = false;
        self
    }

    /// Makes one host operation fail with [`HostError::Resource`].
    pub fn fail_at(&mut self, point: FailPoint) {
        self.fail = Some(point);
    }

    /// Adds a selected adjustment effect applying `transform`.
    pub fn add_adjustment<F>(&mut self, name: &str, transform: F) -> EffectHandle
    where
        F: Fn([f32; 3]) -> [f32; 3] + Send + Sync + 'static,
    {
        let handle = EffectHandle(self.alloc());
        self.effects.insert(
            handle.0,
            Effect {
                spec: AdjustmentSpec {
                    name: name.to_string(),
                    ..AdjustmentSpec::default()
                },
                transform: Some(Box::new(transform)),
                group: None,
            },
        );
        self.selected = Some(handle);
        handle
    }

    /// Selects an effect, or clears the selection.
    pub fn select(&mut self, effect: Option<EffectHandle>) {
        self.selected = effect;
    }

    /// Number of adjustment effects.
    pub fn adjustment_count(&self) -> usize {
        self.effects.len()
    }

    /// Number of textures.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Number of node groups.
    pub fn node_group_count(&self) -> usize {
        self.groups.len()
    }

    /// Evaluation contexts currently open.
    pub fn open_contexts(&self) -> usize {
        self.open_contexts.get()
    }

    /// Placement of an effect.
    pub fn adjustment(&self, effect: EffectHandle) -> Option<&AdjustmentSpec> {
        self.effects.get(&effect.0).map(|e| &e.spec)
    }

    /// Node group attached to an effect.
    pub fn attached_group(&self, effect: EffectHandle) -> Option<GroupHandle> {
        self.effects.get(&effect.0).and_then(|e| e.group)
    }

    /// Contents of a node group.
    pub fn node_group(&self, group: GroupHandle) -> Option<&NodeGraph> {
        self.groups.get(&group.0)
    }

    /// Texture by name.
    pub fn texture(&self, name: &str) -> Option<&Atlas> {
        self.textures.get(name)
    }

    /// Name of a texture handle.
    pub fn texture_name(&self, texture: TextureHandle) -> Option<&str> {
        self.texture_names.get(&texture.0).map(String::as_str)
    }

    fn alloc(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn check(&self, point: FailPoint) -> HostResult<()> {
        if self.fail == Some(point) {
            return Err(HostError::Resource(format!("injected failure: {point:?}")));
        }
        Ok(())
    }
}

enum Renderer<'a> {
    Identity,
    Transform(&'a (dyn Fn([f32; 3]) -> [f32; 3] + Send + Sync)),
    Graph(GraphInterpreter<'a>),
}

struct SoftwareEvaluation<'a> {
    renderer: Renderer<'a>,
    open: &'a Cell<usize>,
    evaluated: usize,
    fail_at: Option<usize>,
}

impl EvaluationContext for SoftwareEvaluation<'_> {
    fn evaluate(&mut self, rgb: [f32; 3]) -> HostResult<[f32; 3]> {
        if self.fail_at == Some(self.evaluated) {
            return Err(HostError::Resource(format!("render of sample {} failed", self.evaluated)));
        }
        self.evaluated += 1;
        match &self.renderer {
            Renderer::Identity => Ok(rgb),
            Renderer::Transform(f) => Ok(f(rgb)),
            Renderer::Graph(interp) => Ok(interp.evaluate_rgb(rgb)?),
        }
    }
}

impl Drop for SoftwareEvaluation<'_> {
    fn drop(&mut self) {
        self.open.set(self.open.get().saturating_sub(1));
        debug!(evaluated = self.evaluated, "released scratch scene");
    }
}

impl EffectHost for SoftwareHost {
    fn has_document(&self) -> bool {
        self.document
    }

    fn active_adjustment(&self) -> Option<EffectHandle> {
        self.selected.filter(|h| self.effects.contains_key(&h.0))
    }

    fn open_evaluation(&mut self, effect: EffectHandle) -> HostResult<Box<dyn EvaluationContext + '_>> {
        let this: &Self = self;
        let state = this
            .effects
            .get(&effect.0)
            .ok_or_else(|| HostError::Resource(format!("unknown {effect}")))?;

        let renderer = match (state.group, &state.transform) {
            (Some(group), _) => {
                let graph = this
                    .groups
                    .get(&group.0)
                    .ok_or_else(|| HostError::Resource(format!("unknown {group}")))?;
                Renderer::Graph(GraphInterpreter::new(graph, &this.textures, &this.converter)?)
            }
            (None, Some(f)) => Renderer::Transform(f.as_ref()),
            (None, None) => Renderer::Identity,
        };

        let fail_at = match this.fail {
            Some(FailPoint::Evaluate(n)) => Some(n),
            _ => None,
        };

        this.open_contexts.set(this.open_contexts.get() + 1);
        debug!(%effect, "opened scratch scene");
        Ok(Box::new(SoftwareEvaluation {
            renderer,
            open: &this.open_contexts,
            evaluated: 0,
            fail_at,
        }))
    }

    fn scene_linear(&self) -> String {
        self.config.scene_linear().to_string()
    }

    /// Config color spaces the built-in converter can render.
    fn color_spaces(&self) -> Vec<String> {
        self.config
            .color_spaces()
            .into_iter()
            .filter(|name| self.converter.encoding(name).is_some())
            .collect()
    }

    fn create_adjustment(&mut self, spec: &AdjustmentSpec) -> HostResult<EffectHandle> {
        self.check(FailPoint::CreateAdjustment)?;
        let handle = EffectHandle(self.alloc());
        self.effects.insert(
            handle.0,
            Effect {
                spec: spec.clone(),
                transform: None,
                group: None,
            },
        );
        self.selected = Some(handle);
        Ok(handle)
    }

    fn create_texture(&mut self, name: &str, atlas: &Atlas) -> HostResult<TextureHandle> {
        self.check(FailPoint::CreateTexture)?;
        if self.textures.contains_key(name) {
            return Err(HostError::Resource(format!("texture '{name}' already exists")));
        }
        let handle = TextureHandle(self.alloc());
        self.textures.insert(name.to_string(), atlas.clone());
        self.texture_names.insert(handle.0, name.to_string());
        Ok(handle)
    }

    fn create_node_group(&mut self, graph: &NodeGraph) -> HostResult<GroupHandle> {
        self.check(FailPoint::CreateNodeGroup)?;
        graph.topological_order()?;
        let handle = GroupHandle(self.alloc());
        self.groups.insert(handle.0, graph.clone());
        Ok(handle)
    }

    fn attach_node_group(&mut self, effect: EffectHandle, group: GroupHandle) -> HostResult<()> {
        self.check(FailPoint::AttachNodeGroup)?;
        if !self.groups.contains_key(&group.0) {
            return Err(HostError::Resource(format!("unknown {group}")));
        }
        let state = self
            .effects
            .get_mut(&effect.0)
            .ok_or_else(|| HostError::Resource(format!("unknown {effect}")))?;
        state.group = Some(group);
        Ok(())
    }

    fn remove_adjustment(&mut self, effect: EffectHandle) -> HostResult<()> {
        self.effects
            .remove(&effect.0)
            .ok_or_else(|| HostError::Resource(format!("unknown {effect}")))?;
        if self.selected == Some(effect) {
            self.selected = None;
        }
        Ok(())
    }

    fn remove_texture(&mut self, texture: TextureHandle) -> HostResult<()> {
        let name = self
            .texture_names
            .remove(&texture.0)
            .ok_or_else(|| HostError::Resource(format!("unknown {texture}")))?;
        self.textures.remove(&name);
        Ok(())
    }

    fn remove_node_group(&mut self, group: GroupHandle) -> HostResult<()> {
        self.groups
            .remove(&group.0)
            .ok_or_else(|| HostError::Resource(format!("unknown {group}")))?;
        for effect in self.effects.values_mut() {
            if effect.group == Some(group) {
                effect.group = None;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contexts_are_counted() {
        let mut host = SoftwareHost::default();
        let effect = host.add_adjustment("invert", |rgb| rgb.map(|c| 1.0 - c));
        {
            let mut ctx = host.open_evaluation(effect).unwrap();
            assert_eq!(ctx.evaluate([0.25, 0.5, 1.0]).unwrap(), [0.75, 0.5, 0.0]);
        }
        assert_eq!(host.open_contexts(), 0);
    }

    #[test]
    fn lists_only_renderable_color_spaces() {
        let config = ColorConfig::from_yaml_str(
            "roles:\n  scene_linear: ACEScg\ncolorspaces:\n  - name: ACEScg\n  - name: ARRI LogC\n  - name: sRGB\n  - name: Raw\n",
        )
        .unwrap();
        let host = SoftwareHost::new(config);
        assert_eq!(host.color_spaces(), vec!["ACEScg", "sRGB", "Raw"]);
        assert_eq!(
            SoftwareHost::default().color_spaces(),
            vec!["Linear Rec.709", "sRGB", "Non-Color"]
        );
    }

    #[test]
    fn injected_failures() {
        let mut host = SoftwareHost::default();
        host.fail_at(FailPoint::CreateTexture);
        let atlas = Atlas::from_lut(&lutfx_lut::Lut3D::identity(2).unwrap());
        assert!(matches!(host.create_texture("t", &atlas), Err(HostError::Resource(_))));
        assert!(host.create_adjustment(&AdjustmentSpec::default()).is_ok());
        assert_eq!(host.texture_count(), 0);
    }

    #[test]
    fn removing_resources() {
        let mut host = SoftwareHost::default();
        let effect = host.create_adjustment(&AdjustmentSpec::default()).unwrap();
        assert_eq!(host.active_adjustment(), Some(effect));
        assert_eq!(host.adjustment(effect).unwrap().name, "LUT");

        let atlas = Atlas::from_lut(&lutfx_lut::Lut3D::identity(2).unwrap());
        let texture = host.create_texture("t", &atlas).unwrap();
        assert!(matches!(host.create_texture("t", &atlas), Err(HostError::Resource(_))));
        assert_eq!(host.texture_name(texture), Some("t"));

        host.remove_texture(texture).unwrap();
        host.remove_adjustment(effect).unwrap();
        assert_eq!(host.texture_count(), 0);
        assert_eq!(host.active_adjustment(), None);
        assert!(host.remove_adjustment(effect).is_err());
    }
}
