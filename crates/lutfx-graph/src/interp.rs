//! Reference interpreter for node graphs.
//!
//! Evaluates a [`NodeGraph`] for one input color at a time, the way a
//! compositor evaluates it per pixel. Construction resolves links and
//! textures once; [`GraphInterpreter::evaluate`] then only reads shared
//! state, so one interpreter can be used from many threads.

use std::collections::{BTreeMap, HashMap};

use lutfx_lut::Atlas;

use crate::{ColorSpaceConverter, Extension, Filter, GraphError, GraphResult, NodeGraph, Op};

/// Provides atlas textures by name.
pub trait TextureSource {
    /// Looks up a texture.
    fn texture(&self, name: &str) -> Option<&Atlas>;
}

impl TextureSource for HashMap<String, Atlas> {
    fn texture(&self, name: &str) -> Option<&Atlas> {
        self.get(name)
    }
}

impl TextureSource for BTreeMap<String, Atlas> {
    fn texture(&self, name: &str) -> Option<&Atlas> {
        self.get(name)
    }
}

/// Value flowing along a link.
#[derive(Debug, Clone, Copy)]
enum Value<'a> {
    Float(f32),
    Vector([f32; 3]),
    Color([f32; 4]),
    Image(&'a Atlas),
}

impl Value<'_> {
    fn as_float(&self) -> Option<f32> {
        match *self {
            Value::Float(f) => Some(f),
            Value::Vector(v) => Some((v[0] + v[1] + v[2]) / 3.0),
            Value::Color(c) => Some((c[0] + c[1] + c[2]) / 3.0),
            Value::Image(_) => None,
        }
    }

    fn as_vector(&self) -> Option<[f32; 3]> {
        match *self {
            Value::Float(f) => Some([f; 3]),
            Value::Vector(v) => Some(v),
            Value::Color(c) => Some([c[0], c[1], c[2]]),
            Value::Image(_) => None,
        }
    }

    fn as_color(&self) -> Option<[f32; 4]> {
        match *self {
            Value::Float(f) => Some([f, f, f, 1.0]),
            Value::Vector(v) => Some([v[0], v[1], v[2], 1.0]),
            Value::Color(c) => Some(c),
            Value::Image(_) => None,
        }
    }
}

/// Per-node outputs during one evaluation.
type Outputs<'a> = Vec<[Option<Value<'a>>; 3]>;

/// Evaluates a validated graph.
pub struct GraphInterpreter<'a> {
    graph: &'a NodeGraph,
    order: Vec<usize>,
    /// `sources[node][input] = (source node, source output)`
    sources: Vec<Vec<Option<(usize, usize)>>>,
    textures: Vec<Option<&'a Atlas>>,
    converter: &'a dyn ColorSpaceConverter,
}

impl<'a> GraphInterpreter<'a> {
    /// Validates the graph and resolves its links and textures.
    pub fn new(
        graph: &'a NodeGraph,
        textures: &'a dyn TextureSource,
        converter: &'a dyn ColorSpaceConverter,
    ) -> GraphResult<Self> {
        let order = graph.topological_order()?;

        let index: HashMap<&str, usize> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        let mut sources: Vec<Vec<Option<(usize, usize)>>> =
            graph.nodes.iter().map(|n| vec![None; n.op.inputs()]).collect();
        for link in &graph.links {
            // Endpoints were checked by topological_order.
            let from = index[link.from.node.as_str()];
            let to = index[link.to.node.as_str()];
            sources[to][link.to.port] = Some((from, link.from.port));
        }

        let mut resolved = Vec::with_capacity(graph.nodes.len());
        for node in &graph.nodes {
            resolved.push(match &node.op {
                Op::Image { texture } => Some(
                    textures
                        .texture(texture)
                        .ok_or_else(|| GraphError::MissingTexture(texture.clone()))?,
                ),
                _ => None,
            });
        }

        if !graph.nodes.iter().any(|n| matches!(n.op, Op::GroupOutput)) {
            return Err(GraphError::NoOutput);
        }

        Ok(Self {
            graph,
            order,
            sources,
            textures: resolved,
            converter,
        })
    }

    /// Evaluates the graph for one input color and returns the RGBA output.
    pub fn evaluate(&self, rgb: [f32; 3]) -> GraphResult<[f32; 4]> {
        let mut values: Outputs<'a> = vec![[None; 3]; self.graph.nodes.len()];
        let mut result = None;

        for &i in &self.order {
            let node = &self.graph.nodes[i];
            let out = match &node.op {
                Op::GroupInput => [Some(Value::Color([rgb[0], rgb[1], rgb[2], 1.0])), None, None],
                Op::GroupOutput => {
                    result = Some(self.color(&values, i, 0, [0.0, 0.0, 0.0, 1.0])?);
                    [None; 3]
                }
                Op::Value { value } => single(Value::Float(*value)),
                Op::Math { op, defaults } => {
                    let a = self.float(&values, i, 0, defaults[0])?;
                    let b = self.float(&values, i, 1, defaults[1])?;
                    single(Value::Float(op.apply(a, b)))
                }
                Op::Clamp { min, max } => {
                    let v = self.float(&values, i, 0, 0.0)?;
                    let lo = self.float(&values, i, 1, *min)?;
                    let hi = self.float(&values, i, 2, *max)?;
                    single(Value::Float(v.max(lo).min(hi)))
                }
                Op::VectorMath { op, defaults } => {
                    let a = self.vector(&values, i, 0, defaults[0])?;
                    let b = self.vector(&values, i, 1, defaults[1])?;
                    single(Value::Vector(op.apply(a, b)))
                }
                Op::SeparateXyz => {
                    let v = self.vector(&values, i, 0, [0.0; 3])?;
                    [
                        Some(Value::Float(v[0])),
                        Some(Value::Float(v[1])),
                        Some(Value::Float(v[2])),
                    ]
                }
                Op::CombineXyz { defaults } => {
                    let x = self.float(&values, i, 0, defaults[0])?;
                    let y = self.float(&values, i, 1, defaults[1])?;
                    let z = self.float(&values, i, 2, defaults[2])?;
                    single(Value::Vector([x, y, z]))
                }
                Op::Image { .. } => match self.textures[i] {
                    Some(atlas) => single(Value::Image(atlas)),
                    None => return Err(GraphError::MissingTexture(node.id.to_string())),
                },
                Op::ImageInfo => {
                    let atlas = self.image(&values, i, 0)?;
                    single(Value::Vector([atlas.width() as f32, atlas.height() as f32, 1.0]))
                }
                Op::MapUv { filter, extension } => {
                    let atlas = self.image(&values, i, 0)?;
                    let uv = self.vector(&values, i, 1, [0.0; 3])?;
                    single(Value::Color(lookup(atlas, uv[0], uv[1], *filter, *extension)))
                }
                Op::Mix { clamp_factor } => {
                    let mut t = self.float(&values, i, 0, 0.5)?;
                    if *clamp_factor {
                        t = t.clamp(0.0, 1.0);
                    }
                    let a = self.color(&values, i, 1, [0.0, 0.0, 0.0, 1.0])?;
                    let b = self.color(&values, i, 2, [0.0, 0.0, 0.0, 1.0])?;
                    let mut mixed = [0.0f32; 4];
                    for c in 0..4 {
                        mixed[c] = a[c] + (b[c] - a[c]) * t;
                    }
                    single(Value::Color(mixed))
                }
                Op::ConvertColorSpace { from, to } => {
                    let c = self.color(&values, i, 0, [0.0, 0.0, 0.0, 1.0])?;
                    let rgb = self.converter.convert([c[0], c[1], c[2]], from, to)?;
                    single(Value::Color([rgb[0], rgb[1], rgb[2], c[3]]))
                }
            };
            values[i] = out;
        }

        result.ok_or(GraphError::NoOutput)
    }

    /// Evaluates and drops alpha.
    pub fn evaluate_rgb(&self, rgb: [f32; 3]) -> GraphResult<[f32; 3]> {
        let [r, g, b, _] = self.evaluate(rgb)?;
        Ok([r, g, b])
    }

    fn linked(&self, values: &Outputs<'a>, node: usize, port: usize) -> Option<Value<'a>> {
        let (src, src_port) = self.sources[node][port]?;
        values[src][src_port]
    }

    fn mismatch(&self, node: usize, port: usize, expected: &'static str) -> GraphError {
        GraphError::TypeMismatch {
            node: self.graph.nodes[node].id.to_string(),
            port,
            expected,
        }
    }

    fn float(&self, values: &Outputs<'a>, node: usize, port: usize, default: f32) -> GraphResult<f32> {
        match self.linked(values, node, port) {
            Some(v) => v.as_float().ok_or_else(|| self.mismatch(node, port, "float")),
            None => Ok(default),
        }
    }

    fn vector(
        &self,
        values: &Outputs<'a>,
        node: usize,
        port: usize,
        default: [f32; 3],
    ) -> GraphResult<[f32; 3]> {
        match self.linked(values, node, port) {
            Some(v) => v.as_vector().ok_or_else(|| self.mismatch(node, port, "vector")),
            None => Ok(default),
        }
    }

    fn color(
        &self,
        values: &Outputs<'a>,
        node: usize,
        port: usize,
        default: [f32; 4],
    ) -> GraphResult<[f32; 4]> {
        match self.linked(values, node, port) {
            Some(v) => v.as_color().ok_or_else(|| self.mismatch(node, port, "color")),
            None => Ok(default),
        }
    }

    fn image(&self, values: &Outputs<'a>, node: usize, port: usize) -> GraphResult<&'a Atlas> {
        match self.linked(values, node, port) {
            Some(Value::Image(atlas)) => Ok(atlas),
            _ => Err(self.mismatch(node, port, "image")),
        }
    }
}

#[inline]
fn single(v: Value<'_>) -> [Option<Value<'_>>; 3] {
    [Some(v), None, None]
}

fn lookup(atlas: &Atlas, u: f32, v: f32, filter: Filter, extension: Extension) -> [f32; 4] {
    if extension == Extension::Clip && !((0.0..=1.0).contains(&u) && (0.0..=1.0).contains(&v)) {
        return [0.0; 4];
    }
    match filter {
        Filter::Bilinear => atlas.sample_bilinear(u, v),
        Filter::Nearest => {
            let x = (u * atlas.width() as f32).floor().clamp(0.0, (atlas.width() - 1) as f32);
            let y = (v * atlas.height() as f32).floor().clamp(0.0, (atlas.height() - 1) as f32);
            atlas.pixel(x as usize, y as usize)
        }
    }
}
