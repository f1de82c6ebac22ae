//! Node operators.
//!
//! Every operator is a pure function of its inputs. Unlinked inputs take the
//! default stored in the operator itself, mirroring how compositing hosts
//! keep a default value on each socket.

use serde::{Deserialize, Serialize};

/// Scalar math operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MathOp {
    /// `a + b`
    Add,
    /// `a - b`
    Subtract,
    /// `a * b`
    Multiply,
    /// `a / b`, zero when `b == 0`
    Divide,
    /// `a ^ b`
    Power,
    /// `floor(a)`
    Floor,
    /// `ceil(a)`
    Ceil,
}

impl MathOp {
    /// Applies the operation.
    pub fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            MathOp::Add => a + b,
            MathOp::Subtract => a - b,
            MathOp::Multiply => a * b,
            MathOp::Divide => safe_divide(a, b),
            MathOp::Power => a.powf(b),
            MathOp::Floor => a.floor(),
            MathOp::Ceil => a.ceil(),
        }
    }
}

/// Component-wise vector operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorOp {
    /// `a + b`
    Add,
    /// `a * b`
    Multiply,
    /// `a / b`, zero per component where `b == 0`
    Divide,
}

impl VectorOp {
    /// Applies the operation per component.
    pub fn apply(self, a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        let f = |x: f32, y: f32| match self {
            VectorOp::Add => x + y,
            VectorOp::Multiply => x * y,
            VectorOp::Divide => safe_divide(x, y),
        };
        [f(a[0], b[0]), f(a[1], b[1]), f(a[2], b[2])]
    }
}

/// Texel filter of an image lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// Nearest pixel.
    Nearest,
    /// Bilinear between the four surrounding pixel centers.
    #[default]
    Bilinear,
}

/// Addressing outside the `[0, 1]` coordinate range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extension {
    /// Repeat the edge pixels.
    #[default]
    Extend,
    /// Transparent black outside the image.
    Clip,
}

/// A node operator with its parameters.
///
/// Port layout (inputs → outputs):
///
/// | operator | inputs | outputs |
/// |---|---|---|
/// | `GroupInput` | – | 0: color |
/// | `GroupOutput` | 0: color | – |
/// | `Value` | – | 0: float |
/// | `Math` | 0: a, 1: b | 0: float |
/// | `Clamp` | 0: value, 1: min, 2: max | 0: float |
/// | `VectorMath` | 0: a, 1: b | 0: vector |
/// | `SeparateXyz` | 0: vector | 0: x, 1: y, 2: z |
/// | `CombineXyz` | 0: x, 1: y, 2: z | 0: vector |
/// | `Image` | – | 0: image |
/// | `ImageInfo` | 0: image | 0: resolution vector `(w, h, 1)` |
/// | `MapUv` | 0: image, 1: uv vector | 0: color |
/// | `Mix` | 0: factor, 1: a, 2: b | 0: color |
/// | `ConvertColorSpace` | 0: color | 0: color |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Op {
    /// Color entering the group.
    GroupInput,
    /// Color leaving the group.
    GroupOutput,
    /// Constant.
    Value {
        /// Output value.
        value: f32,
    },
    /// Scalar math.
    Math {
        /// Operation.
        op: MathOp,
        /// Defaults for unlinked inputs `a` and `b`.
        defaults: [f32; 2],
    },
    /// Clamp a value into `[min, max]`.
    Clamp {
        /// Default lower bound.
        min: f32,
        /// Default upper bound.
        max: f32,
    },
    /// Vector math.
    VectorMath {
        /// Operation.
        op: VectorOp,
        /// Defaults for unlinked inputs `a` and `b`.
        defaults: [[f32; 3]; 2],
    },
    /// Split a vector into components.
    SeparateXyz,
    /// Join components into a vector.
    CombineXyz {
        /// Defaults for unlinked components.
        defaults: [f32; 3],
    },
    /// Reference to a texture resource.
    Image {
        /// Texture name.
        texture: String,
    },
    /// Resolution of an image.
    ImageInfo,
    /// Texture lookup at normalized coordinates.
    MapUv {
        /// Texel filter.
        filter: Filter,
        /// Edge addressing.
        extension: Extension,
    },
    /// Linear blend `a + (b - a) * factor`.
    Mix {
        /// Clamp the factor to `[0, 1]`.
        clamp_factor: bool,
    },
    /// Color space conversion.
    ConvertColorSpace {
        /// Source space.
        from: String,
        /// Target space.
        to: String,
    },
}

impl Op {
    /// Number of input ports.
    pub fn inputs(&self) -> usize {
        match self {
            Op::GroupInput | Op::Value { .. } | Op::Image { .. } => 0,
            Op::GroupOutput
            | Op::SeparateXyz
            | Op::ImageInfo
            | Op::ConvertColorSpace { .. } => 1,
            Op::Math { .. } | Op::VectorMath { .. } | Op::MapUv { .. } => 2,
            Op::Clamp { .. } | Op::CombineXyz { .. } | Op::Mix { .. } => 3,
        }
    }

    /// Number of output ports.
    pub fn outputs(&self) -> usize {
        match self {
            Op::GroupOutput => 0,
            Op::SeparateXyz => 3,
            _ => 1,
        }
    }
}

#[inline]
fn safe_divide(a: f32, b: f32) -> f32 {
    if b == 0.0 { 0.0 } else { a / b }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn math_ops() {
        assert_eq!(MathOp::Subtract.apply(33.0, 1.0), 32.0);
        assert_eq!(MathOp::Power.apply(17.0, 2.0), 289.0);
        assert_eq!(MathOp::Floor.apply(2.7, 0.5), 2.0);
        assert_eq!(MathOp::Ceil.apply(2.2, 0.5), 3.0);
        assert_eq!(MathOp::Divide.apply(1.0, 0.0), 0.0);
    }

    #[test]
    fn vector_ops() {
        assert_eq!(
            VectorOp::Divide.apply([0.5, 0.5, 0.5], [4.0, 2.0, 0.0]),
            [0.125, 0.25, 0.0]
        );
        assert_eq!(
            VectorOp::Multiply.apply([0.5, 0.25, 1.0], [2.0, 2.0, 2.0]),
            [1.0, 0.5, 2.0]
        );
    }

    #[test]
    fn port_counts() {
        assert_eq!(Op::SeparateXyz.outputs(), 3);
        assert_eq!(Op::GroupOutput.outputs(), 0);
        assert_eq!(Op::Clamp { min: 0.0, max: 1.0 }.inputs(), 3);
        assert_eq!(Op::Image { texture: "t".into() }.inputs(), 0);
    }
}
