//! Built-in color space conversions for the software host.
//!
//! Understands three encodings: scene-linear, sRGB-encoded and non-color
//! data. Primaries are never converted; every supported space is assumed to
//! share the scene-linear primaries.

use lutfx_graph::{ColorSpaceConverter, GraphError, GraphResult};

/// Transfer encoding of a named color space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Scene-linear light.
    Linear,
    /// sRGB piecewise transfer function.
    Srgb,
    /// Non-color data, passed through unchanged.
    Data,
}

/// sRGB EOTF: encoded to linear.
#[inline]
pub fn srgb_eotf(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB OETF: linear to encoded.
#[inline]
pub fn srgb_oetf(l: f32) -> f32 {
    if l <= 0.003_130_8 {
        l * 12.92
    } else {
        1.055 * l.powf(1.0 / 2.4) - 0.055
    }
}

/// Converter that knows the host's scene-linear name and a few common aliases.
#[derive(Debug, Clone)]
pub struct BuiltinConverter {
    scene_linear: String,
}

impl BuiltinConverter {
    /// Creates a converter treating `scene_linear` as linear light.
    pub fn new(scene_linear: impl Into<String>) -> Self {
        Self {
            scene_linear: scene_linear.into(),
        }
    }

    /// Encoding of `name`, if known.
    pub fn encoding(&self, name: &str) -> Option<Encoding> {
        if name == self.scene_linear {
            return Some(Encoding::Linear);
        }
        match name.to_ascii_lowercase().as_str() {
            "linear" | "linear rec.709" | "scene_linear" | "lin_rec709" => Some(Encoding::Linear),
            "srgb" | "srgb - texture" | "srgb_tx" => Some(Encoding::Srgb),
            "non-color" | "raw" | "data" => Some(Encoding::Data),
            _ => None,
        }
    }
}

impl ColorSpaceConverter for BuiltinConverter {
    fn convert(&self, rgb: [f32; 3], from: &str, to: &str) -> GraphResult<[f32; 3]> {
        if from == to {
            return Ok(rgb);
        }
        let unsupported = || GraphError::UnsupportedConversion {
            from: from.to_string(),
            to: to.to_string(),
        };
        let src = self.encoding(from).ok_or_else(unsupported)?;
        let dst = self.encoding(to).ok_or_else(unsupported)?;

        Ok(match (src, dst) {
            (Encoding::Linear, Encoding::Srgb) => rgb.map(srgb_oetf),
            (Encoding::Srgb, Encoding::Linear) => rgb.map(srgb_eotf),
            _ => rgb,
        })
    }
}
