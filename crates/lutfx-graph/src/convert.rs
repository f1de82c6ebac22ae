//! Color space conversion used by `ConvertColorSpace` nodes.

use crate::GraphResult;

/// Converts RGB triples between named color spaces.
///
/// The graph only records space names; what they mean is up to the host.
/// Implementations must be pure so graphs stay safe to evaluate in parallel.
pub trait ColorSpaceConverter: Send + Sync {
    /// Converts `rgb` from `from` to `to`.
    fn convert(&self, rgb: [f32; 3], from: &str, to: &str) -> GraphResult<[f32; 3]>;
}

/// Treats every conversion as the identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughConverter;

impl ColorSpaceConverter for PassthroughConverter {
    #[inline]
    fn convert(&self, rgb: [f32; 3], _from: &str, _to: &str) -> GraphResult<[f32; 3]> {
        Ok(rgb)
    }
}
