//! 3-dimensional lookup table.
//!
//! A 3D LUT maps RGB input to RGB output through a cube of color values
//! sampled on a uniform grid over the unit RGB cube.

use crate::{GridCoord, GridIndex, LutError, LutResult, MAX_SIZE};

/// A 3-dimensional lookup table.
///
/// # Structure
///
/// - `size^3` entries, each an RGB output value
/// - Stored in [`GridIndex`] order: R varies fastest, then G, then B
/// - Immutable once built
///
/// # Example
///
/// ```rust
/// use lutfx_lut::Lut3D;
///
/// let lut = Lut3D::identity(33).unwrap();
/// let output = lut.apply([0.5, 0.3, 0.2]);
/// assert!((output[1] - 0.3).abs() < 1e-5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Lut3D {
    data: Vec<[f32; 3]>,
    size: usize,
    title: Option<String>,
}

impl Lut3D {
    /// Creates an identity (pass-through) 3D LUT.
    pub fn identity(size: usize) -> LutResult<Self> {
        Self::from_fn(size, |rgb| rgb)
    }

    /// Builds a LUT by evaluating `f` at every grid color in index order.
    pub fn from_fn<F>(size: usize, mut f: F) -> LutResult<Self>
    where
        F: FnMut([f32; 3]) -> [f32; 3],
    {
        validate_size(size)?;
        let grid = GridIndex::new(size);
        let data = grid.colors().map(&mut f).collect();
        Ok(Self {
            data,
            size,
            title: None,
        })
    }

    /// Creates a 3D LUT from samples in grid order.
    ///
    /// Fails unless `2 <= size <= MAX_SIZE` and exactly `size^3` samples are given.
    pub fn from_samples(size: usize, data: Vec<[f32; 3]>) -> LutResult<Self> {
        validate_size(size)?;
        let expected = GridIndex::new(size).len();
        if data.len() != expected {
            return Err(LutError::SampleCount {
                size,
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            data,
            size,
            title: None,
        })
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Samples per axis.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Title from the `.cube` header, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Samples in grid order.
    #[inline]
    pub fn samples(&self) -> &[[f32; 3]] {
        &self.data
    }

    /// Index mapping for this LUT's resolution.
    #[inline]
    pub fn grid(&self) -> GridIndex {
        GridIndex::new(self.size)
    }

    /// Gets the value at a grid position.
    #[inline]
    pub fn get(&self, coord: GridCoord) -> [f32; 3] {
        self.data[self.grid().index(coord)]
    }

    /// Applies the LUT to an RGB value with trilinear interpolation.
    ///
    /// Input is clamped to the unit cube.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let n = (self.size - 1) as f32;
        let last = self.size - 2;

        let mut base = [0usize; 3];
        let mut frac = [0.0f32; 3];
        for i in 0..3 {
            let p = rgb[i].clamp(0.0, 1.0) * n;
            base[i] = (p.floor() as usize).min(last);
            frac[i] = p - base[i] as f32;
        }
        let [ri, gi, bi] = base;
        let [rf, gf, bf] = frac;
        let at = |x, y, z| self.get(GridCoord { x, y, z });

        let c000 = at(ri, gi, bi);
        let c100 = at(ri + 1, gi, bi);
        let c010 = at(ri, gi + 1, bi);
        let c110 = at(ri + 1, gi + 1, bi);
        let c001 = at(ri, gi, bi + 1);
        let c101 = at(ri + 1, gi, bi + 1);
        let c011 = at(ri, gi + 1, bi + 1);
        let c111 = at(ri + 1, gi + 1, bi + 1);

        let mut result = [0.0f32; 3];
        for i in 0..3 {
            let c00 = c000[i] * (1.0 - rf) + c100[i] * rf;
            let c01 = c001[i] * (1.0 - rf) + c101[i] * rf;
            let c10 = c010[i] * (1.0 - rf) + c110[i] * rf;
            let c11 = c011[i] * (1.0 - rf) + c111[i] * rf;

            let c0 = c00 * (1.0 - gf) + c10 * gf;
            let c1 = c01 * (1.0 - gf) + c11 * gf;

            result[i] = c0 * (1.0 - bf) + c1 * bf;
        }
        result
    }
}

fn validate_size(size: usize) -> LutResult<()> {
    if !(2..=MAX_SIZE).contains(&size) {
        return Err(LutError::InvalidSize(size));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn identity_passes_through() {
        let lut = Lut3D::identity(17).unwrap();
        let result = lut.apply([0.5, 0.3, 0.8]);
        assert_abs_diff_eq!(result[0], 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(result[1], 0.3, epsilon = 1e-5);
        assert_abs_diff_eq!(result[2], 0.8, epsilon = 1e-5);
    }

    #[test]
    fn corners_are_exact() {
        let lut = Lut3D::from_fn(5, |[r, g, b]| [1.0 - r, g * 0.5, b * b]).unwrap();
        assert_eq!(lut.apply([0.0, 0.0, 0.0]), [1.0, 0.0, 0.0]);
        assert_eq!(lut.apply([1.0, 1.0, 1.0]), [0.0, 0.5, 1.0]);
        assert_eq!(lut.apply([2.0, -1.0, 1.0]), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn from_samples_checks_count() {
        let err = Lut3D::from_samples(2, vec![[0.0; 3]; 7]).unwrap_err();
        assert!(matches!(
            err,
            LutError::SampleCount {
                size: 2,
                expected: 8,
                found: 7
            }
        ));
        assert!(matches!(
            Lut3D::from_samples(1, vec![[0.0; 3]]),
            Err(LutError::InvalidSize(1))
        ));
        assert!(matches!(
            Lut3D::from_samples(usize::MAX, Vec::new()),
            Err(LutError::InvalidSize(usize::MAX))
        ));
        assert!(matches!(
            Lut3D::from_fn(MAX_SIZE + 1, |rgb| rgb),
            Err(LutError::InvalidSize(_))
        ));
    }

    #[test]
    fn uniform_lut_is_constant() {
        let lut = Lut3D::from_samples(2, vec![[0.25, 0.5, 0.75]; 8]).unwrap();
        assert_eq!(lut.apply([0.4, 0.6, 0.1]), [0.25, 0.5, 0.75]);
    }
}
