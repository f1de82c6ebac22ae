//! Linear sample index <-> grid coordinate mapping.
//!
//! Every LUT in this workspace uses the same ordering: red varies fastest,
//! then green, then blue. This matches the data order of `.cube` files, the
//! order in which the sampler visits input colors, and the atlas layout.
//!
//! ```text
//! x = i mod N
//! y = (i div N) mod N
//! z = (i div N²) mod N
//! i = x + y·N + z·N²
//! ```

/// Largest supported number of samples per axis.
///
/// Matches the upper bound of the `.cube` format and keeps `size^3` well
/// inside `usize` on every target.
pub const MAX_SIZE: usize = 256;

/// Integer position of a sample inside an `N×N×N` grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCoord {
    /// Red axis (fastest varying).
    pub x: usize,
    /// Green axis.
    pub y: usize,
    /// Blue axis (slowest varying).
    pub z: usize,
}

/// Bijection between linear sample indices and grid coordinates for one resolution.
///
/// # Example
///
/// ```rust
/// use lutfx_lut::GridIndex;
///
/// let grid = GridIndex::new(3);
/// let c = grid.coord(5);
/// assert_eq!((c.x, c.y, c.z), (2, 1, 0));
/// assert_eq!(grid.index(c), 5);
/// assert_eq!(grid.color(5), [1.0, 0.5, 0.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridIndex {
    size: usize,
}

impl GridIndex {
    /// Creates the mapping for a cube of `size` samples per axis.
    ///
    /// Sizes below 2 are accepted here; [`color`](Self::color) divides by
    /// `size - 1`, so callers validate the size before producing colors.
    #[inline]
    pub const fn new(size: usize) -> Self {
        Self { size }
    }

    /// Samples per axis.
    #[inline]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Total number of samples (`size^3`), saturating at `usize::MAX`.
    #[inline]
    pub const fn len(&self) -> usize {
        self.size.saturating_pow(3)
    }

    /// Returns true for a zero-sized grid.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Grid coordinate of a linear index.
    #[inline]
    pub const fn coord(&self, index: usize) -> GridCoord {
        let n = self.size;
        GridCoord {
            x: index % n,
            y: (index / n) % n,
            z: (index / (n * n)) % n,
        }
    }

    /// Linear index of a grid coordinate.
    #[inline]
    pub const fn index(&self, coord: GridCoord) -> usize {
        coord.x + coord.y * self.size + coord.z * self.size * self.size
    }

    /// Normalized input color of a linear index, each channel in `[0, 1]`.
    #[inline]
    pub fn color(&self, index: usize) -> [f32; 3] {
        let c = self.coord(index);
        let max = (self.size - 1) as f32;
        [c.x as f32 / max, c.y as f32 / max, c.z as f32 / max]
    }

    /// Iterates over the normalized input colors in index order.
    pub fn colors(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        (0..self.len()).map(move |i| self.color(i))
    }
}
