//! 2D texture atlas packing of a 3D LUT.
//!
//! Hosts that only offer 2D image sampling can still look up a 3D LUT if its
//! samples are tiled into a flat image. The atlas is `N²` pixels wide and `N`
//! pixels tall, RGBA `f32`:
//!
//! ```text
//! row z:  [ tile y=0: x=0..N ][ tile y=1: x=0..N ] ... [ tile y=N-1 ]
//! ```
//!
//! Sample `(x, y, z)` is stored at linear pixel `z·N² + y·N + x`, i.e. image
//! column `y·N + x`, image row `z`. Each row is the `N×N` slice of constant
//! blue; inside a row, tiles of `N` columns are indexed by green.
//!
//! The pixels are data, not color: hosts must not apply any color
//! management transform to an atlas.

use crate::{GridIndex, Lut3D};

/// Flat RGBA texture holding a LUT in tiled layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Atlas {
    size: usize,
    pixels: Vec<f32>,
}

impl Atlas {
    /// Channels per pixel.
    pub const CHANNELS: usize = 4;

    /// Packs a LUT into atlas layout.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lutfx_lut::{Atlas, Lut3D};
    ///
    /// let lut = Lut3D::identity(4).unwrap();
    /// let atlas = Atlas::from_lut(&lut);
    /// assert_eq!((atlas.width(), atlas.height()), (16, 4));
    /// // (x=1, y=2, z=3) lives in row 3, column 2*4 + 1
    /// assert_eq!(atlas.pixel(9, 3), [1.0 / 3.0, 2.0 / 3.0, 1.0, 1.0]);
    /// ```
    pub fn from_lut(lut: &Lut3D) -> Self {
        let size = lut.size();
        let grid = GridIndex::new(size);
        let mut pixels = vec![1.0f32; grid.len() * Self::CHANNELS];

        for (index, rgb) in lut.samples().iter().enumerate() {
            let c = grid.coord(index);
            let offset = (size * size * c.z + size * c.y + c.x) * Self::CHANNELS;
            pixels[offset..offset + 3].copy_from_slice(rgb);
            pixels[offset + 3] = 1.0;
        }

        Self { size, pixels }
    }

    /// Width in pixels (`N²`).
    #[inline]
    pub fn width(&self) -> usize {
        self.size * self.size
    }

    /// Height in pixels (`N`).
    #[inline]
    pub fn height(&self) -> usize {
        self.size
    }

    /// Interleaved RGBA pixel data, row-major, top row first.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.pixels
    }

    /// Reads one pixel.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the atlas.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [f32; 4] {
        assert!(x < self.width() && y < self.height(), "pixel ({}, {}) out of bounds", x, y);
        let i = (y * self.width() + x) * Self::CHANNELS;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Bilinear sample at normalized coordinates with extend addressing.
    ///
    /// `(0, 0)` is the top-left corner of the first pixel and `(1, 1)` the
    /// bottom-right corner of the last; pixel centers sit at half-pixel
    /// offsets. Coordinates outside the image repeat the edge pixels.
    pub fn sample_bilinear(&self, u: f32, v: f32) -> [f32; 4] {
        let w = self.width() as i64;
        let h = self.height() as i64;

        let px = u * w as f32 - 0.5;
        let py = v * h as f32 - 0.5;

        let x0f = px.floor();
        let y0f = py.floor();
        let fx = px - x0f;
        let fy = py - y0f;
        let x0 = x0f as i64;
        let y0 = y0f as i64;

        let fetch = |x: i64, y: i64| self.pixel(x.clamp(0, w - 1) as usize, y.clamp(0, h - 1) as usize);
        let c00 = fetch(x0, y0);
        let c10 = fetch(x0 + 1, y0);
        let c01 = fetch(x0, y0 + 1);
        let c11 = fetch(x0 + 1, y0 + 1);

        let mut result = [0.0f32; 4];
        for i in 0..4 {
            let top = c00[i] * (1.0 - fx) + c10[i] * fx;
            let bot = c01[i] * (1.0 - fx) + c11[i] * fx;
            result[i] = top * (1.0 - fy) + bot * fy;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn corners() -> Lut3D {
        Lut3D::from_samples(
            2,
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
                [1.0, 0.0, 1.0],
                [0.0, 1.0, 1.0],
                [1.0, 1.0, 1.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn corner_placement() {
        let lut = corners();
        let atlas = Atlas::from_lut(&lut);
        let s = lut.samples();
        let px = |i: usize| {
            let [r, g, b] = s[i];
            [r, g, b, 1.0]
        };

        assert_eq!(atlas.width(), 4);
        assert_eq!(atlas.height(), 2);

        // strip z=0 is the top row, tiles of 2 columns indexed by y
        assert_eq!(atlas.pixel(0, 0), px(0));
        assert_eq!(atlas.pixel(1, 0), px(1));
        assert_eq!(atlas.pixel(2, 0), px(2));
        assert_eq!(atlas.pixel(3, 0), px(3));
        // strip z=1 starts N² pixels later
        assert_eq!(atlas.pixel(0, 1), px(4));
        assert_eq!(atlas.pixel(1, 1), px(5));
        assert_eq!(atlas.pixel(2, 1), px(6));
        assert_eq!(atlas.pixel(3, 1), px(7));

        for (i, chunk) in atlas.data().chunks(4).enumerate() {
            assert_eq!(chunk, &px(i)[..]);
        }
    }

    #[test]
    fn alpha_is_opaque() {
        let lut = Lut3D::from_fn(3, |_| [0.2, 0.4, 0.6]).unwrap();
        let atlas = Atlas::from_lut(&lut);
        assert_eq!(atlas.data().len(), 27 * 4);
        assert!(atlas.data().chunks(4).all(|p| p == [0.2, 0.4, 0.6, 1.0]));
    }

    #[test]
    fn bilinear_hits_pixel_centers() {
        let lut = Lut3D::from_fn(3, |[r, g, b]| [r, g, b]).unwrap();
        let atlas = Atlas::from_lut(&lut);
        let (w, h) = (atlas.width() as f32, atlas.height() as f32);
        for y in 0..atlas.height() {
            for x in 0..atlas.width() {
                let u = (x as f32 + 0.5) / w;
                let v = (y as f32 + 0.5) / h;
                let sampled = atlas.sample_bilinear(u, v);
                let exact = atlas.pixel(x, y);
                for c in 0..4 {
                    assert_abs_diff_eq!(sampled[c], exact[c], epsilon = 1e-5);
                }
            }
        }
    }

    #[test]
    fn bilinear_extends_edges() {
        let atlas = Atlas::from_lut(&corners());
        assert_eq!(atlas.sample_bilinear(-1.0, -1.0), atlas.pixel(0, 0));
        assert_eq!(atlas.sample_bilinear(2.0, 2.0), atlas.pixel(3, 1));
        // halfway between the two rows
        let mid = atlas.sample_bilinear(0.125, 0.5);
        assert_abs_diff_eq!(mid[2], 0.5, epsilon = 1e-6);
    }
}
