//! # lutfx-lut
//!
//! 3D Look-Up Table types shared by the export and import pipelines.
//!
//! # Contents
//!
//! - [`GridIndex`] - linear sample index <-> grid coordinate bijection
//! - [`Lut3D`] - immutable `N×N×N` table of RGB samples with trilinear lookup
//! - [`cube`] - `.cube` reading (lenient) and writing
//! - [`Atlas`] - the LUT tiled into a 2D RGBA texture for hosts without 3D textures
//!
//! # Usage
//!
//! ```rust
//! use lutfx_lut::{Atlas, Lut3D, cube};
//! use std::io::Cursor;
//!
//! let text = "LUT_3D_SIZE 2\n".to_string() + &"0.5 0.5 0.5\n".repeat(8);
//! let lut = cube::parse(Cursor::new(text)).unwrap().into_lut().unwrap();
//! let atlas = Atlas::from_lut(&lut);
//! assert_eq!(atlas.width(), 4);
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - Error handling
//! - [`tracing`] - Diagnostics for skipped data lines
//!
//! # Used By
//!
//! - `lutfx-graph` - Atlas sampling in the reference interpreter
//! - `lutfx-host` - Export and import pipelines

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod atlas;
mod error;
mod grid;
mod lut3d;
pub mod cube;

pub use atlas::Atlas;
pub use cube::{CubeFile, CubeHeader};
pub use error::{LutError, LutResult};
pub use grid::{GridCoord, GridIndex, MAX_SIZE};
pub use lut3d::Lut3D;
