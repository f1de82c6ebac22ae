//! # lutfx-host
//!
//! Export and import pipelines between 3D LUT files and a video editor's
//! adjustment-layer effects.
//!
//! The host itself is reached only through two traits:
//!
//! - [`EvaluationContext`] - render one color through an effect
//! - [`EffectHost`] - query the document and create or remove resources
//!
//! # Pipelines
//!
//! - [`export_cube`] - sample the selected adjustment effect on an `N×N×N`
//!   grid with a [`Sampler`] and write a `.cube` file
//! - [`import_cube`] - parse a `.cube` file, pack it into an atlas texture,
//!   build the lookup node graph and attach it to a new adjustment effect,
//!   rolling back on failure
//!
//! [`SoftwareHost`] implements both traits in memory.
//!
//! # Example
//!
//! ```rust
//! use std::ops::ControlFlow;
//! use lutfx_host::{export_cube, ExportOptions, SoftwareHost};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("warm.cube");
//!
//! let mut host = SoftwareHost::default();
//! host.add_adjustment("warm", |[r, g, b]| [r * 1.1, g, b * 0.9]);
//! let lut = export_cube(&mut host, &path, &ExportOptions::with_size(9), |_| {
//!     ControlFlow::Continue(())
//! })
//! .unwrap();
//! assert_eq!(lut.size(), 9);
//! ```
//!
//! # Dependencies
//!
//! - [`lutfx_lut`] - LUT, `.cube` and atlas types
//! - [`lutfx_graph`] - Lookup graph construction and evaluation
//! - [`lutfx_ocio`] - Scene-linear name for the software host
//! - [`thiserror`] - Error handling
//! - [`tracing`] - Progress and diagnostics
//!
//! # Used By
//!
//! - `lutfx-cli` - `resample` command
//! - `lutfx-tests` - Round-trip scenarios

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod convert;
mod error;
mod export;
mod host;
mod import;
mod sampler;
mod software;

pub use convert::{srgb_eotf, srgb_oetf, BuiltinConverter, Encoding};
pub use error::{HostError, HostResult};
pub use export::{export_cube, export_header, sample_active, ExportOptions, EXPORT_TITLE};
pub use host::{AdjustmentSpec, EffectHandle, EffectHost, EvaluationContext, GroupHandle, TextureHandle};
pub use import::{import_cube, install_lut, unique_name, ImportOptions, ImportTransaction, ImportedLut};
pub use sampler::{Progress, Sampler, DEFAULT_SIZE};
pub use software::{FailPoint, SoftwareHost, Transform};
