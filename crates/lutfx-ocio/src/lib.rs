//! # lutfx-ocio
//!
//! Minimal OpenColorIO config reader.
//!
//! Answers the two questions the LUT pipelines ask of a color-managed host:
//! which color space is the scene-linear working space, and which color
//! spaces exist. The config is located via an explicit path, the `OCIO`
//! environment variable, or falls back to built-in defaults.
//!
//! # Dependencies
//!
//! - [`serde_yaml`] - Config parsing
//! - [`thiserror`] - Error handling
//! - [`tracing`] - Diagnostics
//!
//! # Used By
//!
//! - `lutfx-host` - Scene-linear name for the software host
//! - `lutfx-cli` - `--config` handling and the `colorspaces` command

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod config;
mod error;

pub use config::{to_front, ColorConfig, DEFAULT_SCENE_LINEAR, ENV_VAR, SCENE_LINEAR_ROLE};
pub use error::{OcioError, OcioResult};
