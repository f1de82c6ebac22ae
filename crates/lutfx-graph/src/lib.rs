//! # lutfx-graph
//!
//! Declarative node graphs for applying a 3D LUT inside a 2D compositor.
//!
//! Hosts that cannot sample 3D textures get the LUT as an [`Atlas`](lutfx_lut::Atlas)
//! and a fixed graph of pure operators that reconstructs the trilinear lookup
//! from two bilinear atlas lookups and one blend.
//!
//! # Contents
//!
//! - [`NodeGraph`] - nodes, links, validation and topological order
//! - [`Op`] - operator set and port layout
//! - [`build_lut_graph`] - the lookup graph, parameterized by size and color spaces
//! - [`GraphInterpreter`] - reference evaluator used by software hosts and tests
//!
//! # Usage
//!
//! ```rust
//! use std::collections::HashMap;
//! use lutfx_graph::{build_lut_graph, GraphInterpreter, LutGraphParams, PassthroughConverter};
//! use lutfx_lut::{Atlas, Lut3D};
//!
//! let lut = Lut3D::identity(17).unwrap();
//! let graph = build_lut_graph(&LutGraphParams {
//!     name: "identity".into(),
//!     size: 17,
//!     texture: "atlas".into(),
//!     lut_space: "Linear".into(),
//!     working_space: "Linear".into(),
//! });
//! let textures = HashMap::from([("atlas".to_string(), Atlas::from_lut(&lut))]);
//! let interp = GraphInterpreter::new(&graph, &textures, &PassthroughConverter).unwrap();
//! let out = interp.evaluate_rgb([0.25, 0.5, 0.75]).unwrap();
//! assert!((out[1] - 0.5).abs() < 1e-5);
//! ```
//!
//! # Dependencies
//!
//! - [`lutfx_lut`] - Atlas textures
//! - [`serde`] - Graph serialization
//! - [`thiserror`] - Error handling
//! - [`tracing`] - Build diagnostics
//!
//! # Used By
//!
//! - `lutfx-host` - Import pipeline and the software host
//! - `lutfx-cli` - Graph export and verification

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod builder;
mod convert;
mod error;
mod graph;
mod interp;
mod ops;

pub use builder::{build_lut_graph, ids, LutGraphParams};
pub use convert::{ColorSpaceConverter, PassthroughConverter};
pub use error::{GraphError, GraphResult};
pub use graph::{Link, Node, NodeGraph, NodeId, PortRef};
pub use interp::{GraphInterpreter, TextureSource};
pub use ops::{Extension, Filter, MathOp, Op, VectorOp};
