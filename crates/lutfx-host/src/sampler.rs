//! Grid sampler.
//!
//! Renders every color of an `N×N×N` grid through an [`EvaluationContext`]
//! and collects the results into a [`Lut3D`]. Input colors come from
//! [`GridIndex`], so the samples are in `.cube` order.
//!
//! # Example
//!
//! ```rust
//! use std::ops::ControlFlow;
//! use lutfx_host::{EvaluationContext, HostResult, Sampler};
//!
//! struct Invert;
//! impl EvaluationContext for Invert {
//!     fn evaluate(&mut self, rgb: [f32; 3]) -> HostResult<[f32; 3]> {
//!         Ok(rgb.map(|c| 1.0 - c))
//!     }
//! }
//!
//! let lut = Sampler::new(3).unwrap()
//!     .sample(&mut Invert, |_| ControlFlow::Continue(()))
//!     .unwrap();
//! assert_eq!(lut.samples()[0], [1.0, 1.0, 1.0]);
//! ```

use std::ops::ControlFlow;

use lutfx_lut::{GridIndex, Lut3D, LutError, MAX_SIZE};
use tracing::debug;

use crate::{EvaluationContext, HostError, HostResult};

/// Default grid resolution.
pub const DEFAULT_SIZE: usize = 33;

/// Progress of a sampling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Samples evaluated so far.
    pub done: usize,
    /// Total samples.
    pub total: usize,
}

impl Progress {
    /// Completed fraction in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.done as f32 / self.total as f32
        }
    }
}

/// Samples an evaluator on a uniform grid.
#[derive(Debug, Clone, Copy)]
pub struct Sampler {
    grid: GridIndex,
}

impl Default for Sampler {
    fn default() -> Self {
        Self {
            grid: GridIndex::new(DEFAULT_SIZE),
        }
    }
}

impl Sampler {
    /// Creates a sampler for `size` samples per axis, between 2 and [`MAX_SIZE`].
    pub fn new(size: usize) -> HostResult<Self> {
        if !(2..=MAX_SIZE).contains(&size) {
            return Err(LutError::InvalidSize(size).into());
        }
        Ok(Self {
            grid: GridIndex::new(size),
        })
    }

    /// Samples per axis.
    pub fn size(&self) -> usize {
        self.grid.size()
    }

    /// Evaluates every grid color in order.
    ///
    /// `progress` is called after each sample with a strictly increasing
    /// `done` count; returning [`ControlFlow::Break`] stops sampling with
    /// [`HostError::Cancelled`].
    pub fn sample<F>(&self, ctx: &mut dyn EvaluationContext, mut progress: F) -> HostResult<Lut3D>
    where
        F: FnMut(Progress) -> ControlFlow<()>,
    {
        let total = self.grid.len();
        let step = (total / 20).max(1);
        let mut samples = Vec::with_capacity(total);

        for (i, rgb) in self.grid.colors().enumerate() {
            samples.push(ctx.evaluate(rgb)?);

            let done = i + 1;
            if done % step == 0 || done == total {
                debug!(done, total, "sampling");
            }
            if progress(Progress { done, total }).is_break() {
                debug!(done, total, "sampling cancelled");
                return Err(HostError::Cancelled);
            }
        }

        Ok(Lut3D::from_samples(self.size(), samples)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        inputs: Vec<[f32; 3]>,
        fail_at: Option<usize>,
    }

    impl EvaluationContext for Recorder {
        fn evaluate(&mut self, rgb: [f32; 3]) -> HostResult<[f32; 3]> {
            if self.fail_at == Some(self.inputs.len()) {
                return Err(HostError::Resource("render failed".into()));
            }
            self.inputs.push(rgb);
            Ok([rgb[2], rgb[1], rgb[0]])
        }
    }

    fn recorder() -> Recorder {
        Recorder {
            inputs: Vec::new(),
            fail_at: None,
        }
    }

    #[test]
    fn samples_in_grid_order() {
        let mut ctx = recorder();
        let lut = Sampler::new(3).unwrap().sample(&mut ctx, |_| ControlFlow::Continue(())).unwrap();

        assert_eq!(ctx.inputs.len(), 27);
        assert_eq!(ctx.inputs[1], [0.5, 0.0, 0.0]);
        assert_eq!(ctx.inputs[3], [0.0, 0.5, 0.0]);
        assert_eq!(ctx.inputs[9], [0.0, 0.0, 0.5]);
        assert_eq!(lut.size(), 3);
        assert_eq!(lut.samples()[1], [0.0, 0.0, 0.5]);
    }

    #[test]
    fn progress_is_monotonic() {
        let mut seen = Vec::new();
        Sampler::new(2)
            .unwrap()
            .sample(&mut recorder(), |p| {
                seen.push(p);
                ControlFlow::Continue(())
            })
            .unwrap();
        let done: Vec<_> = seen.iter().map(|p| p.done).collect();
        assert_eq!(done, (1..=8).collect::<Vec<_>>());
        assert!(seen.iter().all(|p| p.total == 8));
        assert_eq!(seen[7].fraction(), 1.0);
    }

    #[test]
    fn cancel_stops_sampling() {
        let mut ctx = recorder();
        let result = Sampler::new(4).unwrap().sample(&mut ctx, |p| {
            if p.done == 5 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
        });
        assert!(matches!(result, Err(HostError::Cancelled)));
        assert_eq!(ctx.inputs.len(), 5);
    }

    #[test]
    fn evaluator_error_propagates() {
        let mut ctx = Recorder {
            inputs: Vec::new(),
            fail_at: Some(3),
        };
        let result = Sampler::new(2).unwrap().sample(&mut ctx, |_| ControlFlow::Continue(()));
        assert!(matches!(result, Err(HostError::Resource(_))));
    }

    #[test]
    fn rejects_out_of_range_grids() {
        assert!(matches!(
            Sampler::new(1),
            Err(HostError::Lut(LutError::InvalidSize(1)))
        ));
        assert!(matches!(
            Sampler::new(3_000_000),
            Err(HostError::Lut(LutError::InvalidSize(3_000_000)))
        ));
        assert!(Sampler::new(MAX_SIZE).is_ok());
        assert_eq!(Sampler::default().size(), DEFAULT_SIZE);
    }
}
