//! Adjustment effect to `.cube` export.

use std::ops::ControlFlow;
use std::path::Path;

use lutfx_lut::{cube, CubeHeader, Lut3D};
use tracing::info;

use crate::{EffectHost, HostError, HostResult, Progress, Sampler, DEFAULT_SIZE};

/// Title written to exported files.
pub const EXPORT_TITLE: &str = "Generated by lutfx";

/// Export settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Samples per axis.
    pub size: usize,
    /// `TITLE` line.
    pub title: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            title: EXPORT_TITLE.into(),
        }
    }
}

impl ExportOptions {
    /// Default options with another grid size.
    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }
}

/// Samples the active adjustment effect into a LUT.
///
/// Fails with [`HostError::Precondition`] before any rendering when no
/// adjustment effect is selected. The evaluation context is dropped before
/// this returns, whether sampling succeeded, failed or was cancelled.
pub fn sample_active<H, F>(host: &mut H, size: usize, progress: F) -> HostResult<Lut3D>
where
    H: EffectHost + ?Sized,
    F: FnMut(Progress) -> ControlFlow<()>,
{
    let effect = host
        .active_adjustment()
        .ok_or_else(|| HostError::Precondition("an adjustment layer needs to be selected".into()))?;
    let sampler = Sampler::new(size)?;

    let mut ctx = host.open_evaluation(effect)?;
    sampler.sample(&mut *ctx, progress)
}

/// Header written in front of exported samples.
pub fn export_header<H: EffectHost + ?Sized>(host: &H, title: &str) -> CubeHeader {
    CubeHeader::titled(title)
        .comment(format!("lutfx {}", env!("CARGO_PKG_VERSION")))
        .comment(format!("Expected input color profile: {}", host.scene_linear()))
}

/// Exports the active adjustment effect to a `.cube` file.
///
/// The file is only created once every sample has been rendered.
pub fn export_cube<H, F>(host: &mut H, path: &Path, options: &ExportOptions, progress: F) -> HostResult<Lut3D>
where
    H: EffectHost + ?Sized,
    F: FnMut(Progress) -> ControlFlow<()>,
{
    let lut = sample_active(host, options.size, progress)?;
    cube::write(path, &lut, &export_header(host, &options.title))?;
    info!(path = %path.display(), size = lut.size(), "exported LUT");
    Ok(lut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FailPoint, SoftwareHost};

    fn keep_going(_: Progress) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    #[test]
    fn writes_header_and_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.cube");
        let mut host = SoftwareHost::default();
        host.add_adjustment("gain", |rgb| rgb.map(|c| c * 0.5));

        export_cube(&mut host, &path, &ExportOptions::with_size(2), keep_going).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "TITLE \"Generated by lutfx\"");
        assert!(lines[1].starts_with("# lutfx "));
        assert_eq!(lines[2], "# Expected input color profile: Linear Rec.709");
        assert_eq!(lines[3], "LUT_3D_SIZE 2");
        assert_eq!(lines[4], "0.000000 0.000000 0.000000");
        assert_eq!(lines[5], "0.500000 0.000000 0.000000");
        assert_eq!(lines.len(), 4 + 8);
        assert_eq!(host.open_contexts(), 0);
    }

    #[test]
    fn requires_selected_adjustment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.cube");
        let mut host = SoftwareHost::default();
        let effect = host.add_adjustment("id", |rgb| rgb);
        host.select(None);

        let result = export_cube(&mut host, &path, &ExportOptions::default(), keep_going);
        assert!(matches!(result, Err(HostError::Precondition(_))));
        assert!(!path.exists());

        host.select(Some(effect));
        assert!(export_cube(&mut host, &path, &ExportOptions::with_size(2), keep_going).is_ok());
    }

    #[test]
    fn failure_releases_context_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.cube");
        let mut host = SoftwareHost::default();
        host.add_adjustment("id", |rgb| rgb);
        host.fail_at(FailPoint::Evaluate(4));

        let result = export_cube(&mut host, &path, &ExportOptions::with_size(3), keep_going);
        assert!(matches!(result, Err(HostError::Resource(_))));
        assert_eq!(host.open_contexts(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn cancel_releases_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.cube");
        let mut host = SoftwareHost::default();
        host.add_adjustment("id", |rgb| rgb);

        let result = export_cube(&mut host, &path, &ExportOptions::with_size(3), |p| {
            if p.done >= 10 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
        });
        assert!(matches!(result, Err(HostError::Cancelled)));
        assert_eq!(host.open_contexts(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.cube");
        let mut host = SoftwareHost::default();
        host.add_adjustment("id", |rgb| rgb);

        let result = export_cube(&mut host, &path, &ExportOptions::with_size(2), keep_going);
        assert!(matches!(result, Err(HostError::Io(_))));
    }
}
