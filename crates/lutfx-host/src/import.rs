//! `.cube` to adjustment effect import.
//!
//! Import validates the whole file before touching the host, then creates
//! the effect, the atlas texture and the lookup node group inside an
//! [`ImportTransaction`]. If any step fails, everything created so far is
//! removed again in reverse order.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use lutfx_graph::{build_lut_graph, LutGraphParams, NodeGraph};
use lutfx_lut::{cube, Atlas, Lut3D};
use tracing::{debug, info, warn};

use crate::{AdjustmentSpec, EffectHandle, EffectHost, GroupHandle, HostError, HostResult, TextureHandle};

/// Import settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Color space the LUT expects; the host's scene-linear space when `None`.
    pub color_space: Option<String>,
    /// Placement of the created adjustment effect.
    pub adjustment: AdjustmentSpec,
}

/// Resources created by a successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedLut {
    /// Unique name shared by the texture and node group.
    pub name: String,
    /// Title from the file, if any.
    pub title: Option<String>,
    /// LUT samples per axis.
    pub size: usize,
    /// Color space the lookup runs in.
    pub color_space: String,
    /// Created adjustment effect.
    pub effect: EffectHandle,
    /// Created atlas texture.
    pub texture: TextureHandle,
    /// Created node group.
    pub group: GroupHandle,
}

#[derive(Debug, Clone, Copy)]
enum Created {
    Effect(EffectHandle),
    Texture(TextureHandle),
    Group(GroupHandle),
}

/// Host resources created during one import.
///
/// Dropping an uncommitted transaction removes every resource it created,
/// newest first.
pub struct ImportTransaction<'h, H: EffectHost + ?Sized> {
    host: &'h mut H,
    created: Vec<Created>,
    committed: bool,
}

impl<'h, H: EffectHost + ?Sized> ImportTransaction<'h, H> {
    /// Starts a transaction on `host`.
    pub fn new(host: &'h mut H) -> Self {
        Self {
            host,
            created: Vec::new(),
            committed: false,
        }
    }

    /// Creates an adjustment effect.
    pub fn create_adjustment(&mut self, spec: &AdjustmentSpec) -> HostResult<EffectHandle> {
        let effect = self.host.create_adjustment(spec)?;
        self.created.push(Created::Effect(effect));
        Ok(effect)
    }

    /// Creates a texture.
    pub fn create_texture(&mut self, name: &str, atlas: &Atlas) -> HostResult<TextureHandle> {
        let texture = self.host.create_texture(name, atlas)?;
        self.created.push(Created::Texture(texture));
        Ok(texture)
    }

    /// Creates a node group.
    pub fn create_node_group(&mut self, graph: &NodeGraph) -> HostResult<GroupHandle> {
        let group = self.host.create_node_group(graph)?;
        self.created.push(Created::Group(group));
        Ok(group)
    }

    /// Attaches a node group to an effect.
    pub fn attach_node_group(&mut self, effect: EffectHandle, group: GroupHandle) -> HostResult<()> {
        self.host.attach_node_group(effect, group)
    }

    /// Keeps the created resources.
    pub fn commit(mut self) {
        self.committed = true;
    }

    fn rollback(&mut self) {
        while let Some(resource) = self.created.pop() {
            let result = match resource {
                Created::Effect(h) => self.host.remove_adjustment(h),
                Created::Texture(h) => self.host.remove_texture(h),
                Created::Group(h) => self.host.remove_node_group(h),
            };
            match result {
                Ok(()) => debug!(?resource, "rolled back"),
                Err(e) => warn!(?resource, error = %e, "rollback failed"),
            }
        }
    }
}

impl<H: EffectHost + ?Sized> Drop for ImportTransaction<'_, H> {
    fn drop(&mut self) {
        if !self.committed {
            self.rollback();
        }
    }
}

static LAST_STAMP: AtomicU64 = AtomicU64::new(0);

/// Resource name derived from a file stem and the current time in milliseconds.
///
/// Stamps are strictly increasing within the process, so two imports in the
/// same millisecond still get distinct names.
pub fn unique_name(stem: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    let prev = LAST_STAMP
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| Some(now.max(last + 1)))
        .unwrap_or_else(|last| last);
    format!("{stem}_{}", now.max(prev + 1))
}

/// Imports a `.cube` file as a new adjustment effect.
///
/// Fails with [`HostError::Precondition`] when no document is open, and
/// with [`HostError::Lut`] when the file is malformed or incomplete; in
/// both cases the host is left untouched.
pub fn import_cube<H>(host: &mut H, path: &Path, options: &ImportOptions) -> HostResult<ImportedLut>
where
    H: EffectHost + ?Sized,
{
    if !host.has_document() {
        return Err(HostError::Precondition("no active sequencer document".into()));
    }

    let file = cube::read(path)?;
    if file.skipped > 0 {
        warn!(path = %path.display(), skipped = file.skipped, "skipped malformed lines");
    }
    let lut = file.into_lut()?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("lut");
    let imported = install_lut(host, &lut, &unique_name(stem), options)?;
    info!(
        path = %path.display(),
        name = %imported.name,
        size = imported.size,
        color_space = %imported.color_space,
        "imported LUT"
    );
    Ok(imported)
}

/// Installs an in-memory LUT as a new adjustment effect named `name`.
pub fn install_lut<H>(host: &mut H, lut: &Lut3D, name: &str, options: &ImportOptions) -> HostResult<ImportedLut>
where
    H: EffectHost + ?Sized,
{
    if !host.has_document() {
        return Err(HostError::Precondition("no active sequencer document".into()));
    }

    let working_space = host.scene_linear();
    let color_space = match &options.color_space {
        Some(cs) => {
            if !host.color_spaces().iter().any(|known| known == cs) {
                return Err(HostError::Precondition(format!("unknown color space '{cs}'")));
            }
            cs.clone()
        }
        None => working_space.clone(),
    };

    let atlas = Atlas::from_lut(lut);
    let graph = build_lut_graph(&LutGraphParams {
        name: name.to_string(),
        size: lut.size(),
        texture: name.to_string(),
        lut_space: color_space.clone(),
        working_space,
    });

    let mut tx = ImportTransaction::new(host);
    let effect = tx.create_adjustment(&options.adjustment)?;
    let texture = tx.create_texture(name, &atlas)?;
    let group = tx.create_node_group(&graph)?;
    tx.attach_node_group(effect, group)?;
    tx.commit();

    Ok(ImportedLut {
        name: name.to_string(),
        title: lut.title().map(str::to_string),
        size: lut.size(),
        color_space,
        effect,
        texture,
        group,
    })
}
