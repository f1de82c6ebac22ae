//! OCIO config reading.
//!
//! Only two things are read from a config: the `scene_linear` role and the
//! names of the declared color spaces. Everything else in the file is
//! ignored, so configs of any profile version are accepted.
//!
//! # Example
//!
//! ```rust
//! use lutfx_ocio::ColorConfig;
//!
//! let config = ColorConfig::from_yaml_str(
//!     "roles:\n  scene_linear: ACEScg\ncolorspaces:\n  - name: sRGB\n  - name: ACEScg\n",
//! ).unwrap();
//! assert_eq!(config.scene_linear(), "ACEScg");
//! assert_eq!(config.color_spaces(), vec!["ACEScg", "sRGB"]);
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, warn};

use crate::error::{OcioError, OcioResult};

/// Scene-linear space used when no config or no role is available.
pub const DEFAULT_SCENE_LINEAR: &str = "Linear Rec.709";

/// Environment variable naming the active config file.
pub const ENV_VAR: &str = "OCIO";

/// Role name of the scene-linear working space.
pub const SCENE_LINEAR_ROLE: &str = "scene_linear";

/// Color spaces reported when no config is loaded.
const BUILTIN_SPACES: &[&str] = &[DEFAULT_SCENE_LINEAR, "sRGB", "Non-Color"];

/// The parts of an OCIO config this workspace cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorConfig {
    scene_linear: Option<String>,
    colorspaces: Vec<String>,
    source: Option<PathBuf>,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            scene_linear: None,
            colorspaces: BUILTIN_SPACES.iter().map(|s| s.to_string()).collect(),
            source: None,
        }
    }
}

impl ColorConfig {
    /// Loads a config file.
    ///
    /// Files the YAML parser rejects are read again with a line scan, which
    /// recovers the role and color space names from most hand-edited configs.
    pub fn from_file(path: impl AsRef<Path>) -> OcioResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OcioError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let mut config = match Self::from_yaml_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config is not valid YAML, scanning lines");
                Self::scan(&content)
            }
        };
        config.source = Some(path.to_path_buf());
        debug!(
            path = %path.display(),
            scene_linear = config.scene_linear(),
            colorspaces = config.colorspaces.len(),
            "loaded OCIO config"
        );
        Ok(config)
    }

    /// Parses config YAML.
    pub fn from_yaml_str(yaml: &str) -> OcioResult<Self> {
        let root: Value = serde_yaml::from_str(yaml)?;
        let root = untag(&root);
        if !root.is_mapping() {
            return Err(OcioError::InvalidConfig("top level is not a mapping".into()));
        }

        let scene_linear = root
            .get("roles")
            .map(untag)
            .and_then(|roles| roles.get(SCENE_LINEAR_ROLE))
            .map(untag)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let colorspaces = root
            .get("colorspaces")
            .map(untag)
            .and_then(Value::as_sequence)
            .map(|seq| {
                seq.iter()
                    .filter_map(|cs| untag(cs).get("name").map(untag).and_then(Value::as_str))
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            scene_linear,
            colorspaces,
            source: None,
        })
    }

    /// Reads the role and color space names line by line.
    ///
    /// The first `scene_linear:` line wins. Color space names are the `name:`
    /// entries of the top-level `colorspaces:` section.
    pub fn scan(text: &str) -> Self {
        let mut scene_linear = None;
        let mut colorspaces = Vec::new();
        let mut section = "";

        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if !raw.starts_with(char::is_whitespace) && !line.starts_with('-') {
                section = line.split(':').next().unwrap_or("").trim();
            }

            if scene_linear.is_none() {
                if let Some(value) = line.strip_prefix("scene_linear:") {
                    let value = unquote(value.trim());
                    if !value.is_empty() {
                        scene_linear = Some(value.to_string());
                    }
                    continue;
                }
            }

            if section == "colorspaces" {
                let entry = line.trim_start_matches('-').trim_start();
                let entry = entry.strip_prefix("!<ColorSpace>").unwrap_or(entry).trim_start();
                if let Some(name) = entry.strip_prefix("name:") {
                    let name = unquote(name.trim());
                    if !name.is_empty() {
                        colorspaces.push(name.to_string());
                    }
                }
            }
        }

        Self {
            scene_linear,
            colorspaces,
            source: None,
        }
    }

    /// Finds the active config.
    ///
    /// Order: `explicit` path, then the `OCIO` environment variable, then the
    /// built-in defaults. An explicit path must load; a broken `OCIO` variable
    /// only logs a warning.
    pub fn discover(explicit: Option<&Path>) -> OcioResult<Self> {
        Self::discover_with(explicit, std::env::var_os(ENV_VAR))
    }

    /// [`discover`](Self::discover) with the environment value passed in.
    pub fn discover_with(explicit: Option<&Path>, env: Option<OsString>) -> OcioResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Some(value) = env.filter(|v| !v.is_empty()) {
            let path = PathBuf::from(value);
            match Self::from_file(&path) {
                Ok(config) => return Ok(config),
                Err(e) => warn!(path = %path.display(), error = %e, "ignoring OCIO environment variable"),
            }
        }

        debug!("no OCIO config, using built-in defaults");
        Ok(Self::default())
    }

    /// The scene-linear working space.
    pub fn scene_linear(&self) -> &str {
        self.scene_linear.as_deref().unwrap_or(DEFAULT_SCENE_LINEAR)
    }

    /// Whether the config defines the `scene_linear` role.
    pub fn has_scene_linear_role(&self) -> bool {
        self.scene_linear.is_some()
    }

    /// Declared color space names with the scene-linear space first.
    pub fn color_spaces(&self) -> Vec<String> {
        to_front(&self.colorspaces, self.scene_linear())
    }

    /// Whether `name` is a declared color space or the scene-linear space.
    pub fn contains(&self, name: &str) -> bool {
        name == self.scene_linear() || self.colorspaces.iter().any(|cs| cs == name)
    }

    /// The file this config was loaded from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// Moves `first` to the front of `names`, inserting it when absent, and
/// drops duplicates.
pub fn to_front(names: &[String], first: &str) -> Vec<String> {
    let mut out = Vec::with_capacity(names.len() + 1);
    out.push(first.to_string());
    for name in names {
        if !out.contains(name) {
            out.push(name.clone());
        }
    }
    out
}

fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

fn unquote(s: &str) -> &str {
    s.trim_matches(|c| c == '"' || c == '\'')
}
