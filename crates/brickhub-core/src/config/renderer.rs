//! POV-Ray rendering settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Settings for rendering STL files through `stl2pov` and POV-Ray.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Path to the POV-Ray binary.
    #[serde(default = "default_povray_path")]
    pub povray_path: PathBuf,
    /// Path to the `stl2pov` binary.
    #[serde(default = "default_stl2pov_path")]
    pub stl2pov_path: PathBuf,
    /// Scene layout appended after the mesh declaration. It refers to the
    /// mesh as `model`.
    #[serde(default = "default_layout_template")]
    pub layout_template: PathBuf,
    /// Output width in pixels.
    #[serde(default = "default_width")]
    #[validate(range(min = 16, max = 8192))]
    pub width: u32,
    /// Output height in pixels.
    #[serde(default = "default_height")]
    #[validate(range(min = 16, max = 8192))]
    pub height: u32,
    /// POV-Ray render quality (`+Q`).
    #[serde(default = "default_quality")]
    #[validate(range(min = 0, max = 11))]
    pub quality: u8,
    /// Anti-aliasing threshold (`+A`).
    #[serde(default = "default_antialias")]
    #[validate(range(min = 0.0, max = 3.0))]
    pub antialias: f64,
    /// Directory for intermediate `.inc`/`.pov` files. Defaults to the
    /// system temp directory.
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
    /// Keep intermediate files after rendering.
    #[serde(default)]
    pub keep_intermediate: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            povray_path: default_povray_path(),
            stl2pov_path: default_stl2pov_path(),
            layout_template: default_layout_template(),
            width: default_width(),
            height: default_height(),
            quality: default_quality(),
            antialias: default_antialias(),
            work_dir: None,
            keep_intermediate: false,
        }
    }
}

impl RendererConfig {
    /// Resolve the effective directory for intermediate files.
    pub fn effective_work_dir(&self) -> PathBuf {
        self.work_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("brickhub-render"))
    }
}

fn default_povray_path() -> PathBuf {
    PathBuf::from("povray")
}

fn default_stl2pov_path() -> PathBuf {
    PathBuf::from("stl2pov")
}

fn default_layout_template() -> PathBuf {
    PathBuf::from("resources/povray_layout/layout.tmpl")
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

fn default_quality() -> u8 {
    8
}

fn default_antialias() -> f64 {
    0.3
}
