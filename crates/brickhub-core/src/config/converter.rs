//! LDView conversion settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Settings for the model conversion pipeline (LDView + STL fixer).
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Path to the LDView (OSMesa) binary.
    #[serde(default = "default_ldview_path")]
    pub ldview_path: PathBuf,

    /// Path to the ADMesh binary used to rewrite exported STL files.
    ///
    /// When unset, exported STL files are kept exactly as LDView wrote them.
    #[serde(default)]
    pub admesh_path: Option<PathBuf>,

    /// Timeout in seconds for a single external process invocation.
    #[serde(default = "default_process_timeout_seconds")]
    #[validate(range(min = 1, max = 3600))]
    pub process_timeout_seconds: u64,

    /// Snapshot (PNG) settings passed to LDView.
    #[serde(default)]
    #[validate(nested)]
    pub snapshot: SnapshotConfig,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            ldview_path: default_ldview_path(),
            admesh_path: None,
            process_timeout_seconds: default_process_timeout_seconds(),
            snapshot: SnapshotConfig::default(),
        }
    }
}

/// LDView snapshot parameters.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Image width in pixels.
    #[serde(default = "default_width")]
    #[validate(range(min = 16, max = 8192))]
    pub width: u32,
    /// Image height in pixels.
    #[serde(default = "default_height")]
    #[validate(range(min = 16, max = 8192))]
    pub height: u32,
    /// Background color as LDView hex (`0xRRGGBB`).
    #[serde(default = "default_background_color")]
    pub background_color: String,
    /// Color of parts without an explicit color (`0xRRGGBB`).
    #[serde(default = "default_model_color")]
    pub default_color: String,
    /// Curve subdivision quality.
    #[serde(default = "default_curve_quality")]
    #[validate(range(min = 1, max = 12))]
    pub curve_quality: u32,
    /// Camera latitude/longitude as `"lat,long"`.
    #[serde(default = "default_lat_long")]
    pub default_lat_long: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            background_color: default_background_color(),
            default_color: default_model_color(),
            curve_quality: default_curve_quality(),
            default_lat_long: default_lat_long(),
        }
    }
}

fn default_ldview_path() -> PathBuf {
    PathBuf::from("ldview")
}

fn default_process_timeout_seconds() -> u64 {
    300
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

fn default_background_color() -> String {
    "0xFFFFFF".to_string()
}

fn default_model_color() -> String {
    "0x136FC3".to_string()
}

fn default_curve_quality() -> u32 {
    12
}

fn default_lat_long() -> String {
    "45,40".to_string()
}
