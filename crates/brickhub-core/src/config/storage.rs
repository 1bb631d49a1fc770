//! Storage locations for generated assets and the LDraw parts library.

use serde::{Deserialize, Serialize};

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root of the media filesystem that holds generated web assets
    /// (`models/` and `images/` live beneath it).
    #[serde(default = "default_media_root")]
    pub media_root: String,
    /// Root of the LDraw parts library handed to LDView as `-LDrawDir`.
    ///
    /// Conversions refuse to run while this is unset.
    #[serde(default)]
    pub ldraw_library: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            media_root: default_media_root(),
            ldraw_library: None,
        }
    }
}

fn default_media_root() -> String {
    "./data/media".to_string()
}
