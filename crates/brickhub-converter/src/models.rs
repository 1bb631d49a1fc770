//! Output kinds and converted file references.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Artifact produced from an LDraw model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Solid geometry exported by LDView.
    Stl,
    /// Raster snapshot taken by LDView.
    Png,
}

impl OutputKind {
    /// All output kinds, in cache listing order.
    pub const ALL: [OutputKind; 2] = [OutputKind::Stl, OutputKind::Png];

    /// Cache subdirectory inside the media storage.
    pub fn subdir(self) -> &'static str {
        match self {
            Self::Stl => "models",
            Self::Png => "images",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Stl => "stl",
            Self::Png => "png",
        }
    }

    /// Format label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Stl => "STL",
            Self::Png => "PNG",
        }
    }

    /// Output file name for a model: the model's base name with its last
    /// extension replaced, the way LDView names exports.
    ///
    /// `parts/3001.dat` → `3001.stl`, `car.mpd` → `car.stl`,
    /// `notes.txt` → `notes.stl`. A dot file such as `.dat` has no
    /// extension and keeps its name: `.dat.stl`.
    pub fn output_file_name(self, source: &Path) -> String {
        let stem = source
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{stem}.{}", self.extension())
    }

    /// Storage path of the cached output for a model, e.g. `models/3001.stl`.
    pub fn storage_path(self, source: &Path) -> String {
        format!("{}/{}", self.subdir(), self.output_file_name(source))
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A cached or freshly produced output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertedFile {
    /// What kind of artifact this is.
    pub kind: OutputKind,
    /// Path relative to the media storage root.
    pub storage_path: String,
    /// Absolute path on disk.
    pub absolute_path: PathBuf,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Last modification time of the output.
    pub modified: Option<DateTime<Utc>>,
    /// `true` when served from cache without invoking a renderer.
    pub cached: bool,
}
