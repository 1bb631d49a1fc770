//! Shared helpers for the conversion integration tests.
//!
//! The renderers are replaced by the shell scripts in `fixtures/bin`.

#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use brickhub_converter::{StlConverter, StlFixer};
use brickhub_core::config::converter::ConverterConfig;
use brickhub_storage::LocalStorageProvider;
use tempfile::TempDir;

/// Directory holding test fixtures.
pub fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Path to a stub executable, with the executable bit enforced.
pub fn stub(name: &str) -> PathBuf {
    let path = fixtures().join("bin").join(name);
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("chmod stub");
    path
}

/// Sample LDraw model.
pub fn model() -> PathBuf {
    fixtures().join("3001.dat")
}

/// Test converter context.
pub struct TestConverter {
    /// Converter under test.
    pub converter: StlConverter,
    /// Media storage root; removed on drop.
    pub media: TempDir,
}

impl TestConverter {
    /// Converter with an attached LDraw library using the given LDView stub.
    pub async fn new(ldview: &str) -> Self {
        Self::build(ldview, None, true).await
    }

    /// Converter that also runs an ADMesh stub on exported STL files.
    pub async fn with_fixer(ldview: &str, admesh: &str) -> Self {
        Self::build(ldview, Some(stub(admesh)), true).await
    }

    /// Converter without an LDraw library.
    pub async fn without_library(ldview: &str) -> Self {
        Self::build(ldview, None, false).await
    }

    async fn build(ldview: &str, admesh: Option<PathBuf>, with_library: bool) -> Self {
        let media = tempfile::tempdir().expect("tempdir");
        let config = ConverterConfig {
            ldview_path: stub(ldview),
            admesh_path: admesh,
            process_timeout_seconds: 30,
            ..Default::default()
        };

        let storage = LocalStorageProvider::new(media.path())
            .await
            .expect("media storage");
        let mut converter =
            StlConverter::new(&config, Arc::new(storage), StlFixer::from_config(&config));

        if with_library {
            let library = LocalStorageProvider::open_existing(fixtures().join("ldraw"))
                .await
                .expect("ldraw library");
            converter.set_ldraw_library(Arc::new(library));
        }

        Self { converter, media }
    }

    /// Absolute path of a file under the media root.
    pub fn media_file(&self, path: &str) -> PathBuf {
        self.media.path().join(path)
    }

    /// Lines logged by the LDView stub, one per invocation.
    pub fn ldview_calls(&self) -> Vec<String> {
        read_log(&self.media.path().join("ldview.log"))
    }

    /// Lines logged by the ADMesh stub, one per invocation.
    pub fn admesh_calls(&self) -> Vec<String> {
        read_log(&self.media.path().join("admesh.log"))
    }
}

fn read_log(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
