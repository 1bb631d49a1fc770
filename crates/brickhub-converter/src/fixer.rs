//! STL post-processing.
//!
//! LDView writes ASCII STL. ADMesh rewrites it in place as binary STL,
//! which is smaller and parses faster in web viewers.

use std::path::{Path, PathBuf};

use brickhub_core::config::converter::ConverterConfig;
use tracing::{debug, info};

use crate::error::ConversionError;
use crate::process::{ProcessRunner, path_arg, path_flag};

/// Rewrites exported STL files through ADMesh.
#[derive(Debug, Clone)]
pub struct StlFixer {
    admesh: Option<PathBuf>,
    runner: ProcessRunner,
}

impl StlFixer {
    /// Create a fixer that runs `admesh` with the given runner.
    pub fn new(admesh: impl Into<PathBuf>, runner: ProcessRunner) -> Self {
        Self {
            admesh: Some(admesh.into()),
            runner,
        }
    }

    /// Create a fixer that leaves files untouched.
    pub fn disabled() -> Self {
        Self {
            admesh: None,
            runner: ProcessRunner::default(),
        }
    }

    /// Build from configuration; disabled when `admesh_path` is unset.
    pub fn from_config(config: &ConverterConfig) -> Self {
        let runner = ProcessRunner::with_timeout_seconds(config.process_timeout_seconds);
        match &config.admesh_path {
            Some(path) => Self::new(path, runner),
            None => Self {
                admesh: None,
                runner,
            },
        }
    }

    /// Whether a fixer binary is configured.
    pub fn is_enabled(&self) -> bool {
        self.admesh.is_some()
    }

    /// The configured ADMesh binary.
    pub fn program(&self) -> Option<&Path> {
        self.admesh.as_deref()
    }

    /// Arguments passed to ADMesh for `file`.
    pub fn arguments(file: &Path) -> Vec<String> {
        vec![path_arg(file), path_flag("--write-binary-stl=", file)]
    }

    /// Rewrite `file` in place.
    pub async fn fix(&self, file: &Path) -> Result<(), ConversionError> {
        let Some(admesh) = &self.admesh else {
            debug!(file = %file.display(), "STL fixer disabled, keeping LDView output");
            return Ok(());
        };

        let output = self.runner.run(admesh, Self::arguments(file)).await?;
        info!(
            file = %file.display(),
            elapsed_ms = output.duration.as_millis() as u64,
            "Rewrote STL as binary"
        );
        Ok(())
    }
}

impl Default for StlFixer {
    fn default() -> Self {
        Self::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments() {
        let args = StlFixer::arguments(Path::new("/media/models/3001.stl"));
        assert_eq!(
            args,
            vec![
                "/media/models/3001.stl".to_string(),
                "--write-binary-stl=/media/models/3001.stl".to_string(),
            ]
        );
    }

    #[test]
    fn test_from_config() {
        let config = ConverterConfig::default();
        assert!(!StlFixer::from_config(&config).is_enabled());

        let config = ConverterConfig {
            admesh_path: Some(PathBuf::from("/usr/bin/admesh")),
            ..Default::default()
        };
        let fixer = StlFixer::from_config(&config);
        assert!(fixer.is_enabled());
        assert_eq!(fixer.program(), Some(Path::new("/usr/bin/admesh")));
    }

    #[tokio::test]
    async fn test_disabled_fix_is_noop() {
        let fixer = StlFixer::disabled();
        fixer
            .fix(Path::new("/nonexistent/3001.stl"))
            .await
            .expect("noop");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_fixer_surfaces_process_error() {
        let fixer = StlFixer::new("/bin/false", ProcessRunner::with_timeout_seconds(5));
        let err = fixer
            .fix(Path::new("/tmp/3001.stl"))
            .await
            .expect_err("should fail");
        assert!(matches!(err, ConversionError::ProcessFailed { code: 1, .. }));
    }
}
