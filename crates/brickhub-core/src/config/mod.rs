//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod converter;
pub mod logging;
pub mod renderer;
pub mod storage;

use std::path::Path;

use serde::{Deserialize, Serialize};
use validator::Validate;

use self::converter::ConverterConfig;
use self::logging::LoggingConfig;
use self::renderer::RendererConfig;
use self::storage::StorageConfig;

use crate::error::AppError;

/// Prefix for environment variable overrides (`BRICKHUB__CONVERTER__LDVIEW_PATH`).
const ENV_PREFIX: &str = "BRICKHUB";

/// Directory searched by [`AppConfig::load`].
pub const CONFIG_DIR: &str = "config";

/// Environment variable naming the overlay file (`config/<env>.toml`).
pub const ENV_VAR: &str = "BRICKHUB_ENV";

/// Overlay used when [`ENV_VAR`] is unset.
pub const DEFAULT_ENV: &str = "development";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Media and LDraw library locations.
    #[serde(default)]
    pub storage: StorageConfig,
    /// LDView conversion settings.
    #[serde(default)]
    pub converter: ConverterConfig,
    /// POV-Ray rendering settings.
    #[serde(default)]
    pub renderer: RendererConfig,
}

impl AppConfig {
    /// Load configuration from TOML files under `config/`.
    ///
    /// Merges `config/default.toml` with an environment-specific overlay
    /// and environment variables prefixed with `BRICKHUB__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from_dir(CONFIG_DIR, env)
    }

    /// Layered load rooted at `dir`: `default.toml`, then `<env>.toml`,
    /// then environment variables. Missing files are skipped.
    pub fn load_from_dir(dir: impl AsRef<Path>, env: &str) -> Result<Self, AppError> {
        let dir = dir.as_ref();
        let config = config::Config::builder()
            .add_source(config::File::from(dir.join("default.toml")).required(false))
            .add_source(config::File::from(dir.join(format!("{env}.toml"))).required(false))
            .add_source(env_source())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        Self::finish(config)
    }

    /// Load configuration from one explicit file plus environment overrides.
    ///
    /// A missing file is not an error; the defaults apply.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let config = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(env_source())
            .build()
            .map_err(|e| {
                AppError::configuration(format!(
                    "Failed to build config from '{}': {e}",
                    path.display()
                ))
            })?;

        Self::finish(config)
    }

    /// Run range validation on every section.
    pub fn validate(&self) -> Result<(), AppError> {
        self.converter.validate()?;
        self.renderer.validate()?;
        Ok(())
    }

    fn finish(config: config::Config) -> Result<Self, AppError> {
        let app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        app.validate()?;
        Ok(app)
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.converter.ldview_path, Path::new("ldview"));
        assert!(config.converter.admesh_path.is_none());
        assert_eq!(config.converter.snapshot.width, 800);
        assert_eq!(config.converter.snapshot.height, 600);
        assert_eq!(config.converter.snapshot.default_lat_long, "45,40");
        assert_eq!(config.renderer.quality, 8);
        assert!(config.storage.ldraw_library.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml_str = r#"
            [storage]
            ldraw_library = "/opt/ldraw"

            [converter]
            ldview_path = "/usr/bin/ldview"

            [converter.snapshot]
            width = 1024
        "#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse toml");
        assert_eq!(config.storage.ldraw_library.as_deref(), Some("/opt/ldraw"));
        assert_eq!(config.storage.media_root, "./data/media");
        assert_eq!(config.converter.snapshot.width, 1024);
        assert_eq!(config.converter.snapshot.height, 600);
        assert_eq!(config.converter.process_timeout_seconds, 300);
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let mut config = AppConfig::default();
        config.converter.process_timeout_seconds = 0;
        let err = config.validate().expect_err("timeout of zero");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_validation_rejects_nested_snapshot() {
        let mut config = AppConfig::default();
        config.converter.snapshot.curve_quality = 40;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("brickhub.toml");
        std::fs::write(
            &path,
            "[renderer]\npovray_path = \"/opt/povray/bin/povray\"\nwidth = 320\n",
        )
        .expect("write");

        let config = AppConfig::from_file(&path).expect("load");
        assert_eq!(
            config.renderer.povray_path,
            Path::new("/opt/povray/bin/povray")
        );
        assert_eq!(config.renderer.width, 320);
        assert_eq!(config.renderer.height, 600);
    }

    #[test]
    fn test_from_missing_file_uses_defaults() {
        let config = AppConfig::from_file("/nonexistent/brickhub.toml").expect("load");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_env_overlay_overrides_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("default.toml"),
            "[converter]\nldview_path = \"/usr/bin/ldview\"\nprocess_timeout_seconds = 120\n",
        )
        .expect("write default");
        std::fs::write(
            dir.path().join("production.toml"),
            "[converter]\nprocess_timeout_seconds = 600\n\n[storage]\nldraw_library = \"/srv/ldraw\"\n",
        )
        .expect("write overlay");

        let config = AppConfig::load_from_dir(dir.path(), "production").expect("load");
        assert_eq!(config.converter.ldview_path, Path::new("/usr/bin/ldview"));
        assert_eq!(config.converter.process_timeout_seconds, 600);
        assert_eq!(config.storage.ldraw_library.as_deref(), Some("/srv/ldraw"));

        let config = AppConfig::load_from_dir(dir.path(), "development").expect("load");
        assert_eq!(config.converter.process_timeout_seconds, 120);
        assert!(config.storage.ldraw_library.is_none());
    }

    #[test]
    fn test_overlay_is_validated() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("broken.toml"),
            "[renderer]\nquality = 99\n",
        )
        .expect("write overlay");

        let err = AppConfig::load_from_dir(dir.path(), "broken").expect_err("quality out of range");
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
