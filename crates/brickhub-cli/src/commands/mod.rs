//! CLI command definitions and dispatch.

pub mod cache;
pub mod config;
pub mod convert;
pub mod render;
pub mod tools;

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use brickhub_converter::{OutputKind, StlConverter, StlFixer};
use brickhub_core::config::AppConfig;
use brickhub_core::error::AppError;
use brickhub_storage::LocalStorageProvider;

use crate::output::OutputFormat;

/// BrickHub: LDraw model conversion toolkit
#[derive(Debug, Parser)]
#[command(name = "brickhub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file [default: `config/default.toml` plus the
    /// `config/<BRICKHUB_ENV>.toml` overlay]
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert LDraw models to STL and/or PNG
    Convert(convert::ConvertArgs),
    /// Render an STL file to PNG through POV-Ray
    Render(render::RenderArgs),
    /// Inspect and evict cached outputs
    Cache(cache::CacheArgs),
    /// External tool checks
    Tools(tools::ToolsArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Convert(args) => convert::execute(args, self.config.as_deref(), self.format).await,
            Commands::Render(args) => render::execute(args, self.config.as_deref(), self.format).await,
            Commands::Cache(args) => cache::execute(args, self.config.as_deref(), self.format).await,
            Commands::Tools(args) => tools::execute(args, self.config.as_deref(), self.format).await,
            Commands::Config(args) => config::execute(args, self.config.as_deref(), self.format).await,
        }
    }
}

/// Output kind selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// STL model under `models/`
    Stl,
    /// PNG snapshot under `images/`
    Png,
}

impl From<KindArg> for OutputKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Stl => OutputKind::Stl,
            KindArg::Png => OutputKind::Png,
        }
    }
}

/// Helper: load configuration from the given file, or from the layered
/// `config/` directory selected by `BRICKHUB_ENV` when none is given.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, AppError> {
    match config_path {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::load(&config_env()),
    }
}

/// Overlay name for the layered configuration.
pub fn config_env() -> String {
    std::env::var(brickhub_core::config::ENV_VAR)
        .unwrap_or_else(|_| brickhub_core::config::DEFAULT_ENV.to_string())
}

/// Helper: build a converter over the configured media root and LDraw library.
///
/// An unset library is not an error here; conversions report it.
pub async fn create_converter(config: &AppConfig) -> Result<StlConverter, AppError> {
    let media = LocalStorageProvider::new(&config.storage.media_root).await?;
    let mut converter = StlConverter::new(
        &config.converter,
        Arc::new(media),
        StlFixer::from_config(&config.converter),
    );

    if let Some(library) = &config.storage.ldraw_library {
        let library = LocalStorageProvider::open_existing(library).await?;
        converter.set_ldraw_library(Arc::new(library));
    }

    Ok(converter)
}
