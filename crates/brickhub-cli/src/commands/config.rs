//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use brickhub_core::error::AppError;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Validate configuration file
    Validate,
    /// Generate a default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
    },
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = super::load_config(config_path)?;
            output::print_item(&config, format);
        }
        ConfigCommand::Validate => match super::load_config(config_path) {
            Ok(config) => {
                let source = match config_path {
                    Some(path) => path.to_string(),
                    None => format!("config/ ({})", super::config_env()),
                };
                output::print_success(&format!("Configuration '{source}' is valid"));
                output::print_kv("Media root", &config.storage.media_root);
                output::print_kv(
                    "LDraw library",
                    config.storage.ldraw_library.as_deref().unwrap_or("(not set)"),
                );
                output::print_kv("LDView", &config.converter.ldview_path.display().to_string());
                output::print_kv(
                    "ADMesh",
                    &config
                        .converter
                        .admesh_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "(disabled)".to_string()),
                );
                output::print_kv("POV-Ray", &config.renderer.povray_path.display().to_string());
                if config.storage.ldraw_library.is_none() {
                    output::print_warning("Conversions will fail until storage.ldraw_library is set");
                }
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
        ConfigCommand::Generate { output: out_path } => {
            let default_config = include_str!("../../../../config/default.toml");

            if let Some(parent) = std::path::Path::new(out_path).parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| AppError::internal(format!("Failed to create dir: {e}")))?;
            }

            tokio::fs::write(out_path, default_config)
                .await
                .map_err(|e| AppError::internal(format!("Failed to write config: {e}")))?;

            output::print_success(&format!("Default config written to '{out_path}'"));
        }
    }

    Ok(())
}
