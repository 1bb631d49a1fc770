//! External tool CLI commands.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use brickhub_converter::ProcessRunner;
use brickhub_core::config::AppConfig;
use brickhub_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for tools commands
#[derive(Debug, Args)]
pub struct ToolsArgs {
    /// Tools subcommand
    #[command(subcommand)]
    pub command: ToolsCommand,
}

/// Tools subcommands
#[derive(Debug, Subcommand)]
pub enum ToolsCommand {
    /// Check that configured binaries and resources are present
    Check,
}

/// Tool check row
#[derive(Debug, Serialize, Tabled)]
struct ToolRow {
    /// Tool name
    tool: String,
    /// Configured path
    path: String,
    /// Status
    status: String,
}

enum Requirement {
    Program,
    File,
    Directory,
}

/// Everything the pipeline may touch, with whether it must be present.
fn checklist(config: &AppConfig) -> Vec<(&'static str, Option<PathBuf>, Requirement)> {
    vec![
        (
            "ldview",
            Some(config.converter.ldview_path.clone()),
            Requirement::Program,
        ),
        (
            "admesh",
            config.converter.admesh_path.clone(),
            Requirement::Program,
        ),
        (
            "stl2pov",
            Some(config.renderer.stl2pov_path.clone()),
            Requirement::Program,
        ),
        (
            "povray",
            Some(config.renderer.povray_path.clone()),
            Requirement::Program,
        ),
        (
            "layout",
            Some(config.renderer.layout_template.clone()),
            Requirement::File,
        ),
        (
            "ldraw library",
            config.storage.ldraw_library.as_ref().map(PathBuf::from),
            Requirement::Directory,
        ),
    ]
}

async fn present(path: &Path, requirement: &Requirement) -> bool {
    match requirement {
        Requirement::Program => ProcessRunner::is_available(path).await,
        Requirement::File => tokio::fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false),
        Requirement::Directory => tokio::fs::metadata(path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false),
    }
}

/// Execute tools commands
pub async fn execute(
    args: &ToolsArgs,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;

    match &args.command {
        ToolsCommand::Check => {
            let mut rows = Vec::new();
            let mut missing = 0usize;

            for (tool, path, requirement) in checklist(&config) {
                let (path, status) = match path {
                    Some(path) => {
                        let ok = present(&path, &requirement).await;
                        if !ok {
                            missing += 1;
                        }
                        let status = if ok { "✓ found" } else { "✗ missing" };
                        (path.display().to_string(), status)
                    }
                    None => ("-".to_string(), "not configured"),
                };
                rows.push(ToolRow {
                    tool: tool.to_string(),
                    path,
                    status: status.to_string(),
                });
            }

            output::print_list(&rows, format);

            if missing > 0 {
                return Err(AppError::configuration(format!(
                    "{missing} configured tool(s) missing"
                )));
            }
        }
    }

    Ok(())
}
