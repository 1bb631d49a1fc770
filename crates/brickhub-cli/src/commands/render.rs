//! STL rendering CLI command.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use brickhub_converter::{ProcessRunner, StlRenderer};
use brickhub_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for the render command
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// STL file to render
    pub file: PathBuf,

    /// Destination directory (defaults to `<media_root>/images`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep the generated mesh and scene files
    #[arg(long)]
    pub keep_intermediate: bool,
}

#[derive(Debug, Serialize)]
struct RenderResult {
    source: String,
    image: String,
}

/// Execute the render command
pub async fn execute(
    args: &RenderArgs,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;

    let destination = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.storage.media_root).join("images"));
    let keep = args.keep_intermediate || config.renderer.keep_intermediate;

    let runner = ProcessRunner::with_timeout_seconds(config.converter.process_timeout_seconds);
    let renderer = StlRenderer::new(config.renderer, runner);
    let image = renderer.render_with(&args.file, &destination, keep).await?;

    match format {
        OutputFormat::Table => {
            output::print_success(&format!("Rendered '{}'", args.file.display()));
            output::print_kv("Image", &image.display().to_string());
        }
        OutputFormat::Json => output::print_item(
            &RenderResult {
                source: args.file.display().to_string(),
                image: image.display().to_string(),
            },
            format,
        ),
    }
    Ok(())
}
