//! Model conversion CLI commands.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use brickhub_converter::{ConvertedFile, OutputKind};
use brickhub_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for the convert command
#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// LDraw model files (.dat, .ldr, .mpd)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output to produce
    #[arg(short, long, value_enum, default_value = "all")]
    pub to: Target,

    /// Regenerate outputs even if they are cached
    #[arg(long)]
    pub rewrite: bool,
}

/// Conversion target
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    /// STL model only
    Stl,
    /// PNG snapshot only
    Png,
    /// Both STL and PNG
    All,
}

impl Target {
    fn kinds(self) -> &'static [OutputKind] {
        match self {
            Self::Stl => &[OutputKind::Stl],
            Self::Png => &[OutputKind::Png],
            Self::All => &OutputKind::ALL,
        }
    }
}

/// Conversion result row
#[derive(Debug, Serialize, Tabled)]
struct ConvertRow {
    /// Source file
    source: String,
    /// Output kind
    kind: String,
    /// Path in media storage
    output: String,
    /// Size
    size: String,
    /// Served from cache
    cached: String,
}

impl ConvertRow {
    fn new(source: &std::path::Path, file: &ConvertedFile) -> Self {
        Self {
            source: source.display().to_string(),
            kind: file.kind.label().to_string(),
            output: file.storage_path.clone(),
            size: output::format_bytes(file.size_bytes),
            cached: if file.cached { "✓" } else { "" }.to_string(),
        }
    }
}

/// Execute the convert command
pub async fn execute(
    args: &ConvertArgs,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let converter = super::create_converter(&config).await?;

    let mut rows = Vec::new();
    let mut failed = 0usize;

    for file in &args.files {
        for &kind in args.to.kinds() {
            match converter.convert(file, kind, args.rewrite).await {
                Ok(converted) => rows.push(ConvertRow::new(file, &converted)),
                Err(e) => {
                    failed += 1;
                    output::print_error(&format!("{}: {e}", file.display()));
                }
            }
        }
    }

    output::print_list(&rows, format);

    let metrics = converter.metrics_snapshot();
    info!(
        requests = metrics.requests,
        cache_hits = metrics.cache_hits,
        succeeded = metrics.succeeded,
        failed = metrics.failed,
        p95_ms = metrics.duration_p95_ms,
        "Conversion run finished"
    );

    if failed > 0 {
        return Err(AppError::conversion(format!(
            "{failed} of {} conversions failed",
            rows.len() + failed
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_kinds() {
        assert_eq!(Target::Stl.kinds(), &[OutputKind::Stl]);
        assert_eq!(Target::Png.kinds(), &[OutputKind::Png]);
        assert_eq!(Target::All.kinds(), &[OutputKind::Stl, OutputKind::Png]);
    }
}
