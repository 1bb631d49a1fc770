//! Output cache CLI commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use brickhub_converter::{ConvertedFile, OutputKind};
use brickhub_core::error::AppError;

use super::KindArg;
use crate::output::{self, OutputFormat};

/// Arguments for cache commands
#[derive(Debug, Args)]
pub struct CacheArgs {
    /// Cache subcommand
    #[command(subcommand)]
    pub command: CacheCommand,
}

/// Cache subcommands
#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// List cached outputs
    List {
        /// Only list this kind
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,
    },
    /// Remove the cached output of a model
    Evict {
        /// Source model file
        file: PathBuf,
        /// Output kind to evict (all kinds when omitted)
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,
    },
}

/// Cached output row
#[derive(Debug, Serialize, Tabled)]
struct CacheRow {
    /// Output kind
    kind: String,
    /// Path in media storage
    path: String,
    /// Size
    size: String,
    /// Last modified (UTC)
    modified: String,
}

impl From<&ConvertedFile> for CacheRow {
    fn from(file: &ConvertedFile) -> Self {
        Self {
            kind: file.kind.label().to_string(),
            path: file.storage_path.clone(),
            size: output::format_bytes(file.size_bytes),
            modified: file
                .modified
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

fn selected(kind: Option<KindArg>) -> Vec<OutputKind> {
    match kind {
        Some(kind) => vec![kind.into()],
        None => OutputKind::ALL.to_vec(),
    }
}

/// Execute cache commands
pub async fn execute(
    args: &CacheArgs,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let converter = super::create_converter(&config).await?;

    match &args.command {
        CacheCommand::List { kind } => {
            let mut rows = Vec::new();
            for kind in selected(*kind) {
                let files = converter.cached_outputs(kind).await?;
                rows.extend(files.iter().map(CacheRow::from));
            }
            output::print_list(&rows, format);
        }
        CacheCommand::Evict { file, kind } => {
            for kind in selected(*kind) {
                let target = kind.storage_path(file);
                if converter.evict(file, kind).await? {
                    output::print_success(&format!("Evicted '{target}'"));
                } else {
                    output::print_warning(&format!("'{target}' is not cached"));
                }
            }
        }
    }

    Ok(())
}
