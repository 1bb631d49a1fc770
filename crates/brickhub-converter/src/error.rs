//! Unified error type for the conversion pipeline.
//!
//! Process, filesystem and storage failures are consolidated into a single
//! `ConversionError` enum that maps cleanly to `brickhub_core::AppError`.

use std::path::PathBuf;

use brickhub_core::error::AppError;
use thiserror::Error;

/// Unified error type for all conversion operations.
#[derive(Debug, Error)]
pub enum ConversionError {
    // --- Configuration errors ---
    /// No LDraw parts library has been attached to the converter.
    #[error("LDraw library context is not set")]
    LibraryMissing,

    /// A storage provider has no local directory to hand to a renderer.
    #[error("Storage provider '{provider}' is not backed by a local directory")]
    StorageNotLocal {
        /// Provider type name.
        provider: String,
    },

    /// POV-Ray layout template is missing.
    #[error("Layout template not found: {path}")]
    LayoutMissing {
        /// Configured template path.
        path: PathBuf,
    },

    // --- Conversion errors ---
    /// The renderer exited cleanly but the expected output is absent.
    #[error("Converting {file} to {format} failed")]
    ConvertingFailed {
        /// Source file that was being converted.
        file: PathBuf,
        /// Target format label (`STL`, `PNG`, `POV`).
        format: String,
    },

    /// An external step of a conversion failed.
    #[error("Converting {file} to {format} failed: {source}")]
    ToolFailed {
        /// Source file that was being converted.
        file: PathBuf,
        /// Target format label.
        format: String,
        /// The process error reported by the step.
        #[source]
        source: Box<ConversionError>,
    },

    // --- Process execution errors ---
    /// External program could not be found.
    #[error("Executable not found: {program}")]
    ProgramNotFound {
        /// The configured program path or name.
        program: PathBuf,
    },

    /// External program exited with a non-zero status.
    #[error("{program} exited with code {code}: {stderr}")]
    ProcessFailed {
        /// The program that failed.
        program: PathBuf,
        /// The exit code.
        code: i32,
        /// Captured stderr output.
        stderr: String,
    },

    /// External program was terminated by a signal.
    #[error("{program} was killed (signal termination)")]
    ProcessKilled {
        /// The program that was killed.
        program: PathBuf,
    },

    /// External program ran past the configured timeout.
    #[error("{program} timed out after {timeout_seconds}s")]
    Timeout {
        /// The program that timed out.
        program: PathBuf,
        /// The timeout that was exceeded.
        timeout_seconds: u64,
    },

    // --- Generic errors ---
    /// Storage provider error.
    #[error(transparent)]
    Storage(#[from] AppError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConversionError {
    /// Build a [`ConversionError::ConvertingFailed`].
    pub fn converting_failed(file: impl Into<PathBuf>, format: impl Into<String>) -> Self {
        Self::ConvertingFailed {
            file: file.into(),
            format: format.into(),
        }
    }

    /// Wrap a process error with the conversion it interrupted.
    pub fn tool_failed(
        file: impl Into<PathBuf>,
        format: impl Into<String>,
        source: ConversionError,
    ) -> Self {
        Self::ToolFailed {
            file: file.into(),
            format: format.into(),
            source: Box::new(source),
        }
    }
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::Storage(inner) => inner,
            ConversionError::LibraryMissing
            | ConversionError::StorageNotLocal { .. }
            | ConversionError::LayoutMissing { .. }
            | ConversionError::ProgramNotFound { .. } => AppError::configuration(err.to_string()),
            ConversionError::ConvertingFailed { .. } => AppError::conversion(err.to_string()),
            ConversionError::ToolFailed { ref source, .. } => match **source {
                ConversionError::ProgramNotFound { .. } => AppError::configuration(err.to_string()),
                _ => AppError::external_process(err.to_string()),
            },
            ConversionError::ProcessFailed { .. }
            | ConversionError::ProcessKilled { .. }
            | ConversionError::Timeout { .. } => AppError::external_process(err.to_string()),
            ConversionError::Io(e) => e.into(),
        }
    }
}
