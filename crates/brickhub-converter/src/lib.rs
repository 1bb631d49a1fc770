//! # brickhub-converter
//!
//! Turns LDraw model files into web assets by driving external renderers:
//!
//! - `.dat` → `.stl` through LDView's exporter, then rewritten as binary STL
//!   by ADMesh when configured;
//! - `.dat` → `.png` through LDView snapshots;
//! - `.stl` → `.png` through `stl2pov` and POV-Ray.
//!
//! LDView outputs are cached in the media storage under `models/` and
//! `images/`, keyed by the source file name. A cached output is returned
//! as-is unless the caller asks for a rewrite.

pub mod converter;
pub mod error;
pub mod fixer;
pub mod metrics;
pub mod models;
pub mod process;
pub mod renderer;

pub use converter::StlConverter;
pub use error::ConversionError;
pub use fixer::StlFixer;
pub use metrics::{ConversionMetrics, MetricsSnapshot};
pub use models::{ConvertedFile, OutputKind};
pub use process::{ProcessOutput, ProcessRunner};
pub use renderer::StlRenderer;
