//! # brickhub-core
//!
//! Core crate for BrickHub. Contains the configuration schemas, the
//! storage provider trait and the unified error system shared by the
//! converter and the CLI.
//!
//! This crate has **no** internal dependencies on other BrickHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
