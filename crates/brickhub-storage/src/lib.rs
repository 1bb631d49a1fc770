//! # brickhub-storage
//!
//! Storage provider implementations for BrickHub. The media filesystem
//! (generated models and images) and the LDraw parts library are both
//! served by [`LocalStorageProvider`].

pub mod providers;

pub use providers::LocalStorageProvider;
