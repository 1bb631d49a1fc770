//! Core traits defined in `brickhub-core` and implemented by other crates.

pub mod storage;

pub use storage::StorageProvider;
