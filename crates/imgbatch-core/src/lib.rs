//! imgbatch Core Library
//!
//! This crate provides the domain models, error type, configuration and constants
//! shared by every imgbatch component: the storage-key mapper, the remote invoker
//! and the editor itself.

pub mod config;
pub mod constants;
pub mod error;
pub mod invoker_types;
pub mod models;

// Re-export commonly used types
pub use config::EditorConfig;
pub use error::{EditorError, ErrorMetadata, LogLevel};
pub use invoker_types::InvokerBackend;
pub use models::{ImageSize, Operation, OutputDescriptor, Quality};
