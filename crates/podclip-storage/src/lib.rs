//! S3 content-store client.
//!
//! This crate provides:
//! - Source video download into a working directory
//! - Finished clip upload
//! - Error mapping from the SDK's native error codes

pub mod client;
pub mod error;

pub use client::{S3Client, S3Config};
pub use error::{StorageError, StorageResult};
