//! Storage traits and error types
//!
//! This module defines the trait interface for image storage backends and
//! associated error types.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Cannot create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for image storage backends
///
/// Images are addressed by their derived filename. Implementations must be
/// safe to call from several image workers at once; concurrent writes target
/// distinct names except when two URLs derive the same filename, in which case
/// the last writer wins.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Makes sure the destination exists
    ///
    /// Called once before a crawl starts. Failure aborts the run.
    fn ensure_dir(&self) -> StorageResult<()>;

    /// Returns true if an image with this filename is already stored
    fn exists(&self, name: &str) -> bool;

    /// Opens a writer for `name`
    ///
    /// Nothing becomes visible under `name` until the writer is committed. A
    /// writer dropped without commit leaves the store as it was.
    async fn create(&self, name: &str) -> StorageResult<Box<dyn ImageWriter>>;

    /// Where an image with this filename lives, for log lines
    fn location(&self, name: &str) -> PathBuf;
}

/// Incremental writer for one image
#[async_trait]
pub trait ImageWriter: Send {
    /// Appends a chunk of the image body
    async fn write_chunk(&mut self, chunk: &[u8]) -> StorageResult<()>;

    /// Publishes the image under its final name, replacing any previous one
    ///
    /// Returns the number of bytes written.
    async fn commit(self: Box<Self>) -> StorageResult<u64>;
}
