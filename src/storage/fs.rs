//! Filesystem-backed image storage
//!
//! Image bodies are streamed into a hidden `.part` file next to their final
//! name and renamed into place once complete, so an interrupted download
//! never leaves a truncated image behind.

use crate::storage::traits::{ImageStore, ImageWriter, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

/// Stores images as plain files inside one output directory
#[derive(Debug)]
pub struct FsImageStore {
    root: PathBuf,

    /// Distinguishes temp files of writers racing on the same name
    next_part: AtomicU64,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            next_part: AtomicU64::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn part_location(&self, name: &str) -> PathBuf {
        let n = self.next_part.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!(".{}.{}.part", name, n))
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    fn ensure_dir(&self) -> StorageResult<()> {
        std::fs::create_dir_all(&self.root).map_err(|source| StorageError::CreateDir {
            path: self.root.clone(),
            source,
        })
    }

    fn exists(&self, name: &str) -> bool {
        self.location(name).exists()
    }

    async fn create(&self, name: &str) -> StorageResult<Box<dyn ImageWriter>> {
        let part = self.part_location(name);
        let file = File::create(&part)
            .await
            .map_err(|source| StorageError::Write {
                path: part.clone(),
                source,
            })?;

        Ok(Box::new(FsImageWriter {
            file: Some(file),
            part,
            target: self.location(name),
            written: 0,
        }))
    }

    fn location(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

/// Streams one image into its `.part` file
struct FsImageWriter {
    /// None once committed
    file: Option<File>,
    part: PathBuf,
    target: PathBuf,
    written: u64,
}

impl FsImageWriter {
    fn write_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Write {
            path: self.target.clone(),
            source,
        }
    }
}

#[async_trait]
impl ImageWriter for FsImageWriter {
    async fn write_chunk(&mut self, chunk: &[u8]) -> StorageResult<()> {
        let result = match self.file.as_mut() {
            Some(file) => file.write_all(chunk).await,
            None => return Ok(()),
        };
        result.map_err(|e| self.write_error(e))?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StorageResult<u64> {
        let mut this = self;
        if let Some(mut file) = this.file.take() {
            let synced = match file.flush().await {
                Ok(()) => file.sync_all().await,
                Err(e) => Err(e),
            };
            drop(file);
            if let Err(e) = synced {
                let _ = fs::remove_file(&this.part).await;
                return Err(this.write_error(e));
            }
        }

        if let Err(e) = fs::rename(&this.part, &this.target).await {
            let _ = fs::remove_file(&this.part).await;
            return Err(this.write_error(e));
        }

        Ok(this.written)
    }
}

impl Drop for FsImageWriter {
    fn drop(&mut self) {
        if self.file.take().is_some() {
            let _ = std::fs::remove_file(&self.part);
        }
    }
}
