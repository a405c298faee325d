//! In-memory image storage
//!
//! Useful for embedding the crawler where nothing should touch the disk, and
//! for asserting exactly which writes happened.

use crate::storage::traits::{ImageStore, ImageWriter, StorageResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MemoryInner {
    files: HashMap<String, Vec<u8>>,
    writes: usize,
}

fn lock(inner: &Mutex<MemoryInner>) -> MutexGuard<'_, MemoryInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Keeps images in a map keyed by filename
#[derive(Debug, Default)]
pub struct MemoryImageStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored bytes for a filename
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        lock(&self.inner).files.get(name).cloned()
    }

    /// Number of committed writes so far
    pub fn write_count(&self) -> usize {
        lock(&self.inner).writes
    }

    /// Stored filenames, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.inner).files.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    fn ensure_dir(&self) -> StorageResult<()> {
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        lock(&self.inner).files.contains_key(name)
    }

    async fn create(&self, name: &str) -> StorageResult<Box<dyn ImageWriter>> {
        Ok(Box::new(MemoryImageWriter {
            inner: Arc::clone(&self.inner),
            name: name.to_string(),
            buffer: Vec::new(),
        }))
    }

    fn location(&self, name: &str) -> PathBuf {
        PathBuf::from("memory:").join(name)
    }
}

/// Buffers one image until commit
struct MemoryImageWriter {
    inner: Arc<Mutex<MemoryInner>>,
    name: String,
    buffer: Vec<u8>,
}

#[async_trait]
impl ImageWriter for MemoryImageWriter {
    async fn write_chunk(&mut self, chunk: &[u8]) -> StorageResult<()> {
        self.buffer.extend_from_slice(chunk);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StorageResult<u64> {
        let MemoryImageWriter {
            inner,
            name,
            buffer,
        } = *self;
        let written = buffer.len() as u64;
        let mut guard = lock(&inner);
        guard.files.insert(name, buffer);
        guard.writes += 1;
        Ok(written)
    }
}
