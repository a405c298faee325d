//! Storage module for downloaded images
//!
//! The crawler needs little from its destination: make sure it exists, ask
//! whether a filename is taken, and stream an image in under a filename that
//! only appears once the image is complete. `FsImageStore` does this on disk;
//! `MemoryImageStore` keeps everything in memory.

mod fs;
mod memory;
mod traits;

pub use fs::FsImageStore;
pub use memory::MemoryImageStore;
pub use traits::{ImageStore, ImageWriter, StorageError, StorageResult};
