//! Pluggable storage backends
//!
//! The [`StorageAdapter`] trait is the seam between the
//! [`Uploader`](crate::Uploader) facade and whatever actually holds the
//! bytes. The crate ships a filesystem implementation; remote object stores
//! implement the same five operations.

mod local;

pub use local::LocalAdapter;

use crate::{InputFile, Result, StoredObject};
use std::path::Path;

/// Capability set a storage backend has to provide.
///
/// An existence probe (`has`) followed by `get` or `delete` is inherently
/// racy against concurrent deletion; callers get whichever error the second
/// operation produces. The crate provides no mutual exclusion — key entropy,
/// not locking, is what keeps writers apart.
pub trait StorageAdapter: Send + Sync {
    /// Place the input file's bytes under `key`
    fn upload(&self, key: &str, input: &InputFile) -> Result<()>;

    /// Return the read-side view of the file stored under `key`
    fn get(&self, key: &str) -> Result<StoredObject>;

    /// Copy the stored bytes out to `dest`. The stored file stays put.
    fn copy_to(&self, key: &str, dest: &Path) -> Result<()>;

    /// Whether a file is stored under `key`
    fn has(&self, key: &str) -> Result<bool>;

    /// Remove the file stored under `key`
    fn delete(&self, key: &str) -> Result<()>;
}
