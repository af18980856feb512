//! # stowage
//!
//! A small upload store: files go in through a facade that names them with
//! sharded, collision-checked keys, and come back out through a pluggable
//! storage backend.
//!
//! ## Core Concepts
//!
//! - **Keys**: `a/1/c/<sha1>/photo.jpg` — a random hash split into
//!   single-character shard directories to bound directory fan-out
//! - **Adapters**: the [`StorageAdapter`] trait is the backend seam; the
//!   crate ships [`LocalAdapter`] for the filesystem
//! - **Value types**: [`InputFile`] describes a file before storage,
//!   [`StoredObject`] after
//!
//! ## Example
//!
//! ```no_run
//! use stowage::{InputFile, LocalAdapter, Uploader};
//!
//! # fn main() -> stowage::Result<()> {
//! let adapter = LocalAdapter::new("/var/uploads", "/uploads")?;
//! let uploader = Uploader::new(adapter, "/tmp");
//!
//! let key = uploader.upload(InputFile::new("photo.jpg", "/tmp/req-4213"))?;
//! let object = uploader.get(&key)?;
//! println!("serve it from {}", object.public_path());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod key;

mod error;
mod file;
mod object;
mod uploader;

pub use adapter::{LocalAdapter, StorageAdapter};
pub use error::{Error, Result};
pub use file::{InputFile, UploadDescriptor};
pub use object::StoredObject;
pub use uploader::{Uploader, MAX_KEY_ATTEMPTS};
