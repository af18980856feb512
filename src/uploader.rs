//! High-level upload facade
//!
//! Ties key generation to a [`StorageAdapter`]: callers hand a file in and
//! get back the key that addresses it from then on. All byte placement is
//! delegated; adapter errors surface unchanged.

use crate::adapter::StorageAdapter;
use crate::key;
use crate::{Error, InputFile, Result, StoredObject};
use std::path::PathBuf;

/// How many times `upload` re-rolls a colliding key before giving up
pub const MAX_KEY_ATTEMPTS: u32 = 8;

/// The main upload interface
///
/// Validates input, names files with sharded collision-checked keys and
/// delegates storage to the configured backend.
pub struct Uploader {
    adapter: Box<dyn StorageAdapter>,
    tmp_dir: PathBuf,
}

impl Uploader {
    /// Create an uploader over the given backend.
    ///
    /// `tmp_dir` is where [`export`](Uploader::export) parks its copies. It
    /// is passed in explicitly rather than probed from the environment.
    pub fn new(adapter: impl StorageAdapter + 'static, tmp_dir: impl Into<PathBuf>) -> Self {
        Uploader {
            adapter: Box::new(adapter),
            tmp_dir: tmp_dir.into(),
        }
    }

    /// Swap the storage backend at runtime
    pub fn set_adapter(&mut self, adapter: impl StorageAdapter + 'static) {
        self.adapter = Box::new(adapter);
    }

    /// The active storage backend
    pub fn adapter(&self) -> &dyn StorageAdapter {
        self.adapter.as_ref()
    }

    /// Upload a file and return the key it is stored under.
    ///
    /// Accepts an [`InputFile`] or anything that converts into one, such as
    /// an [`UploadDescriptor`](crate::UploadDescriptor) coming out of a
    /// transport layer.
    pub fn upload<F>(&self, input: F) -> Result<String>
    where
        F: TryInto<InputFile>,
        Error: From<F::Error>,
    {
        let input = input.try_into()?;

        let key = self.free_key(input.base_name())?;
        self.adapter.upload(&key, &input)?;

        Ok(key)
    }

    /// Generate a key no stored object is using yet.
    ///
    /// Collisions are astronomically unlikely, so exhausting the attempt
    /// cap means the backend is answering `has` wrongly rather than the
    /// dice running cold.
    fn free_key(&self, basename: &str) -> Result<String> {
        for _ in 0..MAX_KEY_ATTEMPTS {
            let key = key::generate(basename);
            if !self.adapter.has(&key)? {
                return Ok(key);
            }
        }
        Err(Error::KeyCollision {
            attempts: MAX_KEY_ATTEMPTS,
        })
    }

    /// Read-side view of the file stored under `key`
    pub fn get(&self, key: &str) -> Result<StoredObject> {
        require_key(key)?;
        self.adapter.get(key)
    }

    /// Copy a stored file out into a fresh temp file.
    ///
    /// The returned [`InputFile`] keeps the stored object's basename and
    /// points at the new copy; the stored file itself stays put.
    pub fn export(&self, key: &str) -> Result<InputFile> {
        require_key(key)?;

        let object = self.adapter.get(key)?;

        let tmp = tempfile::Builder::new()
            .prefix("stowage")
            .tempfile_in(&self.tmp_dir)
            .map_err(|e| Error::io(&self.tmp_dir, e))?;
        // Detach the file from its guard so it outlives this call
        let (_, path) = tmp.keep().map_err(|e| Error::io(&self.tmp_dir, e.error))?;

        self.adapter.copy_to(key, &path)?;

        Ok(InputFile::new(object.basename(), path))
    }

    /// Whether a stored object exists under `key`. Non-throwing probe:
    /// empty keys and backend failures both read as `false`.
    pub fn has(&self, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }
        self.adapter.has(key).unwrap_or(false)
    }

    /// Delete the file stored under `key`
    pub fn delete(&self, key: &str) -> Result<()> {
        require_key(key)?;
        self.adapter.delete(key)
    }
}

fn require_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidInput("key must be provided".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::LocalAdapter;
    use crate::UploadDescriptor;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn uploader(root: &Path, tmp: &Path) -> Uploader {
        Uploader::new(LocalAdapter::new(root, "/uploads").unwrap(), tmp)
    }

    fn staged_file(dir: &Path, name: &str, content: &[u8]) -> InputFile {
        let src = dir.join("staged");
        fs::write(&src, content).unwrap();
        InputFile::new(name, src)
    }

    #[test]
    fn test_upload_roundtrip() {
        let root = tempdir().unwrap();
        let tmp = tempdir().unwrap();
        let uploader = uploader(root.path(), tmp.path());

        let input = staged_file(tmp.path(), "My Photo.JPG", b"jpeg bytes");
        let key = uploader.upload(input).unwrap();

        assert!(key.ends_with("/My-Photo.JPG"));
        assert_eq!(key.split('/').count(), 5);
        assert!(uploader.has(&key));

        let object = uploader.get(&key).unwrap();
        assert_eq!(object.content().unwrap(), b"jpeg bytes");
        assert_eq!(object.basename(), "My-Photo.JPG");
    }

    #[test]
    fn test_upload_from_descriptor() {
        let root = tempdir().unwrap();
        let tmp = tempdir().unwrap();
        let uploader = uploader(root.path(), tmp.path());

        let src = tmp.path().join("req-body");
        fs::write(&src, b"descriptor bytes").unwrap();

        let key = uploader
            .upload(UploadDescriptor {
                name: Some("cv.pdf".into()),
                tmp_path: Some(src),
            })
            .unwrap();

        assert_eq!(uploader.get(&key).unwrap().content().unwrap(), b"descriptor bytes");
    }

    #[test]
    fn test_upload_rejects_malformed_descriptor() {
        let root = tempdir().unwrap();
        let tmp = tempdir().unwrap();
        let uploader = uploader(root.path(), tmp.path());

        let result = uploader.upload(UploadDescriptor::default());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_export_copies_content_and_basename() {
        let root = tempdir().unwrap();
        let tmp = tempdir().unwrap();
        let uploader = uploader(root.path(), tmp.path());

        let key = uploader
            .upload(staged_file(tmp.path(), "report.txt", b"quarterly"))
            .unwrap();

        let exported = uploader.export(&key).unwrap();
        assert_eq!(exported.base_name(), "report.txt");
        assert_eq!(fs::read(exported.path()).unwrap(), b"quarterly");
        assert!(exported.path().starts_with(tmp.path()));

        // The stored object is untouched
        assert!(uploader.has(&key));
    }

    #[test]
    fn test_delete_then_has_is_false() {
        let root = tempdir().unwrap();
        let tmp = tempdir().unwrap();
        let uploader = uploader(root.path(), tmp.path());

        let key = uploader
            .upload(staged_file(tmp.path(), "gone.txt", b"x"))
            .unwrap();
        uploader.delete(&key).unwrap();

        assert!(!uploader.has(&key));
        assert!(matches!(uploader.delete(&key), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_empty_key_handling() {
        let root = tempdir().unwrap();
        let tmp = tempdir().unwrap();
        let uploader = uploader(root.path(), tmp.path());

        assert!(!uploader.has(""));
        assert!(matches!(uploader.get(""), Err(Error::InvalidInput(_))));
        assert!(matches!(uploader.export(""), Err(Error::InvalidInput(_))));
        assert!(matches!(uploader.delete(""), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_set_adapter_swaps_backend() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        let tmp = tempdir().unwrap();

        let mut uploader = uploader(first.path(), tmp.path());
        let key = uploader
            .upload(staged_file(tmp.path(), "a.txt", b"a"))
            .unwrap();
        assert!(uploader.has(&key));

        uploader.set_adapter(LocalAdapter::new(second.path(), "/uploads").unwrap());
        assert!(!uploader.has(&key), "new backend has no such object");
    }

    /// Backend that claims every key is taken
    struct SaturatedAdapter;

    impl StorageAdapter for SaturatedAdapter {
        fn upload(&self, _key: &str, _input: &InputFile) -> Result<()> {
            Ok(())
        }
        fn get(&self, key: &str) -> Result<StoredObject> {
            Err(Error::NotFound(key.to_string()))
        }
        fn copy_to(&self, _key: &str, _dest: &Path) -> Result<()> {
            Ok(())
        }
        fn has(&self, _key: &str) -> Result<bool> {
            Ok(true)
        }
        fn delete(&self, key: &str) -> Result<()> {
            Err(Error::NotFound(key.to_string()))
        }
    }

    #[test]
    fn test_collision_retry_is_bounded() {
        let tmp = tempdir().unwrap();
        let uploader = Uploader::new(SaturatedAdapter, tmp.path());

        let result = uploader.upload(staged_file(tmp.path(), "a.txt", b"a"));
        assert!(matches!(
            result,
            Err(Error::KeyCollision {
                attempts: MAX_KEY_ATTEMPTS
            })
        ));
    }
}
