//! Read-side view of a stored file

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// A file already placed in storage.
///
/// Holds nothing but the two paths; every accessor that touches content or
/// metadata goes back to the filesystem, so the view is only as fresh as
/// the moment it is asked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    local_path: PathBuf,
    public_path: String,
}

impl StoredObject {
    /// Create a view over a file on the backing store.
    ///
    /// Adapters build these; `local_path` is where the bytes live and
    /// `public_path` is the externally reachable path derived from the key.
    pub fn new(local_path: impl Into<PathBuf>, public_path: impl Into<String>) -> Self {
        StoredObject {
            local_path: local_path.into(),
            public_path: public_path.into(),
        }
    }

    /// Path of the file on the backing store
    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    /// Externally reachable path, e.g. `/uploads/a/1/c/<hash>/photo.jpg`
    pub fn public_path(&self) -> &str {
        &self.public_path
    }

    /// Read the entire file into memory
    pub fn content(&self) -> Result<Vec<u8>> {
        fs::read(&self.local_path).map_err(|e| Error::io(&self.local_path, e))
    }

    /// Base name of the stored file
    pub fn basename(&self) -> &str {
        self.local_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Extension of the stored file, if any
    pub fn extension(&self) -> Option<&str> {
        self.local_path.extension().and_then(|e| e.to_str())
    }

    /// Size of the stored file in bytes
    pub fn content_length(&self) -> Result<u64> {
        let meta = fs::metadata(&self.local_path).map_err(|e| Error::io(&self.local_path, e))?;
        Ok(meta.len())
    }

    /// Media type sniffed from the file's magic bytes.
    ///
    /// Falls back to `application/octet-stream` when nothing matches.
    pub fn content_type(&self) -> Result<String> {
        let kind =
            infer::get_from_path(&self.local_path).map_err(|e| Error::io(&self.local_path, e))?;
        Ok(kind
            .map(|k| k.mime_type().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string()))
    }

    /// Last modification time of the stored file
    pub fn last_modified(&self) -> Result<DateTime<Utc>> {
        let meta = fs::metadata(&self.local_path).map_err(|e| Error::io(&self.local_path, e))?;
        let modified = meta.modified().map_err(|e| Error::io(&self.local_path, e))?;
        Ok(modified.into())
    }
}

/// Displays as the public path, for embedding in templates and URLs
impl fmt::Display for StoredObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.public_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_content_and_length() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("note.txt");
        fs::write(&path, b"hello stowage").unwrap();

        let object = StoredObject::new(&path, "/uploads/note.txt");
        assert_eq!(object.content().unwrap(), b"hello stowage");
        assert_eq!(object.content_length().unwrap(), 13);
    }

    #[test]
    fn test_name_accessors() {
        let object = StoredObject::new("/data/a/1/c/abc/My-Photo.JPG", "/uploads/My-Photo.JPG");
        assert_eq!(object.basename(), "My-Photo.JPG");
        assert_eq!(object.extension(), Some("JPG"));
    }

    #[test]
    fn test_content_type_sniffing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("img.png");
        // A real PNG header is enough for magic-byte detection
        fs::write(&path, b"\x89PNG\r\n\x1a\n0000").unwrap();

        let object = StoredObject::new(&path, "/uploads/img.png");
        assert_eq!(object.content_type().unwrap(), "image/png");
    }

    #[test]
    fn test_content_type_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.bin");
        fs::write(&path, b"nothing recognizable").unwrap();

        let object = StoredObject::new(&path, "/uploads/data.bin");
        assert_eq!(object.content_type().unwrap(), "application/octet-stream");
    }

    #[test]
    fn test_display_is_public_path() {
        let object = StoredObject::new("/data/x", "/uploads/x");
        assert_eq!(object.to_string(), "/uploads/x");
    }

    #[test]
    fn test_missing_file_errors() {
        let object = StoredObject::new("/nonexistent/file", "/uploads/file");
        assert!(matches!(object.content(), Err(Error::Io { .. })));
    }
}
