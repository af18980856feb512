//! Filesystem-backed storage adapter

use crate::adapter::StorageAdapter;
use crate::{Error, InputFile, Result, StoredObject};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Stores files below a writable upload root, mirroring each key's sharded
/// layout as real directories.
pub struct LocalAdapter {
    upload_root: PathBuf,
    public_root: String,
}

impl LocalAdapter {
    /// Create an adapter over `upload_root`, serving files under
    /// `public_root`.
    ///
    /// The root must be an existing directory and writable; writability is
    /// probed with a real temp-file write rather than a metadata peek.
    pub fn new(upload_root: impl AsRef<Path>, public_root: impl Into<String>) -> Result<Self> {
        let upload_root = upload_root.as_ref();
        if upload_root.as_os_str().is_empty() {
            return Err(Error::InvalidInput("upload root must be provided".into()));
        }

        let upload_root = upload_root.canonicalize().map_err(|e| {
            Error::Config(format!(
                "{} is not a usable directory: {e}",
                upload_root.display()
            ))
        })?;
        if !upload_root.is_dir() {
            return Err(Error::Config(format!(
                "{} is not a directory",
                upload_root.display()
            )));
        }
        if tempfile::tempfile_in(&upload_root).is_err() {
            return Err(Error::Config(format!(
                "{} is not a writable directory",
                upload_root.display()
            )));
        }

        let public_root: String = public_root.into();
        let public_root = public_root
            .trim_end_matches(|c| c == '/' || c == '\\')
            .to_string();

        Ok(LocalAdapter {
            upload_root,
            public_root,
        })
    }

    /// The canonicalized upload root
    pub fn upload_root(&self) -> &Path {
        &self.upload_root
    }

    /// Resolve a key to its physical path below the upload root
    fn file_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.upload_root.join(key))
    }

    /// Public serving path for a key
    fn public_path(&self, key: &str) -> String {
        format!("{}/{}", self.public_root, key)
    }

    /// Remove empty directories above `path`, walking upward and stopping
    /// at the upload root, which is never removed. A non-empty or
    /// unreadable directory ends the walk.
    fn prune(&self, path: &Path) {
        let mut dir = path.parent();
        while let Some(d) = dir {
            if d == self.upload_root {
                break;
            }
            match fs::read_dir(d) {
                Ok(mut entries) => {
                    if entries.next().is_some() {
                        break;
                    }
                }
                _ => break,
            }
            if fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }
    }
}

impl StorageAdapter for LocalAdapter {
    fn upload(&self, key: &str, input: &InputFile) -> Result<()> {
        let dest = self.file_path(key)?;
        if let Some(dir) = dest.parent() {
            fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        }

        if let Err(err) = place(input.path(), &dest) {
            // The file never landed, so the shard directories made for it
            // are empty again; take them back out.
            self.prune(&dest);
            return Err(Error::io(input.path(), err));
        }

        debug!(key, path = %dest.display(), "file stored");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<StoredObject> {
        if !self.has(key)? {
            return Err(Error::NotFound(key.to_string()));
        }
        Ok(StoredObject::new(
            self.file_path(key)?,
            self.public_path(key),
        ))
    }

    fn copy_to(&self, key: &str, dest: &Path) -> Result<()> {
        let source = self.file_path(key)?;
        fs::copy(&source, dest).map_err(|e| Error::io(&source, e))?;
        Ok(())
    }

    fn has(&self, key: &str) -> Result<bool> {
        Ok(self.file_path(key)?.is_file())
    }

    fn delete(&self, key: &str) -> Result<()> {
        if !self.has(key)? {
            return Err(Error::NotFound(key.to_string()));
        }

        let path = self.file_path(key)?;
        fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
        self.prune(&path);

        debug!(key, "file deleted");
        Ok(())
    }
}

/// Keys are relative, slash-separated and never step out of the root
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidInput("key must be provided".into()));
    }
    for component in Path::new(key).components() {
        match component {
            Component::Normal(_) => {}
            _ => return Err(Error::InvalidInput(format!("malformed key: {key}"))),
        }
    }
    Ok(())
}

/// Move `src` into `dest`, falling back to copy + remove when the rename
/// fails (temp dirs often live on another filesystem), then normalize
/// permissions the way a classic upload directory expects.
fn place(src: &Path, dest: &Path) -> std::io::Result<()> {
    if fs::rename(src, dest).is_err() {
        if let Err(err) = fs::copy(src, dest) {
            // Never leave a half-written destination behind
            let _ = fs::remove_file(dest);
            return Err(err);
        }
        fs::remove_file(src)?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dest, fs::Permissions::from_mode(0o660))?;
    }

    Ok(())
}
