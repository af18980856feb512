//! Input-side value types
//!
//! [`InputFile`] describes a file before it lands in storage: a display
//! name plus the path where its bytes currently live. [`UploadDescriptor`]
//! is the loose form an outer transport layer hands over after parking a
//! request body in a temp file; it converts into an [`InputFile`] once both
//! fields are actually present.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A file waiting to be uploaded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputFile {
    base_name: String,
    path: PathBuf,
}

impl InputFile {
    /// Create an input file from a display name and a source path
    pub fn new(base_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        InputFile {
            base_name: base_name.into(),
            path: path.into(),
        }
    }

    /// The display name, including any extension
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// The display name without its extension
    pub fn file_name(&self) -> &str {
        match self.base_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => stem,
            _ => &self.base_name,
        }
    }

    /// The extension of the display name, if any
    pub fn extension(&self) -> Option<&str> {
        match self.base_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
            _ => None,
        }
    }

    /// Where the bytes currently live
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Raw upload descriptor from an outer transport layer.
///
/// Both fields are optional so the type can be deserialized from whatever
/// loosely shaped request data the transport produces; converting into an
/// [`InputFile`] enforces that both were actually supplied.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UploadDescriptor {
    /// Display name of the uploaded file
    pub name: Option<String>,
    /// Temp path where the transport parked the bytes
    pub tmp_path: Option<PathBuf>,
}

impl TryFrom<UploadDescriptor> for InputFile {
    type Error = Error;

    fn try_from(desc: UploadDescriptor) -> Result<InputFile> {
        let name = desc
            .name
            .ok_or_else(|| Error::InvalidInput("upload descriptor has no name".into()))?;
        let path = desc
            .tmp_path
            .ok_or_else(|| Error::InvalidInput("upload descriptor has no temp path".into()))?;
        Ok(InputFile::new(name, path))
    }
}
