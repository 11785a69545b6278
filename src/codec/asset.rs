//! Asset staging
//!
//! Blobs are written to uniquely named files in a staging directory and
//! referenced by handle. Once a handle has been handed to the store, the file's
//! lifetime belongs to the store; this codec never deletes staged files.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::record::AssetHandle;

/// Result type for asset operations
pub type AssetResult<T> = Result<T, AssetError>;

/// Asset staging errors
#[derive(Debug, Clone, Error)]
pub enum AssetError {
    #[error("Failed to write asset {}: {}", .path.display(), .reason)]
    Write { path: PathBuf, reason: String },

    #[error("Failed to read {}: {}", .path.display(), .reason)]
    Read { path: PathBuf, reason: String },

    #[error("Asset not found: {}", .path.display())]
    Missing { path: PathBuf },
}

/// Converts between byte blobs and staged asset handles
#[derive(Debug, Clone)]
pub struct AssetCodec {
    staging_dir: PathBuf,
}

impl AssetCodec {
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
        }
    }

    /// Staging under the system temp directory
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir().join("recordkit-assets"))
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Write a blob to a fresh staging file
    pub fn to_asset(&self, blob: &[u8]) -> AssetResult<AssetHandle> {
        fs::create_dir_all(&self.staging_dir).map_err(|e| AssetError::Write {
            path: self.staging_dir.clone(),
            reason: e.to_string(),
        })?;

        let path = self.staging_dir.join(format!("{}.asset", Uuid::new_v4()));
        fs::write(&path, blob).map_err(|e| AssetError::Write {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        Ok(AssetHandle::new(path))
    }

    /// Read a staged blob back
    pub fn from_asset(&self, handle: &AssetHandle) -> AssetResult<Vec<u8>> {
        fs::read(&handle.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AssetError::Missing {
                    path: handle.path.clone(),
                }
            } else {
                AssetError::Read {
                    path: handle.path.clone(),
                    reason: e.to_string(),
                }
            }
        })
    }

    /// Read the content at `source` and stage it
    pub fn stage_file(&self, source: &Path) -> AssetResult<AssetHandle> {
        let content = fs::read(source).map_err(|e| AssetError::Read {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
        self.to_asset(&content)
    }
}

impl Default for AssetCodec {
    fn default() -> Self {
        Self::in_temp_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_blob_round_trip() {
        let temp = TempDir::new().unwrap();
        let codec = AssetCodec::new(temp.path().join("assets"));

        for blob in [Vec::new(), b"hello".to_vec(), (0..=255u8).collect::<Vec<_>>()] {
            let handle = codec.to_asset(&blob).unwrap();
            assert!(handle.path.starts_with(codec.staging_dir()));
            assert_eq!(codec.from_asset(&handle).unwrap(), blob);
        }
    }

    #[test]
    fn test_each_blob_gets_its_own_file() {
        let temp = TempDir::new().unwrap();
        let codec = AssetCodec::new(temp.path());

        let a = codec.to_asset(b"same").unwrap();
        let b = codec.to_asset(b"same").unwrap();
        assert_ne!(a.path, b.path);
    }

    #[test]
    fn test_missing_asset() {
        let temp = TempDir::new().unwrap();
        let codec = AssetCodec::new(temp.path());

        let handle = AssetHandle::new(temp.path().join("gone.asset"));
        assert!(matches!(codec.from_asset(&handle), Err(AssetError::Missing { .. })));
    }

    #[test]
    fn test_write_failure_reports_path() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let codec = AssetCodec::new(blocker.join("assets"));
        let err = codec.to_asset(b"data").unwrap_err();
        assert!(matches!(err, AssetError::Write { .. }));
        assert!(err.to_string().contains("not-a-dir"));
    }

    #[test]
    fn test_stage_file_copies_content() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("photo.bin");
        std::fs::write(&source, b"\x89PNG").unwrap();

        let codec = AssetCodec::new(temp.path().join("staging"));
        let handle = codec.stage_file(&source).unwrap();
        assert_ne!(handle.path, source);
        assert_eq!(codec.from_asset(&handle).unwrap(), b"\x89PNG");

        let missing = codec.stage_file(&temp.path().join("nope.bin"));
        assert!(matches!(missing, Err(AssetError::Read { .. })));
    }
}
