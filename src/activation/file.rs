//! # File boundary for activation payloads.
//!
//! [`FileItem`] is the opaque handle an activation carries for an opened
//! storage item. The runtime only needs two things from it:
//! - a type query ([`FileItem::is_regular_file`]) checked **before** any read;
//! - a sequential read of the whole content ([`FileItem::read_all_bytes`]).
//!
//! [`LocalFile`] is the filesystem-backed implementation.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use activator::{FileItem, FileRef, LocalFile};
//!
//! let f: FileRef = Arc::new(LocalFile::new("/tmp/program.hex"));
//! assert_eq!(f.name(), "/tmp/program.hex");
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, BufReader};

/// Shared handle to an activated storage item.
pub type FileRef = Arc<dyn FileItem>;

/// # Opaque reference to an activated storage item.
///
/// The handle is not owned by the runtime; it is only valid for the duration
/// of the activation handling.
///
/// ### Implementation requirements
/// - `is_regular_file` must not read content.
/// - `read_all_bytes` returns the full content in order, or fails as a whole.
#[async_trait]
pub trait FileItem: Send + Sync + 'static {
    /// Display name used in events and errors.
    fn name(&self) -> &str;

    /// Returns `true` if the item is a regular file (not a folder or other item kind).
    async fn is_regular_file(&self) -> bool;

    /// Reads the whole content as an ordered byte sequence.
    async fn read_all_bytes(&self) -> std::io::Result<Vec<u8>>;
}

/// Filesystem-backed [`FileItem`].
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
}

impl LocalFile {
    /// Creates a handle for `path`. Nothing is touched until the handle is queried.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    /// Creates the handle and returns it as a shared [`FileRef`].
    pub fn arc(path: impl Into<PathBuf>) -> FileRef {
        Arc::new(Self::new(path))
    }

    /// Path this handle points at.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FileItem for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    /// A missing path is not a regular file. Any other metadata error is left
    /// for [`read_all_bytes`](FileItem::read_all_bytes) to surface as an I/O error.
    async fn is_regular_file(&self) -> bool {
        match tokio::fs::metadata(&self.path).await {
            Ok(m) => m.is_file(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "metadata query failed");
                true
            }
        }
    }

    async fn read_all_bytes(&self) -> std::io::Result<Vec<u8>> {
        let file = tokio::fs::File::open(&self.path).await?;
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_regular_file_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.hex");
        std::fs::write(&path, [0x3a, 0x10, 0x00, 0xff]).unwrap();

        let f = LocalFile::new(&path);
        assert_eq!(f.path(), path.as_path());
        assert!(f.is_regular_file().await);
        assert_eq!(f.read_all_bytes().await.unwrap(), vec![0x3a, 0x10, 0x00, 0xff]);
    }

    #[tokio::test]
    async fn test_directory_is_not_regular() {
        let dir = tempfile::tempdir().unwrap();
        let f = LocalFile::new(dir.path());
        assert!(!f.is_regular_file().await);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let f = LocalFile::new(dir.path().join("nope.hex"));
        assert!(!f.is_regular_file().await);
        assert!(f.read_all_bytes().await.is_err());
    }

    #[tokio::test]
    async fn test_unreadable_path_surfaces_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.hex");
        std::fs::write(&plain, b"x").unwrap();

        // A regular file used as a directory fails with ENOTDIR, not NotFound.
        let f = LocalFile::new(plain.join("child.hex"));
        assert!(f.is_regular_file().await);

        let err = crate::core::extract_bytes(&f).await.unwrap_err();
        assert_eq!(err.as_label(), "activation_io");
        assert!(err.as_message().contains("child.hex"));
    }
}
