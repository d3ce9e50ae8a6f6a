//! Filesystem access used by the walker
//!
//! The engine only needs two operations: an lstat and a listing of child
//! names. Both are behind the [`FileSystem`] trait so the walk can run over
//! something other than the local disk (tests wrap [`LocalFs`] to inject
//! latency and failures).

use std::ffi::OsString;
use std::fs::Metadata;
use std::future::Future;
use std::io;
use std::path::Path;

/// Source of metadata and directory listings
pub trait FileSystem: Send + Sync + 'static {
    /// Metadata for `path` without following a final symbolic link
    fn symlink_metadata(&self, path: &Path) -> impl Future<Output = io::Result<Metadata>> + Send;

    /// Names of the immediate children of `path`, excluding `.` and `..`
    fn read_dir_names(&self, path: &Path)
        -> impl Future<Output = io::Result<Vec<OsString>>> + Send;
}

/// The local filesystem, through tokio's blocking-pool backed fs API
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    async fn symlink_metadata(&self, path: &Path) -> io::Result<Metadata> {
        tokio::fs::symlink_metadata(path).await
    }

    async fn read_dir_names(&self, path: &Path) -> io::Result<Vec<OsString>> {
        let mut dir = tokio::fs::read_dir(path).await?;
        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            names.push(entry.file_name());
        }
        Ok(names)
    }
}
