//! Error types for tree-walker
//!
//! Two layers of errors exist:
//! - `EntryError`: a problem with a single path (stat, listing, unknown
//!   type, a panic while processing it). These are reported through the
//!   event stream and never stop the walk.
//! - `WalkerError`: a failure to start or drive the walk at all
//!   (bad configuration, runtime construction, a dropped event stream).
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Always carry the offending path
//! - Preserve the underlying `io::Error` as the source

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level error type for tree-walker
#[derive(Error, Debug)]
pub enum WalkerError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors (runtime construction, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The event channel closed before the walk signalled `end`
    #[error("Event channel closed before the walk finished")]
    ChannelClosed,
}

/// A non-fatal failure attached to one path of the tree
#[derive(Error, Debug)]
pub enum EntryError {
    /// lstat failed (entry vanished, permission denied, ...)
    #[error("Failed to stat '{}': {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Listing a directory failed
    #[error("Failed to read directory '{}': {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Metadata matched none of the known entry types
    #[error("The type of this file could not be determined: '{}'", path.display())]
    UnknownFileType { path: PathBuf },

    /// Processing this path panicked (e.g. inside the directory filter)
    #[error("Panicked while processing '{}': {message}", path.display())]
    Panicked { path: PathBuf, message: String },
}

impl EntryError {
    /// Returns the path associated with this error
    pub fn path(&self) -> &Path {
        match self {
            EntryError::Stat { path, .. } => path,
            EntryError::ReadDir { path, .. } => path,
            EntryError::UnknownFileType { path } => path,
            EntryError::Panicked { path, .. } => path,
        }
    }

    /// Check if this error is a not-found race (path removed mid-walk)
    pub fn is_not_found(&self) -> bool {
        match self {
            EntryError::Stat { source, .. } | EntryError::ReadDir { source, .. } => {
                source.kind() == io::ErrorKind::NotFound
            }
            EntryError::UnknownFileType { .. } | EntryError::Panicked { .. } => false,
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Root path was empty
    #[error("Root path must not be empty")]
    EmptyRoot,

    /// Invalid I/O concurrency
    #[error("Invalid I/O concurrency {count}: must be between 1 and {max}")]
    InvalidConcurrency { count: usize, max: usize },
}

/// Result type alias for WalkerError
pub type Result<T> = std::result::Result<T, WalkerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_error_not_found() {
        let missing = EntryError::Stat {
            path: "/missing".into(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(missing.is_not_found());
        assert_eq!(missing.path(), Path::new("/missing"));

        let denied = EntryError::ReadDir {
            path: "/secret".into(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(!denied.is_not_found());

        let unknown = EntryError::UnknownFileType { path: "/odd".into() };
        assert!(!unknown.is_not_found());
        assert!(unknown.to_string().contains("could not be determined"));
    }

    #[test]
    fn test_panicked_error_message() {
        let err = EntryError::Panicked {
            path: "/data/boom".into(),
            message: "filter exploded".into(),
        };
        assert!(!err.is_not_found());
        assert_eq!(err.path(), Path::new("/data/boom"));
        assert_eq!(
            err.to_string(),
            "Panicked while processing '/data/boom': filter exploded"
        );
    }

    #[test]
    fn test_error_conversion() {
        let config_err = ConfigError::InvalidConcurrency { count: 0, max: 512 };
        let walker_err: WalkerError = config_err.into();
        assert!(matches!(walker_err, WalkerError::Config(_)));
    }
}
