//! Filesystem entries and their classification

use std::fs::{FileType, Metadata};
use std::path::{Path, PathBuf};

/// Type of filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Directory
    Directory,
    /// Regular file
    File,
    /// Symbolic link (never followed)
    Symlink,
    /// Block device
    BlockDevice,
    /// Character device
    CharacterDevice,
    /// Named pipe (FIFO)
    Fifo,
    /// Unix socket
    Socket,
    /// None of the above
    Unknown,
}

impl EntryKind {
    /// Classify an lstat file type.
    ///
    /// Non-directories are checked in a fixed priority order: symlink,
    /// block device, character device, FIFO, socket, regular file.
    pub fn from_file_type(file_type: FileType) -> Self {
        if file_type.is_dir() {
            return EntryKind::Directory;
        }
        if file_type.is_symlink() {
            return EntryKind::Symlink;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;

            if file_type.is_block_device() {
                return EntryKind::BlockDevice;
            }
            if file_type.is_char_device() {
                return EntryKind::CharacterDevice;
            }
            if file_type.is_fifo() {
                return EntryKind::Fifo;
            }
            if file_type.is_socket() {
                return EntryKind::Socket;
            }
        }

        if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Unknown
        }
    }

    /// Check if this is a directory
    pub fn is_dir(&self) -> bool {
        *self == EntryKind::Directory
    }

    /// Name of the type-specific event emitted for this kind, or `None`
    /// for `Unknown`, which is reported as an error instead
    pub fn event_name(&self) -> Option<&'static str> {
        match self {
            EntryKind::Directory => Some("dir"),
            EntryKind::File => Some("file"),
            EntryKind::Symlink => Some("symlink"),
            EntryKind::BlockDevice => Some("blockDevice"),
            EntryKind::CharacterDevice => Some("characterDevice"),
            EntryKind::Fifo => Some("fifo"),
            EntryKind::Socket => Some("socket"),
            EntryKind::Unknown => None,
        }
    }
}

/// A classified path and its lstat metadata
#[derive(Debug, Clone)]
pub struct Entry {
    path: PathBuf,
    metadata: Metadata,
    kind: EntryKind,
}

impl Entry {
    pub fn new(path: PathBuf, metadata: Metadata) -> Self {
        let kind = EntryKind::from_file_type(metadata.file_type());
        Self {
            path,
            metadata,
            kind,
        }
    }

    /// Build an entry with a forced kind. `Unknown` never comes out of
    /// `std::fs::Metadata` on unix, where every `S_IFMT` type has a variant,
    /// so it cannot be produced through a `FileSystem` either.
    #[cfg(test)]
    pub(crate) fn with_kind(path: PathBuf, metadata: Metadata, kind: EntryKind) -> Self {
        Self {
            path,
            metadata,
            kind,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}
