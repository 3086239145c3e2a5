//! Storage result types
//!
//! Defines result structures returned by storage operations.

use std::fs::FileType;
use std::path::PathBuf;

/// Whether a directory was already there or had to be created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryState {
    Existing,
    Created,
}

/// Result of ensuring a directory exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDirectory {
    pub path: PathBuf,
    pub state: DirectoryState,
}

/// Kind of filesystem entry found at a path, without following symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Other,
}

impl From<FileType> for EntryKind {
    fn from(file_type: FileType) -> Self {
        if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        }
    }
}

/// Result of an ensure_symlink operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymlinkOutcome {
    /// Link already resolved to the target
    Unchanged,
    /// Nothing occupied the link path
    Created,
    /// An entry of this kind was removed first
    Replaced { previous: EntryKind },
}
