//! Symbolic link management
//!
//! Points the build-time application path at the persistent mount.

use log::info;
use std::fs;
use std::io::ErrorKind;
use std::os::unix::fs::symlink;
use std::path::Path;

use crate::error::FileSystemError;
use crate::storage::results::{EntryKind, SymlinkOutcome};

/// Make `link_path` a symlink that resolves to `target_path`.
///
/// A correct link is left untouched. Anything else at `link_path` (a file, a
/// directory, a dangling or wrong link) is removed before the link is created.
pub fn ensure_symlink(
    link_path: &Path,
    target_path: &Path,
) -> Result<SymlinkOutcome, FileSystemError> {
    match fs::symlink_metadata(link_path) {
        Ok(metadata) => {
            let kind = EntryKind::from(metadata.file_type());
            if kind == EntryKind::Symlink && points_to(link_path, target_path) {
                info!(
                    "Symbolic link {} already exists and is correct",
                    link_path.display()
                );
                return Ok(SymlinkOutcome::Unchanged);
            }

            if kind == EntryKind::Directory && contains(link_path, target_path) {
                return Err(FileSystemError::LinkContainsTarget {
                    link: link_path.to_path_buf(),
                    target: target_path.to_path_buf(),
                });
            }
            remove_entry(link_path, kind)?;
            create_link(link_path, target_path)?;
            info!(
                "Replaced {:?} at {} with symbolic link -> {}",
                kind,
                link_path.display(),
                target_path.display()
            );
            Ok(SymlinkOutcome::Replaced { previous: kind })
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if let Some(parent) = link_path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| FileSystemError::CreateDirectory(parent.to_path_buf(), e))?;
            }
            create_link(link_path, target_path)?;
            info!(
                "Created symbolic link: {} -> {}",
                link_path.display(),
                target_path.display()
            );
            Ok(SymlinkOutcome::Created)
        }
        Err(e) => Err(FileSystemError::Inspect(link_path.to_path_buf(), e)),
    }
}

/// True if the link's stored target is `target`, or both resolve to the
/// same place.
fn points_to(link_path: &Path, target: &Path) -> bool {
    if let Ok(stored) = fs::read_link(link_path) {
        if stored == target {
            return true;
        }
    }
    match (fs::canonicalize(link_path), fs::canonicalize(target)) {
        (Ok(resolved), Ok(expected)) => resolved == expected,
        _ => false,
    }
}

/// True if `target` lies inside the directory `dir`, lexically or once both
/// are resolved.
fn contains(dir: &Path, target: &Path) -> bool {
    if target.starts_with(dir) {
        return true;
    }
    match (fs::canonicalize(dir), fs::canonicalize(target)) {
        (Ok(dir), Ok(target)) => target.starts_with(dir),
        _ => false,
    }
}

fn remove_entry(path: &Path, kind: EntryKind) -> Result<(), FileSystemError> {
    let result = match kind {
        EntryKind::Directory => fs::remove_dir_all(path),
        _ => fs::remove_file(path),
    };
    result.map_err(|e| FileSystemError::RemoveEntry(path.to_path_buf(), e))
}

fn create_link(link_path: &Path, target_path: &Path) -> Result<(), FileSystemError> {
    symlink(target_path, link_path).map_err(|source| FileSystemError::CreateSymlink {
        link: link_path.to_path_buf(),
        target: target_path.to_path_buf(),
        source,
    })
}
