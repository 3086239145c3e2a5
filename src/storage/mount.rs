//! Mount point preparation
//!
//! Validates that the persistent volume is attached and creates the mount
//! directory and its temp subdirectory.

use log::{info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::error::{BootstrapError, ConfigurationError, FileSystemError};
use crate::storage::results::{DirectoryState, PreparedDirectory};

/// Make sure `mount_path` exists as a directory.
///
/// The parent must already exist. A missing parent means the volume is not
/// attached; nothing is created in that case.
pub fn ensure_mount_ready(mount_path: &Path) -> Result<PreparedDirectory, BootstrapError> {
    if !mount_path.is_absolute() {
        return Err(ConfigurationError::RelativePath {
            field: "mount_path",
            path: mount_path.to_path_buf(),
        }
        .into());
    }

    if let Some(parent) = mount_path.parent() {
        if !parent.is_dir() {
            return Err(ConfigurationError::MountParentMissing(mount_path.to_path_buf()).into());
        }
    }

    match fs::metadata(mount_path) {
        Ok(metadata) if metadata.is_dir() => {
            info!("Mount path {} is present", mount_path.display());
            Ok(PreparedDirectory {
                path: mount_path.to_path_buf(),
                state: DirectoryState::Existing,
            })
        }
        Ok(_) => Err(ConfigurationError::MountNotADirectory(mount_path.to_path_buf()).into()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(
                "Mount path {} is missing, creating it",
                mount_path.display()
            );
            fs::create_dir_all(mount_path)
                .map_err(|e| FileSystemError::CreateDirectory(mount_path.to_path_buf(), e))?;
            Ok(PreparedDirectory {
                path: mount_path.to_path_buf(),
                state: DirectoryState::Created,
            })
        }
        Err(e) => Err(FileSystemError::Inspect(mount_path.to_path_buf(), e).into()),
    }
}

/// Create `mount_path/name` for the application's scratch files.
pub fn ensure_temp_dir(
    mount_path: &Path,
    name: &str,
) -> Result<PreparedDirectory, BootstrapError> {
    validate_temp_dir_name(name)?;
    let path = temp_dir_path(mount_path, name);

    if path.is_dir() {
        return Ok(PreparedDirectory {
            path,
            state: DirectoryState::Existing,
        });
    }

    fs::create_dir_all(&path).map_err(|e| FileSystemError::CreateDirectory(path.clone(), e))?;
    info!("Created temp directory {}", path.display());
    Ok(PreparedDirectory {
        path,
        state: DirectoryState::Created,
    })
}

/// A temp directory name must be exactly one plain path component
pub fn validate_temp_dir_name(name: &str) -> Result<(), ConfigurationError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ConfigurationError::InvalidTempDirName(name.to_string())),
    }
}

/// Path of the temp directory for a given mount
pub fn temp_dir_path(mount_path: &Path, name: &str) -> PathBuf {
    mount_path.join(name)
}
