//! Permission repair strategies
//!
//! Each strategy handles one concern (ownership or mode) for a whole tree.
//! Strategies are tried in order by a [`StrategyChain`](super::repair::StrategyChain).

use log::debug;
use nix::errno::Errno;
use nix::unistd::{Gid, Uid, chown};
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;
use walkdir::WalkDir;

use crate::error::{ConfigurationError, PermissionError};
use crate::permissions::descriptor::OwnershipDescriptor;

/// A single way of applying part of an [`OwnershipDescriptor`] recursively.
pub trait PermissionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, path: &Path, descriptor: &OwnershipDescriptor) -> Result<(), PermissionError>;
}

/// Build an ownership strategy from its configured name.
pub fn ownership_strategy(name: &str) -> Result<Box<dyn PermissionStrategy>, ConfigurationError> {
    match name {
        "direct" => Ok(Box::new(DirectChown)),
        "shell" => Ok(Box::new(ShellChown)),
        other => Err(ConfigurationError::UnknownStrategy(format!(
            "ownership/{}",
            other
        ))),
    }
}

/// Build a mode strategy from its configured name.
pub fn mode_strategy(name: &str) -> Result<Box<dyn PermissionStrategy>, ConfigurationError> {
    match name {
        "walk" => Ok(Box::new(WalkChmod)),
        "shell" => Ok(Box::new(ShellChmod)),
        other => Err(ConfigurationError::UnknownStrategy(format!("mode/{}", other))),
    }
}

/// chown(2) on every entry of the tree. Symlinks are skipped so their
/// targets outside the tree are never touched.
pub struct DirectChown;

impl PermissionStrategy for DirectChown {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn apply(&self, path: &Path, descriptor: &OwnershipDescriptor) -> Result<(), PermissionError> {
        let uid = descriptor.uid.map(Uid::from_raw);
        let gid = descriptor.gid.map(Gid::from_raw);

        for entry in WalkDir::new(path).follow_links(false) {
            let entry = entry.map_err(|e| walk_error(path, e))?;
            if entry.path_is_symlink() {
                continue;
            }
            chown(entry.path(), uid, gid).map_err(|errno| errno_error(entry.path(), errno))?;
        }
        Ok(())
    }
}

/// `chown -R` in a subprocess
pub struct ShellChown;

impl PermissionStrategy for ShellChown {
    fn name(&self) -> &'static str {
        "shell"
    }

    fn apply(&self, path: &Path, descriptor: &OwnershipDescriptor) -> Result<(), PermissionError> {
        let Some(owner) = descriptor.chown_arg() else {
            return Ok(());
        };
        run_command(Command::new("chown").arg("-R").arg(owner).arg(path))
    }
}

/// Per-entry set_permissions(2). Works without privileges on trees the
/// current user owns. Directories are changed after their contents, so modes
/// that drop the owner's `r` or `x` bits still reach the whole tree.
pub struct WalkChmod;

impl PermissionStrategy for WalkChmod {
    fn name(&self) -> &'static str {
        "walk"
    }

    fn apply(&self, path: &Path, descriptor: &OwnershipDescriptor) -> Result<(), PermissionError> {
        for entry in WalkDir::new(path).follow_links(false).contents_first(true) {
            let entry = entry.map_err(|e| walk_error(path, e))?;
            if entry.path_is_symlink() {
                continue;
            }

            let metadata = entry
                .metadata()
                .map_err(|e| walk_error(entry.path(), e))?;
            let current = metadata.permissions().mode() & 0o7777;
            let wanted = descriptor.mode.apply(current, metadata.is_dir());
            if wanted == current {
                continue;
            }

            debug!(
                "chmod {:o} -> {:o} {}",
                current,
                wanted,
                entry.path().display()
            );
            fs::set_permissions(entry.path(), fs::Permissions::from_mode(wanted))
                .map_err(|e| io_error(entry.path(), e))?;
        }
        Ok(())
    }
}

/// `chmod -R` in a subprocess
pub struct ShellChmod;

impl PermissionStrategy for ShellChmod {
    fn name(&self) -> &'static str {
        "shell"
    }

    fn apply(&self, path: &Path, descriptor: &OwnershipDescriptor) -> Result<(), PermissionError> {
        run_command(
            Command::new("chmod")
                .arg("-R")
                .arg(descriptor.mode.to_string())
                .arg(path),
        )
    }
}

fn run_command(command: &mut Command) -> Result<(), PermissionError> {
    let rendered = render(command);
    debug!("Running {}", rendered);

    let output = command
        .output()
        .map_err(|e| PermissionError::CommandFailed {
            command: rendered.clone(),
            detail: e.to_string(),
        })?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let detail = if stderr.is_empty() {
        output.status.to_string()
    } else {
        format!("{} ({})", stderr, output.status)
    };
    Err(PermissionError::CommandFailed {
        command: rendered,
        detail,
    })
}

fn render(command: &Command) -> String {
    let mut parts = vec![command.get_program().to_string_lossy().into_owned()];
    parts.extend(command.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

fn errno_error(path: &Path, errno: Errno) -> PermissionError {
    match errno {
        Errno::EPERM | Errno::EACCES => {
            PermissionError::Denied(path.to_path_buf(), errno.desc().to_string())
        }
        other => PermissionError::Io(path.to_path_buf(), io::Error::from(other)),
    }
}

fn io_error(path: &Path, error: io::Error) -> PermissionError {
    if error.kind() == io::ErrorKind::PermissionDenied {
        PermissionError::Denied(path.to_path_buf(), error.to_string())
    } else {
        PermissionError::Io(path.to_path_buf(), error)
    }
}

fn walk_error(root: &Path, error: walkdir::Error) -> PermissionError {
    let path = error.path().unwrap_or(root).to_path_buf();
    io_error(&path, io::Error::from(error))
}
