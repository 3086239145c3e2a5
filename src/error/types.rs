//! Error types
//!
//! Defines domain-specific error types for each stage of the bootstrap.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Misconfiguration of the environment or of the bootstrap settings.
///
/// These are fatal: the process cannot do anything sensible until an operator
/// fixes the deployment (for example by attaching the persistent volume).
#[derive(Debug)]
pub enum ConfigurationError {
    MountParentMissing(PathBuf),
    MountNotADirectory(PathBuf),
    RelativePath { field: &'static str, path: PathBuf },
    InvalidTempDirName(String),
    InvalidMode(String),
    UnknownStrategy(String),
    Invalid(String),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::MountParentMissing(p) => write!(
                f,
                "Parent of mount path {} does not exist. Ensure the persistent volume is mounted correctly",
                p.display()
            ),
            ConfigurationError::MountNotADirectory(p) => {
                write!(f, "Mount path exists but is not a directory: {}", p.display())
            }
            ConfigurationError::RelativePath { field, path } => {
                write!(f, "{} must be an absolute path, got {}", field, path.display())
            }
            ConfigurationError::InvalidTempDirName(n) => {
                write!(f, "Invalid temp directory name: {:?}", n)
            }
            ConfigurationError::InvalidMode(m) => write!(f, "Invalid mode: {}", m),
            ConfigurationError::UnknownStrategy(s) => {
                write!(f, "Unknown permission strategy: {}", s)
            }
            ConfigurationError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// Filesystem operations that the OS refused.
#[derive(Debug)]
pub enum FileSystemError {
    CreateDirectory(PathBuf, io::Error),
    RemoveEntry(PathBuf, io::Error),
    CreateSymlink {
        link: PathBuf,
        target: PathBuf,
        source: io::Error,
    },
    Inspect(PathBuf, io::Error),
    LinkContainsTarget { link: PathBuf, target: PathBuf },
}

impl fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSystemError::CreateDirectory(p, e) => {
                write!(f, "Failed to create directory {}: {}", p.display(), e)
            }
            FileSystemError::RemoveEntry(p, e) => {
                write!(f, "Failed to remove {}: {}", p.display(), e)
            }
            FileSystemError::CreateSymlink {
                link,
                target,
                source,
            } => write!(
                f,
                "Failed to create symbolic link {} -> {}: {}",
                link.display(),
                target.display(),
                source
            ),
            FileSystemError::Inspect(p, e) => {
                write!(f, "Failed to inspect {}: {}", p.display(), e)
            }
            FileSystemError::LinkContainsTarget { link, target } => write!(
                f,
                "Refusing to replace {} with a link: it contains the link target {}",
                link.display(),
                target.display()
            ),
        }
    }
}

impl std::error::Error for FileSystemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileSystemError::CreateDirectory(_, e)
            | FileSystemError::RemoveEntry(_, e)
            | FileSystemError::Inspect(_, e) => Some(e),
            FileSystemError::CreateSymlink { source, .. } => Some(source),
            FileSystemError::LinkContainsTarget { .. } => None,
        }
    }
}

/// Failures of a single permission strategy, or of a whole repair under the
/// strict policy.
#[derive(Debug)]
pub enum PermissionError {
    Denied(PathBuf, String),
    Io(PathBuf, io::Error),
    CommandFailed { command: String, detail: String },
    RepairFailed { path: PathBuf, summary: String },
}

impl fmt::Display for PermissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionError::Denied(p, reason) => {
                write!(f, "Permission denied on {}: {}", p.display(), reason)
            }
            PermissionError::Io(p, e) => write!(f, "IO error on {}: {}", p.display(), e),
            PermissionError::CommandFailed { command, detail } => {
                write!(f, "Command `{}` failed: {}", command, detail)
            }
            PermissionError::RepairFailed { path, summary } => {
                write!(f, "Permission repair failed for {}: {}", path.display(), summary)
            }
        }
    }
}

impl std::error::Error for PermissionError {}

/// Errors starting or supervising the downstream application process.
#[derive(Debug)]
pub enum LaunchError {
    EmptyProgram,
    Spawn(String, io::Error),
    Wait(io::Error),
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchError::EmptyProgram => write!(f, "Launcher program is empty"),
            LaunchError::Spawn(program, e) => write!(f, "Failed to start {}: {}", program, e),
            LaunchError::Wait(e) => write!(f, "Failed to wait for application: {}", e),
        }
    }
}

impl std::error::Error for LaunchError {}

/// Top-level error that encompasses every bootstrap stage
#[derive(Debug)]
pub enum BootstrapError {
    Configuration(ConfigurationError),
    FileSystem(FileSystemError),
    Permission(PermissionError),
    Launch(LaunchError),
    Settings(config::ConfigError),
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapError::Configuration(e) => write!(f, "Configuration error: {}", e),
            BootstrapError::FileSystem(e) => write!(f, "File system error: {}", e),
            BootstrapError::Permission(e) => write!(f, "Permission error: {}", e),
            BootstrapError::Launch(e) => write!(f, "Launch error: {}", e),
            BootstrapError::Settings(e) => write!(f, "Settings error: {}", e),
        }
    }
}

impl std::error::Error for BootstrapError {}

impl From<ConfigurationError> for BootstrapError {
    fn from(error: ConfigurationError) -> Self {
        BootstrapError::Configuration(error)
    }
}

impl From<FileSystemError> for BootstrapError {
    fn from(error: FileSystemError) -> Self {
        BootstrapError::FileSystem(error)
    }
}

impl From<PermissionError> for BootstrapError {
    fn from(error: PermissionError) -> Self {
        BootstrapError::Permission(error)
    }
}

impl From<LaunchError> for BootstrapError {
    fn from(error: LaunchError) -> Self {
        BootstrapError::Launch(error)
    }
}

impl From<config::ConfigError> for BootstrapError {
    fn from(error: config::ConfigError) -> Self {
        BootstrapError::Settings(error)
    }
}
