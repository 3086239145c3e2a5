//! Persistent storage setup
//!
//! Handles the mount point, its temp subdirectory and the build-time symlink.

pub mod mount;
pub mod results;
pub mod symlink;

pub use mount::{ensure_mount_ready, ensure_temp_dir};
pub use results::{DirectoryState, EntryKind, PreparedDirectory, SymlinkOutcome};
pub use symlink::ensure_symlink;
