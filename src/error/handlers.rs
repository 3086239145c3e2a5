//! Error handlers
//!
//! Reports fatal errors and maps them to process exit codes.

use crate::error::types::BootstrapError;
use log::error;

/// Log a fatal bootstrap error
pub fn handle_error(err: &BootstrapError) {
    error!("Bootstrap failed: {}", err);
}

/// Convert error to a sysexits-style exit code
pub fn error_to_exit_code(err: &BootstrapError) -> i32 {
    match err {
        BootstrapError::Configuration(_) => 78,
        BootstrapError::Settings(_) => 78,
        BootstrapError::FileSystem(_) => 74,
        BootstrapError::Permission(_) => 77,
        BootstrapError::Launch(_) => 69,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigurationError, LaunchError};
    use std::path::PathBuf;

    #[test]
    fn missing_mount_parent_is_a_config_exit() {
        let err = BootstrapError::from(ConfigurationError::MountParentMissing(PathBuf::from(
            "/storage/app",
        )));
        assert_eq!(error_to_exit_code(&err), 78);
        assert!(err.to_string().contains("/storage/app"));
    }

    #[test]
    fn launch_failures_are_unavailable() {
        let err = BootstrapError::from(LaunchError::EmptyProgram);
        assert_eq!(error_to_exit_code(&err), 69);
    }
}
