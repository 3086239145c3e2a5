//! Bootstrap runner

use log::info;
use std::path::PathBuf;

use crate::bootstrap::results::BootstrapReport;
use crate::config::{BootstrapConfig, PathsConfig};
use crate::environment::{EnvSnapshot, resolve_temp_dir_env};
use crate::error::{BootstrapError, ConfigurationError};
use crate::permissions::{OwnershipDescriptor, PermissionRepairer};
use crate::storage::{ensure_mount_ready, ensure_symlink, ensure_temp_dir};

pub struct Bootstrapper {
    paths: PathsConfig,
    descriptor: OwnershipDescriptor,
    repairer: PermissionRepairer,
    env: EnvSnapshot,
}

impl Bootstrapper {
    pub fn new(config: &BootstrapConfig, env: EnvSnapshot) -> Result<Self, ConfigurationError> {
        Ok(Self {
            paths: config.paths.clone(),
            descriptor: config.permissions.descriptor(),
            repairer: config.permissions.repairer()?,
            env,
        })
    }

    /// Replace the strategy chains built from configuration
    pub fn with_repairer(mut self, repairer: PermissionRepairer) -> Self {
        self.repairer = repairer;
        self
    }

    /// Runs every step in order and stops at the first fatal error.
    ///
    /// Parent check, directory creation, permission repair, symlink, temp dir
    /// resolution. Permission failures only stop the run under the strict policy.
    pub fn run(&self) -> Result<BootstrapReport, BootstrapError> {
        let mount_path = &self.paths.mount_path;
        info!("Bootstrapping persistent storage at {}", mount_path.display());

        let mount = ensure_mount_ready(mount_path)?;
        let temp_dir = ensure_temp_dir(mount_path, &self.paths.temp_dir_name)?;

        // The temp dir lies inside the mount tree and is already covered by the
        // first pass. The second pass gives it its own entry in the report.
        let repairs = vec![
            self.repairer
                .repair_permissions(&mount.path, &self.descriptor)?,
            self.repairer
                .repair_permissions(&temp_dir.path, &self.descriptor)?,
        ];

        let symlink = ensure_symlink(&self.paths.symlink_path, mount_path)?;

        let app_data_dir: PathBuf = self
            .env
            .resolve_app_data_dir(self.paths.app_data_dir.as_deref());
        let temp_env = resolve_temp_dir_env(
            &app_data_dir,
            self.env.temp_dir(),
            &self.paths.temp_dir_name,
        );

        info!(
            "Storage ready: {} -> {}",
            self.paths.symlink_path.display(),
            mount_path.display()
        );

        Ok(BootstrapReport {
            mount,
            temp_dir,
            repairs,
            symlink,
            temp_env,
        })
    }
}
