//! Result types for a bootstrap run

use crate::environment::TempDirEnv;
use crate::permissions::RepairReport;
use crate::storage::{PreparedDirectory, SymlinkOutcome};

/// Everything a bootstrap run did, in order
#[derive(Debug)]
pub struct BootstrapReport {
    pub mount: PreparedDirectory,
    pub temp_dir: PreparedDirectory,
    /// Mount path first, then the temp directory
    pub repairs: Vec<RepairReport>,
    pub symlink: SymlinkOutcome,
    pub temp_env: TempDirEnv,
}

impl BootstrapReport {
    pub fn permissions_complete(&self) -> bool {
        self.repairs.iter().all(RepairReport::is_complete)
    }
}
