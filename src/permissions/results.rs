//! Permission repair result types

use std::path::PathBuf;

use crate::error::PermissionError;

/// A strategy that ran and failed
#[derive(Debug)]
pub struct FailedAttempt {
    pub strategy: &'static str,
    pub error: PermissionError,
}

/// Result of running one strategy chain
#[derive(Debug)]
pub enum ChainOutcome {
    Applied {
        strategy: &'static str,
        failed: Vec<FailedAttempt>,
    },
    Failed {
        attempts: Vec<FailedAttempt>,
    },
    Skipped,
}

impl ChainOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, ChainOutcome::Applied { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ChainOutcome::Failed { .. })
    }

    fn describe(&self) -> String {
        match self {
            ChainOutcome::Applied { strategy, .. } => format!("applied via {}", strategy),
            ChainOutcome::Skipped => "skipped".to_string(),
            ChainOutcome::Failed { attempts } => {
                let tried: Vec<String> = attempts
                    .iter()
                    .map(|a| format!("{}: {}", a.strategy, a.error))
                    .collect();
                format!("failed [{}]", tried.join("; "))
            }
        }
    }
}

/// Result of a repair_permissions call
#[derive(Debug)]
pub struct RepairReport {
    pub path: PathBuf,
    pub ownership: ChainOutcome,
    pub mode: ChainOutcome,
}

impl RepairReport {
    /// True when neither concern ended with every strategy failing
    pub fn is_complete(&self) -> bool {
        !self.ownership.is_failure() && !self.mode.is_failure()
    }

    pub fn summary(&self) -> String {
        format!(
            "ownership {}, mode {}",
            self.ownership.describe(),
            self.mode.describe()
        )
    }
}
