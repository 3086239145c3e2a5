//! Permission repair
//!
//! Runs the ownership and mode strategy chains over a path and applies the
//! configured failure policy.

use log::{info, warn};
use std::path::Path;

use crate::error::{ConfigurationError, PermissionError};
use crate::permissions::descriptor::{OwnershipDescriptor, PermissionPolicy};
use crate::permissions::results::{ChainOutcome, FailedAttempt, RepairReport};
use crate::permissions::strategies::{PermissionStrategy, mode_strategy, ownership_strategy};

/// Ordered list of strategies for one concern. The next strategy only runs
/// when the previous one failed.
pub struct StrategyChain {
    strategies: Vec<Box<dyn PermissionStrategy>>,
}

impl StrategyChain {
    pub fn new(strategies: Vec<Box<dyn PermissionStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn run(&self, path: &Path, descriptor: &OwnershipDescriptor) -> ChainOutcome {
        if self.strategies.is_empty() {
            return ChainOutcome::Skipped;
        }

        let mut failed = Vec::new();
        for strategy in &self.strategies {
            match strategy.apply(path, descriptor) {
                Ok(()) => {
                    return ChainOutcome::Applied {
                        strategy: strategy.name(),
                        failed,
                    };
                }
                Err(error) => {
                    warn!(
                        "{} strategy failed on {}: {}",
                        strategy.name(),
                        path.display(),
                        error
                    );
                    failed.push(FailedAttempt {
                        strategy: strategy.name(),
                        error,
                    });
                }
            }
        }
        ChainOutcome::Failed { attempts: failed }
    }
}

pub struct PermissionRepairer {
    ownership: StrategyChain,
    mode: StrategyChain,
    policy: PermissionPolicy,
}

impl PermissionRepairer {
    pub fn new(ownership: StrategyChain, mode: StrategyChain, policy: PermissionPolicy) -> Self {
        Self {
            ownership,
            mode,
            policy,
        }
    }

    /// Build chains from configured strategy names
    pub fn from_names<S: AsRef<str>>(
        ownership: &[S],
        mode: &[S],
        policy: PermissionPolicy,
    ) -> Result<Self, ConfigurationError> {
        let ownership = ownership
            .iter()
            .map(|name| ownership_strategy(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let mode = mode
            .iter()
            .map(|name| mode_strategy(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(
            StrategyChain::new(ownership),
            StrategyChain::new(mode),
            policy,
        ))
    }

    pub fn policy(&self) -> PermissionPolicy {
        self.policy
    }

    /// Apply ownership then mode to `path` and everything below it.
    ///
    /// Under [`PermissionPolicy::BestEffort`] this never returns an error: every
    /// failure is logged and recorded in the report. Under
    /// [`PermissionPolicy::Strict`] a concern whose strategies all failed
    /// becomes [`PermissionError::RepairFailed`].
    pub fn repair_permissions(
        &self,
        path: &Path,
        descriptor: &OwnershipDescriptor,
    ) -> Result<RepairReport, PermissionError> {
        let ownership = if descriptor.has_ownership() {
            self.ownership.run(path, descriptor)
        } else {
            ChainOutcome::Skipped
        };
        let mode = self.mode.run(path, descriptor);

        let report = RepairReport {
            path: path.to_path_buf(),
            ownership,
            mode,
        };

        if report.is_complete() {
            info!("Repaired permissions on {}: {}", path.display(), report.summary());
            return Ok(report);
        }

        match self.policy {
            PermissionPolicy::Strict => Err(PermissionError::RepairFailed {
                path: path.to_path_buf(),
                summary: report.summary(),
            }),
            PermissionPolicy::BestEffort => {
                warn!(
                    "Permission repair incomplete on {} ({}), continuing",
                    path.display(),
                    report.summary()
                );
                Ok(report)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::mode::ModeSpec;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        name: &'static str,
        succeed: bool,
        calls: Arc<AtomicUsize>,
    }

    impl PermissionStrategy for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        fn apply(&self, path: &Path, _: &OwnershipDescriptor) -> Result<(), PermissionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(())
            } else {
                Err(PermissionError::Denied(path.to_path_buf(), "EPERM".into()))
            }
        }
    }

    fn scripted(
        name: &'static str,
        succeed: bool,
    ) -> (Box<dyn PermissionStrategy>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let strategy = Scripted {
            name,
            succeed,
            calls: Arc::clone(&calls),
        };
        (Box::new(strategy), calls)
    }

    fn descriptor() -> OwnershipDescriptor {
        OwnershipDescriptor {
            uid: Some(1001),
            gid: Some(0),
            mode: ModeSpec::default(),
        }
    }

    #[test]
    fn falls_back_to_next_strategy_and_records_winner() {
        let (direct, direct_calls) = scripted("direct", false);
        let (shell, shell_calls) = scripted("shell", true);
        let chain = StrategyChain::new(vec![direct, shell]);

        match chain.run(Path::new("/storage"), &descriptor()) {
            ChainOutcome::Applied { strategy, failed } => {
                assert_eq!(strategy, "shell");
                assert_eq!(failed.len(), 1);
                assert_eq!(failed[0].strategy, "direct");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(direct_calls.load(Ordering::SeqCst), 1);
        assert_eq!(shell_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stops_after_first_success() {
        let (direct, _) = scripted("direct", true);
        let (shell, shell_calls) = scripted("shell", true);
        let chain = StrategyChain::new(vec![direct, shell]);

        assert!(chain.run(Path::new("/storage"), &descriptor()).succeeded());
        assert_eq!(shell_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn best_effort_reports_failure_without_error() {
        let (direct, _) = scripted("direct", false);
        let (walk, _) = scripted("walk", true);
        let repairer = PermissionRepairer::new(
            StrategyChain::new(vec![direct]),
            StrategyChain::new(vec![walk]),
            PermissionPolicy::BestEffort,
        );

        let report = repairer
            .repair_permissions(Path::new("/storage"), &descriptor())
            .unwrap();
        assert!(!report.is_complete());
        assert!(matches!(report.ownership, ChainOutcome::Failed { .. }));
        assert!(report.mode.succeeded());
    }

    #[test]
    fn strict_turns_failure_into_error() {
        let (direct, _) = scripted("direct", false);
        let repairer = PermissionRepairer::new(
            StrategyChain::new(vec![direct]),
            StrategyChain::new(Vec::new()),
            PermissionPolicy::Strict,
        );

        let err = repairer
            .repair_permissions(Path::new("/storage"), &descriptor())
            .unwrap_err();
        match err {
            PermissionError::RepairFailed { path, summary } => {
                assert_eq!(path, PathBuf::from("/storage"));
                assert!(summary.contains("direct"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn ownership_skipped_without_ids() {
        let (direct, calls) = scripted("direct", false);
        let repairer = PermissionRepairer::new(
            StrategyChain::new(vec![direct]),
            StrategyChain::new(Vec::new()),
            PermissionPolicy::Strict,
        );
        let mut d = descriptor();
        d.uid = None;
        d.gid = None;

        let report = repairer.repair_permissions(Path::new("/storage"), &d).unwrap();
        assert!(matches!(report.ownership, ChainOutcome::Skipped));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = PermissionRepairer::from_names(
            &["direct", "sudo"],
            &["walk"],
            PermissionPolicy::BestEffort,
        )
        .err()
        .unwrap();
        assert!(matches!(err, ConfigurationError::UnknownStrategy(_)));
    }
}
