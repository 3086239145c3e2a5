//! Ownership and permission repair
//!
//! Applies an ownership descriptor recursively through ordered strategy chains.

pub mod descriptor;
pub mod mode;
pub mod repair;
pub mod results;
pub mod strategies;

pub use descriptor::{OwnershipDescriptor, PermissionPolicy};
pub use mode::ModeSpec;
pub use repair::{PermissionRepairer, StrategyChain};
pub use results::{ChainOutcome, FailedAttempt, RepairReport};
pub use strategies::PermissionStrategy;
