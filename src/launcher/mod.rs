//! Application hand-off
//!
//! Starts the downstream web UI with the prepared environment.

pub mod plan;
pub mod process;

pub use plan::LaunchPlan;
pub use process::launch;
