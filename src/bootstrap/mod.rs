//! Startup bootstrap
//!
//! Drives mount validation, permission repair, symlink setup and temp dir
//! resolution as one sequential run.

pub mod runner;
pub mod results;

pub use runner::Bootstrapper;
pub use results::BootstrapReport;
