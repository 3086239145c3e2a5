pub mod bootstrap;
pub mod config;
pub mod environment;
pub mod error;
pub mod launcher;
pub mod permissions;
pub mod storage;
pub mod utils;

pub use bootstrap::{BootstrapReport, Bootstrapper};
pub use config::BootstrapConfig;
pub use error::BootstrapError;
