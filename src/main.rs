//! Storage Bootstrap - Entry Point
//!
//! Prepares the persistent volume for the web UI, then launches it.

use log::info;

use storage_bootstrap::environment::EnvSnapshot;
use storage_bootstrap::error::handlers::{error_to_exit_code, handle_error};
use storage_bootstrap::launcher::{LaunchPlan, launch};
use storage_bootstrap::utils::logging::setup_logging;
use storage_bootstrap::{BootstrapConfig, BootstrapError, Bootstrapper};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    setup_logging();

    info!("Starting storage bootstrap...");

    let code = match run().await {
        Ok(code) => code,
        Err(e) => {
            handle_error(&e);
            error_to_exit_code(&e)
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<i32, BootstrapError> {
    let config = BootstrapConfig::load()?;
    let report = Bootstrapper::new(&config, EnvSnapshot::capture())?.run()?;

    if !config.launcher.enabled {
        info!("Launcher disabled, storage is ready");
        return Ok(0);
    }

    let plan = LaunchPlan::new(&config.launcher, &report.temp_env)?;
    Ok(launch(&plan).await?)
}
