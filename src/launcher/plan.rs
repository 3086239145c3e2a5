//! Launch plan
//!
//! Translates launcher settings and the resolved temp directory into the
//! command line and environment of the application process.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::LauncherConfig;
use crate::environment::TempDirEnv;
use crate::error::LaunchError;

pub const SERVER_NAME_VAR: &str = "GRADIO_SERVER_NAME";
pub const ALLOWED_PATHS_VAR: &str = "GRADIO_ALLOWED_PATHS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub program: String,
    pub args: Vec<String>,
    /// Set on the child on top of the inherited environment
    pub env: Vec<(String, OsString)>,
}

impl LaunchPlan {
    pub fn new(config: &LauncherConfig, temp_env: &TempDirEnv) -> Result<Self, LaunchError> {
        if config.program.trim().is_empty() {
            return Err(LaunchError::EmptyProgram);
        }

        let (temp_key, temp_value) = temp_env.as_env_pair();
        let env = vec![
            (temp_key.to_string(), temp_value.to_os_string()),
            (SERVER_NAME_VAR.to_string(), OsString::from(&config.server_name)),
            (
                ALLOWED_PATHS_VAR.to_string(),
                OsString::from(allowed_paths(&config.allowed_paths, &temp_env.value)),
            ),
        ];

        Ok(Self {
            program: config.program.clone(),
            args: config.args.clone(),
            env,
        })
    }

    pub fn env_value(&self, key: &str) -> Option<&OsString> {
        self.env.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl fmt::Display for LaunchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Configured asset directories followed by the temp dir, without duplicates
fn allowed_paths(configured: &[PathBuf], temp_dir: &Path) -> String {
    let mut paths: Vec<&Path> = Vec::new();
    for path in configured
        .iter()
        .map(PathBuf::as_path)
        .chain(std::iter::once(temp_dir))
    {
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
        .iter()
        .map(|p| p.to_string_lossy())
        .collect::<Vec<_>>()
        .join(",")
}
