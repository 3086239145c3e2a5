//! Configuration management for the storage bootstrapper
//!
//! Settings come from an optional TOML file overlaid with environment
//! variables prefixed `STORAGE_BOOTSTRAP_`. Nested keys use `__`, for example
//! `STORAGE_BOOTSTRAP_PERMISSIONS__POLICY=strict`.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{BootstrapError, ConfigurationError};
use crate::permissions::strategies::{mode_strategy, ownership_strategy};
use crate::permissions::{ModeSpec, OwnershipDescriptor, PermissionPolicy, PermissionRepairer};
use crate::storage::mount::validate_temp_dir_name;

/// Environment variable naming the config file to load
pub const CONFIG_PATH_VAR: &str = "STORAGE_BOOTSTRAP_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "bootstrap";
const ENV_PREFIX: &str = "STORAGE_BOOTSTRAP";

/// Keys read from the environment as comma-separated lists
const ENV_LIST_KEYS: [&str; 4] = [
    "permissions.ownership_strategies",
    "permissions.mode_strategies",
    "launcher.args",
    "launcher.allowed_paths",
];

/// Complete bootstrap configuration
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct BootstrapConfig {
    pub paths: PathsConfig,
    pub permissions: PermissionsConfig,
    pub launcher: LauncherConfig,
}

/// Filesystem locations
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PathsConfig {
    /// Where the persistent volume is mounted
    pub mount_path: PathBuf,

    /// Build-time path that must resolve to `mount_path`
    pub symlink_path: PathBuf,

    /// Name of the scratch directory under `mount_path` and the app data dir
    pub temp_dir_name: String,

    /// Fallback when `KH_APP_DATA_DIR` is not set
    pub app_data_dir: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            mount_path: PathBuf::from("/storage/ktem_app_data"),
            symlink_path: PathBuf::from("/tmp/build/app/ktem_app_data"),
            temp_dir_name: "gradio_tmp".to_string(),
            app_data_dir: None,
        }
    }
}

/// Ownership repair settings
///
/// An empty strategy list disables that concern.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PermissionsConfig {
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub mode: ModeSpec,
    pub policy: PermissionPolicy,
    pub ownership_strategies: Vec<String>,
    pub mode_strategies: Vec<String>,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            uid: Some(1001),
            gid: Some(0),
            mode: ModeSpec::default(),
            policy: PermissionPolicy::BestEffort,
            ownership_strategies: vec!["direct".to_string(), "shell".to_string()],
            mode_strategies: vec!["walk".to_string(), "shell".to_string()],
        }
    }
}

/// Downstream application process
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LauncherConfig {
    /// Set to false to only prepare storage and exit
    pub enabled: bool,
    pub program: String,
    pub args: Vec<String>,

    /// Interface the web UI binds to
    pub server_name: String,

    /// Static asset directories the UI may serve, the temp dir is appended
    pub allowed_paths: Vec<PathBuf>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "python3".to_string(),
            args: vec!["launch.py".to_string()],
            server_name: "0.0.0.0".to_string(),
            allowed_paths: vec![PathBuf::from("libs/ktem/ktem/assets")],
        }
    }
}

impl BootstrapConfig {
    /// Load configuration from the config file with environment overrides
    pub fn load() -> Result<Self, BootstrapError> {
        let file = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => File::with_name(&path).required(true),
            Err(_) => File::with_name(DEFAULT_CONFIG_PATH).required(false),
        };

        Self::from_builder(Config::builder().add_source(file).add_source(environment()))
    }

    /// Parse a TOML document, without environment overrides
    pub fn from_toml(contents: &str) -> Result<Self, BootstrapError> {
        Self::from_builder(Config::builder().add_source(File::from_str(contents, FileFormat::Toml)))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, BootstrapError> {
        let config: BootstrapConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let paths = &self.paths;
        if !paths.mount_path.is_absolute() {
            return Err(ConfigurationError::RelativePath {
                field: "paths.mount_path",
                path: paths.mount_path.clone(),
            });
        }
        if !paths.symlink_path.is_absolute() {
            return Err(ConfigurationError::RelativePath {
                field: "paths.symlink_path",
                path: paths.symlink_path.clone(),
            });
        }
        if paths.mount_path.starts_with(&paths.symlink_path)
            || paths.symlink_path.starts_with(&paths.mount_path)
        {
            return Err(ConfigurationError::Invalid(format!(
                "symlink_path {} and mount_path {} must not contain one another",
                paths.symlink_path.display(),
                paths.mount_path.display()
            )));
        }
        validate_temp_dir_name(&paths.temp_dir_name)?;

        for name in &self.permissions.ownership_strategies {
            ownership_strategy(name)?;
        }
        for name in &self.permissions.mode_strategies {
            mode_strategy(name)?;
        }

        let launcher = &self.launcher;
        if launcher.enabled && launcher.program.trim().is_empty() {
            return Err(ConfigurationError::Invalid(
                "launcher.program cannot be empty".into(),
            ));
        }
        if launcher.server_name.trim().is_empty() {
            return Err(ConfigurationError::Invalid(
                "launcher.server_name cannot be empty".into(),
            ));
        }

        Ok(())
    }
}

/// Environment overrides, `STORAGE_BOOTSTRAP_<SECTION>__<KEY>`
fn environment() -> Environment {
    ENV_LIST_KEYS.iter().fold(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(","),
        |env, key| env.with_list_parse_key(key),
    )
}

impl PermissionsConfig {
    pub fn descriptor(&self) -> OwnershipDescriptor {
        OwnershipDescriptor {
            uid: self.uid,
            gid: self.gid,
            mode: self.mode.clone(),
        }
    }

    pub fn repairer(&self) -> Result<PermissionRepairer, ConfigurationError> {
        PermissionRepairer::from_names(
            &self.ownership_strategies,
            &self.mode_strategies,
            self.policy,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Map;

    #[test]
    fn defaults_match_the_deployment() {
        let config = BootstrapConfig::from_toml("").unwrap();

        assert_eq!(config.paths.mount_path, PathBuf::from("/storage/ktem_app_data"));
        assert_eq!(
            config.paths.symlink_path,
            PathBuf::from("/tmp/build/app/ktem_app_data")
        );
        assert_eq!(config.permissions.uid, Some(1001));
        assert_eq!(config.permissions.gid, Some(0));
        assert_eq!(config.permissions.mode, ModeSpec::Octal(0o775));
        assert_eq!(config.permissions.policy, PermissionPolicy::BestEffort);
        assert_eq!(config.launcher.server_name, "0.0.0.0");
    }

    #[test]
    fn toml_overrides_sections() {
        let config = BootstrapConfig::from_toml(
            r#"
            [paths]
            mount_path = "/mnt/data"
            temp_dir_name = "scratch"

            [permissions]
            uid = 2000
            mode = "g+rwX"
            policy = "strict"
            ownership_strategies = ["shell"]
            mode_strategies = []

            [launcher]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.paths.mount_path, PathBuf::from("/mnt/data"));
        assert_eq!(config.paths.temp_dir_name, "scratch");
        assert_eq!(config.permissions.uid, Some(2000));
        assert_eq!(config.permissions.gid, Some(0));
        assert_eq!(config.permissions.mode.to_string(), "g+rwX");
        assert_eq!(config.permissions.policy, PermissionPolicy::Strict);
        assert!(config.permissions.mode_strategies.is_empty());
        assert!(!config.launcher.enabled);

        let repairer = config.permissions.repairer().unwrap();
        assert_eq!(repairer.policy(), PermissionPolicy::Strict);
    }

    #[test]
    fn rejects_bad_values() {
        let cases = [
            "[paths]\nmount_path = \"relative\"",
            "[paths]\ntemp_dir_name = \"../escape\"",
            "[paths]\nmount_path = \"/a\"\nsymlink_path = \"/a\"",
            "[paths]\nmount_path = \"/storage/app\"\nsymlink_path = \"/storage\"",
            "[paths]\nmount_path = \"/storage\"\nsymlink_path = \"/storage/app/link\"",
            "[permissions]\nownership_strategies = [\"sudo\"]",
            "[permissions]\nmode = \"g+q\"",
            "[launcher]\nprogram = \"\"",
        ];
        for case in cases {
            assert!(BootstrapConfig::from_toml(case).is_err(), "accepted {case:?}");
        }
    }

    #[test]
    fn sibling_paths_are_accepted() {
        let config = BootstrapConfig::from_toml(
            "[paths]\nmount_path = \"/storage/app\"\nsymlink_path = \"/storage/app_link\"",
        );
        assert!(config.is_ok());
    }

    fn from_env(vars: &[(&str, &str)]) -> Result<BootstrapConfig, BootstrapError> {
        let source: Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let builder = Config::builder().add_source(environment().source(Some(source)));
        BootstrapConfig::from_builder(builder)
    }

    #[test]
    fn env_overrides_list_keys() {
        let config = from_env(&[
            ("STORAGE_BOOTSTRAP_PERMISSIONS__OWNERSHIP_STRATEGIES", "shell"),
            ("STORAGE_BOOTSTRAP_PERMISSIONS__MODE_STRATEGIES", "shell,walk"),
            ("STORAGE_BOOTSTRAP_LAUNCHER__ARGS", "-m,ktem.launch"),
            ("STORAGE_BOOTSTRAP_LAUNCHER__ALLOWED_PATHS", "/assets,/static"),
        ])
        .unwrap();

        assert_eq!(config.permissions.ownership_strategies, vec!["shell"]);
        assert_eq!(config.permissions.mode_strategies, vec!["shell", "walk"]);
        assert_eq!(config.launcher.args, vec!["-m", "ktem.launch"]);
        assert_eq!(
            config.launcher.allowed_paths,
            vec![PathBuf::from("/assets"), PathBuf::from("/static")]
        );
    }

    #[test]
    fn env_overrides_scalar_keys() {
        let config = from_env(&[
            ("STORAGE_BOOTSTRAP_PERMISSIONS__UID", "2000"),
            ("STORAGE_BOOTSTRAP_PERMISSIONS__POLICY", "strict"),
            ("STORAGE_BOOTSTRAP_LAUNCHER__SERVER_NAME", "127.0.0.1"),
        ])
        .unwrap();

        assert_eq!(config.permissions.uid, Some(2000));
        assert_eq!(config.permissions.policy, PermissionPolicy::Strict);
        assert_eq!(config.launcher.server_name, "127.0.0.1");
        assert_eq!(config.permissions.ownership_strategies, vec!["direct", "shell"]);
    }
}
