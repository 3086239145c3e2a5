//! Process environment handling
//!
//! The environment is read once into an [`EnvSnapshot`]. Values derived from it
//! are exported to the launched application, never written back into this
//! process.

use log::info;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Temp directory consumed by the web UI framework
pub const TEMP_DIR_VAR: &str = "GRADIO_TEMP_DIR";
/// Application data directory of the downstream app
pub const APP_DATA_DIR_VAR: &str = "KH_APP_DATA_DIR";

/// Variables the bootstrapper reads, captured at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    temp_dir: Option<OsString>,
    app_data_dir: Option<OsString>,
}

impl EnvSnapshot {
    pub fn capture() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        Self {
            temp_dir: lookup(TEMP_DIR_VAR),
            app_data_dir: lookup(APP_DATA_DIR_VAR),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<OsString>,
    {
        let pairs: Vec<(String, OsString)> = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.into()))
            .collect();
        Self::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
    }

    pub fn temp_dir(&self) -> Option<&OsStr> {
        self.temp_dir.as_deref()
    }

    pub fn app_data_dir(&self) -> Option<&OsStr> {
        self.app_data_dir.as_deref()
    }

    /// `KH_APP_DATA_DIR`, else the configured directory, else the working directory
    pub fn resolve_app_data_dir(&self, configured: Option<&Path>) -> PathBuf {
        self.app_data_dir()
            .map(PathBuf::from)
            .or_else(|| configured.map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempDirSource {
    /// Taken verbatim from the environment
    Explicit,
    /// Computed under the application data directory
    Derived,
}

/// Resolved value for [`TEMP_DIR_VAR`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempDirEnv {
    pub value: PathBuf,
    pub source: TempDirSource,
}

impl TempDirEnv {
    pub fn as_env_pair(&self) -> (&'static str, &OsStr) {
        (TEMP_DIR_VAR, self.value.as_os_str())
    }
}

/// An explicit override wins; otherwise the temp dir lives under `app_data_dir`.
pub fn resolve_temp_dir_env(
    app_data_dir: &Path,
    explicit_env_value: Option<&OsStr>,
    temp_dir_name: &str,
) -> TempDirEnv {
    match explicit_env_value {
        Some(value) => {
            info!("Using {} from environment: {:?}", TEMP_DIR_VAR, value);
            TempDirEnv {
                value: PathBuf::from(value),
                source: TempDirSource::Explicit,
            }
        }
        None => {
            let value = app_data_dir.join(temp_dir_name);
            info!("{} not set, defaulting to {}", TEMP_DIR_VAR, value.display());
            TempDirEnv {
                value,
                source: TempDirSource::Derived,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_default_under_app_data_dir() {
        let env = EnvSnapshot::from_pairs([(APP_DATA_DIR_VAR, "/data")]);
        let app_data = env.resolve_app_data_dir(None);

        let resolved = resolve_temp_dir_env(&app_data, env.temp_dir(), "gradio_tmp");

        assert_eq!(resolved.value, PathBuf::from("/data/gradio_tmp"));
        assert_eq!(resolved.source, TempDirSource::Derived);
    }

    #[test]
    fn explicit_value_is_kept_verbatim() {
        let env = EnvSnapshot::from_pairs([
            (TEMP_DIR_VAR, "/custom/tmp"),
            (APP_DATA_DIR_VAR, "/data"),
        ]);

        let resolved = resolve_temp_dir_env(Path::new("/data"), env.temp_dir(), "gradio_tmp");

        assert_eq!(resolved.value, PathBuf::from("/custom/tmp"));
        assert_eq!(resolved.source, TempDirSource::Explicit);
        assert_eq!(resolved.as_env_pair(), (TEMP_DIR_VAR, OsStr::new("/custom/tmp")));
    }

    #[test]
    fn app_data_dir_precedence() {
        let empty = EnvSnapshot::default();
        assert_eq!(empty.resolve_app_data_dir(None), PathBuf::from("."));
        assert_eq!(
            empty.resolve_app_data_dir(Some(Path::new("/app/data"))),
            PathBuf::from("/app/data")
        );

        let env = EnvSnapshot::from_pairs([(APP_DATA_DIR_VAR, "/data")]);
        assert_eq!(
            env.resolve_app_data_dir(Some(Path::new("/app/data"))),
            PathBuf::from("/data")
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let a = resolve_temp_dir_env(Path::new("/data"), None, "gradio_tmp");
        let b = resolve_temp_dir_env(Path::new("/data"), None, "gradio_tmp");
        assert_eq!(a, b);
    }
}
