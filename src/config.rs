//! Application settings.
//!
//! Sources, later ones winning: built-in defaults, a TOML file (`hebdate.toml`
//! in the working directory, or an explicit path), then `HEBDATE_*`
//! environment variables with `__` between nested keys
//! (`HEBDATE_GEOCODING__BASE_URL`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::geocoding::NominatimConfig;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "HEBDATE";

/// File looked up in the working directory when no path is given.
const DEFAULT_CONFIG_NAME: &str = "hebdate";

const APP_DIR: &str = "hebdate";
const STORE_FILE: &str = "store.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    /// No platform data directory to place the store in
    #[error("No data directory available; set store_path explicitly")]
    NoDataDir,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Treat Gregorian input as the following Hebrew day (after sunset)
    pub after_sunset_shift: bool,

    /// Same shift for the `today` label
    pub menu_after_sunset_shift: bool,

    /// Location store file; defaults under the platform data directory
    pub store_path: Option<PathBuf>,

    pub geocoding: NominatimConfig,
}

impl Settings {
    /// Loads settings from the default file (optional) or `path` (required),
    /// then the process environment.
    ///
    /// # Errors
    /// Unreadable or malformed sources.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_with_env(path, environment())
    }

    fn load_with_env(
        path: Option<&Path>,
        env: config::Environment,
    ) -> Result<Self, SettingsError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings: Self = config::Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;

        debug!(?settings, "Loaded settings");
        Ok(settings)
    }

    /// The configured store path, or `<data dir>/hebdate/store.json`.
    ///
    /// # Errors
    /// `SettingsError::NoDataDir` when neither is available.
    pub fn store_path(&self) -> Result<PathBuf, SettingsError> {
        if let Some(path) = &self.store_path {
            return Ok(path.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR).join(STORE_FILE))
            .ok_or(SettingsError::NoDataDir)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env() -> config::Environment {
        environment().source(Some(config::Map::new()))
    }

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        environment().source(Some(map))
    }

    fn config_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(!settings.after_sunset_shift);
        assert!(!settings.menu_after_sunset_shift);
        assert_eq!(settings.store_path, None);
        assert_eq!(settings.geocoding, NominatimConfig::default());
    }

    #[test]
    fn test_load_file() {
        let file = config_file(
            r#"
            after_sunset_shift = true
            store_path = "/tmp/hebdate-test/store.json"

            [geocoding]
            limit = 3
            "#,
        );

        let settings = Settings::load_with_env(Some(file.path()), no_env()).unwrap();
        assert!(settings.after_sunset_shift);
        assert!(!settings.menu_after_sunset_shift);
        assert_eq!(
            settings.store_path().unwrap(),
            PathBuf::from("/tmp/hebdate-test/store.json")
        );
        assert_eq!(settings.geocoding.limit, 3);
        assert_eq!(settings.geocoding.timeout_secs, 10);
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = config_file("after_sunset_shift = false\n");
        let settings = Settings::load_with_env(
            Some(file.path()),
            env(&[
                ("HEBDATE_AFTER_SUNSET_SHIFT", "true"),
                ("HEBDATE_GEOCODING__BASE_URL", "http://localhost:8080"),
                ("HEBDATE_GEOCODING__TIMEOUT_SECS", "3"),
            ]),
        )
        .unwrap();

        assert!(settings.after_sunset_shift);
        assert_eq!(settings.geocoding.base_url, "http://localhost:8080");
        assert_eq!(settings.geocoding.timeout_secs, 3);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Settings::load_with_env(
            Some(Path::new("/definitely/not/here/hebdate.toml")),
            no_env(),
        );
        assert!(matches!(result, Err(SettingsError::Load(_))));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let file = config_file("after_sunset_shift = \"sometimes\"\n");
        assert!(Settings::load_with_env(Some(file.path()), no_env()).is_err());
    }

    #[test]
    fn test_default_store_path() {
        let settings = Settings::default();
        if let Ok(path) = settings.store_path() {
            assert!(path.ends_with("hebdate/store.json"));
        }
    }
}
