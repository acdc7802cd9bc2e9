//! Console settings loaded with Figment.
//!
//! Sources in precedence order (later sources override earlier ones):
//! 1. Built-in defaults
//! 2. An optional settings file (TOML, YAML or JSON, chosen by extension)
//! 3. Environment variables with the `CRM_` prefix (`CRM_API_URL`, ...)

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::store::SavePolicy;

const ENV_PREFIX: &str = "CRM_";

/// Process-level settings for a console session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    /// Base URL of the REST backend.
    pub api_url: String,
    /// Configuration document file. `None` keeps the document in memory.
    pub config_path: Option<PathBuf>,
    pub save_timeout_ms: u64,
    pub save_retries: u32,
    pub retry_backoff_ms: u64,
    /// Fallback tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000/api".into(),
            config_path: None,
            save_timeout_ms: 10_000,
            save_retries: 2,
            retry_backoff_ms: 200,
            log_filter: "info".into(),
        }
    }
}

impl ConsoleSettings {
    /// Load from defaults and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load from defaults, an optional settings file, and the environment.
    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        let settings: Self = Self::figment(file)?
            .extract()
            .map_err(|e| ConfigError::settings(e.to_string()))?;
        debug!(api_url = %settings.api_url, config_path = ?settings.config_path, "loaded console settings");
        Ok(settings)
    }

    fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = file {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase);
            figment = match ext.as_deref() {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => {
                    return Err(ConfigError::settings(format!(
                        "unsupported settings file format: {}",
                        path.display()
                    )))
                }
            };
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Timeout and retry policy for configuration saves.
    pub fn save_policy(&self) -> SavePolicy {
        SavePolicy {
            timeout: Duration::from_millis(self.save_timeout_ms),
            retries: self.save_retries,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let settings = ConsoleSettings::default();
        assert_eq!(settings.api_url, "http://localhost:5000/api");
        assert!(settings.config_path.is_none());
        assert_eq!(settings.save_policy(), SavePolicy::default());
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("console.toml");
        std::fs::write(
            &path,
            "api_url = \"https://crm.example.com/api\"\nsave_retries = 5\n",
        )
        .unwrap();

        let settings = ConsoleSettings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.api_url, "https://crm.example.com/api");
        assert_eq!(settings.save_retries, 5);
        assert_eq!(settings.save_timeout_ms, 10_000);
    }

    #[test]
    fn yaml_file_sets_config_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("console.yml");
        std::fs::write(&path, "config_path: /var/lib/crm/config.yaml\nretry_backoff_ms: 50\n")
            .unwrap();

        let settings = ConsoleSettings::load_from(Some(&path)).unwrap();
        assert_eq!(
            settings.config_path,
            Some(PathBuf::from("/var/lib/crm/config.yaml"))
        );
        assert_eq!(settings.save_policy().backoff, Duration::from_millis(50));
    }

    #[test]
    fn unsupported_extension_errors() {
        let result = ConsoleSettings::load_from(Some(Path::new("console.ini")));
        assert!(matches!(result, Err(ConfigError::Settings { .. })));
    }

    #[test]
    fn malformed_value_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("console.json");
        std::fs::write(&path, r#"{"save_retries": "many"}"#).unwrap();
        let result = ConsoleSettings::load_from(Some(&path));
        assert!(matches!(result, Err(ConfigError::Settings { .. })));
    }
}
