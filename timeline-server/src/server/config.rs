use serde::Deserialize;
use std::{env, fs, path::Path, time::Duration};

use crate::llm::timeline::DEFAULT_MODEL;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DB_PATH: &str = "data/app.db";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Server settings. Read from an optional YAML file, then overridden by
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub db_path: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub llm_timeout_secs: u64,
    pub listen_port: u16,
    pub allow_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_MODEL.to_string(),
            llm_timeout_secs: 120,
            listen_port: DEFAULT_PORT,
            allow_origins: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Invalid { key: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Yaml(e) => write!(f, "YAML error: {}", e),
            ConfigError::Invalid { key, value } => write!(f, "invalid value for {}: {:?}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(value: serde_yaml::Error) -> Self {
        ConfigError::Yaml(value)
    }
}

impl AppConfig {
    /// Loads `CONFIG_PATH` (default `./config.yaml`) when the file exists and
    /// applies environment overrides. A missing file leaves the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| env::var(key).ok())
    }

    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup("CONFIG_PATH").unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let mut cfg = if Path::new(&path).exists() {
            Self::load_from_path(&path)?
        } else {
            tracing::info!(path = %path, "config file not found, using defaults");
            Self::default()
        };
        cfg.apply_env(lookup)?;
        Ok(cfg)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(&path)?;
        let cfg: AppConfig = serde_yaml::from_str(&text)?;
        Ok(cfg)
    }

    /// Applies overrides from `lookup` (normally the process environment).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("DB_PATH") {
            self.db_path = v;
        }
        if let Some(v) = lookup("OPENAI_API_KEY").filter(|v| !v.is_empty()) {
            self.openai_api_key = Some(v);
        }
        if let Some(v) = lookup("OPENAI_BASE_URL") {
            self.openai_base_url = v;
        }
        if let Some(v) = lookup("OPENAI_MODEL") {
            self.openai_model = v;
        }
        if let Some(v) = lookup("LLM_TIMEOUT_SECS") {
            self.llm_timeout_secs = v.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "LLM_TIMEOUT_SECS",
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup("PORT") {
            self.listen_port = v.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup("ALLOW_ORIGINS") {
            self.allow_origins = parse_origins(&v);
        }
        Ok(())
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}

/// Splits a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(lookup(&[])).unwrap();
        assert_eq!(cfg.listen_port, 8080);
        assert_eq!(cfg.db_path, "data/app.db");
        assert_eq!(cfg.openai_model, "gpt-3.5-turbo");
        assert!(cfg.openai_api_key.is_none());
        assert!(cfg.allow_origins.is_empty());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg: AppConfig =
            serde_yaml::from_str("listen_port: 9000\nopenai_model: from-file\n").unwrap();
        assert_eq!(cfg.listen_port, 9000);
        cfg.apply_env(lookup(&[
            ("PORT", "7000"),
            ("OPENAI_API_KEY", "sk-test"),
            ("ALLOW_ORIGINS", "http://a.test, ,http://b.test,"),
            ("LLM_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(cfg.listen_port, 7000);
        assert_eq!(cfg.openai_model, "from-file");
        assert_eq!(cfg.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.allow_origins, ["http://a.test", "http://b.test"]);
        assert_eq!(cfg.llm_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn empty_api_key_is_ignored() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(lookup(&[("OPENAI_API_KEY", "")])).unwrap();
        assert!(cfg.openai_api_key.is_none());
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut cfg = AppConfig::default();
        let err = cfg.apply_env(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"), "{err}");
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        let cfg = AppConfig::load_with(lookup(&[
            ("CONFIG_PATH", missing.to_str().unwrap()),
            ("PORT", "7100"),
        ]))
        .unwrap();
        assert_eq!(cfg.listen_port, 7100);
        assert_eq!(cfg.db_path, DEFAULT_DB_PATH);
    }

    #[test]
    fn config_path_is_read_before_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yaml");
        std::fs::write(&path, "db_path: /tmp/custom.db\nlisten_port: 9100\n").unwrap();
        let cfg = AppConfig::load_with(lookup(&[
            ("CONFIG_PATH", path.to_str().unwrap()),
            ("DB_PATH", "/tmp/env.db"),
        ]))
        .unwrap();
        assert_eq!(cfg.db_path, "/tmp/env.db");
        assert_eq!(cfg.listen_port, 9100);
    }

    #[test]
    fn loads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "db_path: /tmp/x.db\nallow_origins: [\"http://c.test\"]\n").unwrap();
        let cfg = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(cfg.db_path, "/tmp/x.db");
        assert_eq!(cfg.allow_origins, ["http://c.test"]);
        assert_eq!(cfg.listen_port, DEFAULT_PORT);
    }
}
