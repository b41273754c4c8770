use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSettings,
    pub gemini: GeminiSettings,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub ip: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub api_base: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            gemini: GeminiSettings::default(),
            request_timeout_secs: 120,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            ip: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: None,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Reads the optional config file, then lets `GEMINI_API_KEY` override the key.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let config = match path {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        Ok(config.with_env_api_key(std::env::var(API_KEY_ENV).ok()))
    }

    pub fn with_env_api_key(mut self, env_value: Option<String>) -> Self {
        if let Some(key) = env_value.filter(|k| !k.trim().is_empty()) {
            self.gemini.api_key = Some(key);
        }
        self
    }

    pub fn api_key(&self) -> Result<&str, AnalysisError> {
        self.gemini
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(AnalysisError::MissingApiKey)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Re-reads `path` and swaps it into `shared`. On error `shared` is left untouched.
pub async fn reload_into(path: &str, shared: &RwLock<Config>) -> anyhow::Result<()> {
    let new_config = Config::load(Some(path))?;
    *shared.write().await = new_config;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.gemini.model, "gemini-1.5-flash");
        assert_eq!(
            config.gemini.api_base,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
        assert!(matches!(config.api_key(), Err(AnalysisError::MissingApiKey)));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "gemini:\n  model: gemini-1.5-pro\n  api_key: file-key\nrequest_timeout_secs: 30"
        )
        .unwrap();

        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.gemini.model, "gemini-1.5-pro");
        assert_eq!(
            config.gemini.api_base,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert_eq!(config.server.ip, "0.0.0.0");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.api_key().unwrap(), "file-key");
    }

    #[test]
    fn test_empty_file_is_default() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server: [not, a, map]").unwrap();
        assert!(Config::from_file(file.path().to_str().unwrap()).is_err());
        assert!(Config::from_file("/nonexistent/describe-image.yaml").is_err());
    }

    #[test]
    fn test_env_key_overrides_file_key() {
        let mut config = Config::default();
        config.gemini.api_key = Some("file-key".to_string());

        let config = config.with_env_api_key(Some("env-key".to_string()));
        assert_eq!(config.api_key().unwrap(), "env-key");

        let config = config.with_env_api_key(Some("   ".to_string()));
        assert_eq!(config.api_key().unwrap(), "env-key");

        let config = config.with_env_api_key(None);
        assert_eq!(config.api_key().unwrap(), "env-key");
    }

    #[test]
    fn test_blank_key_is_missing() {
        let mut config = Config::default();
        config.gemini.api_key = Some("  ".to_string());
        assert!(matches!(config.api_key(), Err(AnalysisError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_reload_replaces_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "gemini:\n  model: gemini-1.5-flash").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let shared = RwLock::new(Config::from_file(&path).unwrap());

        std::fs::write(&path, "gemini:\n  model: gemini-1.5-pro\nrequest_timeout_secs: 60\n").unwrap();

        reload_into(&path, &shared).await.unwrap();
        let config = shared.read().await;
        assert_eq!(config.gemini.model, "gemini-1.5-pro");
        assert_eq!(config.request_timeout_secs, 60);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_config() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        std::fs::write(&path, "gemini:\n  model: gemini-1.5-pro\n").unwrap();
        let shared = RwLock::new(Config::from_file(&path).unwrap());

        std::fs::write(&path, "gemini: [broken\n").unwrap();
        assert!(reload_into(&path, &shared).await.is_err());

        let config = shared.read().await;
        assert_eq!(config.gemini.model, "gemini-1.5-pro");
    }
}
