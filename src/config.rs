use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::bootstrap::{DEFAULT_EMBED_MODEL, DEFAULT_LLM_MODEL};
use crate::errors::{PrimerError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,

    #[serde(default)]
    pub models: ModelsConfig,

    #[serde(default)]
    pub wait: WaitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub llm: String,
    pub embedding: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitConfig {
    /// Base delay between health probes, in milliseconds
    pub poll_interval_ms: u64,

    /// Probe cap; omit to wait forever
    pub max_attempts: Option<u64>,

    /// Treat a failed pull as fatal
    pub strict: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        DaemonConfig {
            host: "127.0.0.1".to_string(),
            port: 11434,
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        ModelsConfig {
            llm: DEFAULT_LLM_MODEL.to_string(),
            embedding: DEFAULT_EMBED_MODEL.to_string(),
        }
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        WaitConfig {
            poll_interval_ms: 1000,
            max_attempts: None,
            strict: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            daemon: DaemonConfig::default(),
            models: ModelsConfig::default(),
            wait: WaitConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path
    pub fn load_from(config_path: &PathBuf) -> Result<Self> {
        if !config_path.exists() {
            let config = Config::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(config_path).map_err(|e| {
            PrimerError::ConfigError(format!(
                "Failed to read {}: {}",
                config_path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            PrimerError::ConfigError(format!(
                "Failed to parse {}: {}",
                config_path.display(),
                e
            ))
        })?;

        Ok(config)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, config_path: &PathBuf) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PrimerError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| PrimerError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string).map_err(|e| {
            PrimerError::ConfigError(format!(
                "Failed to write {}: {}",
                config_path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| {
            PrimerError::ConfigError("Could not determine home directory".to_string())
        })?;

        Ok(home.join(".ollamaprime").join("config.toml"))
    }

    /// Daemon base URL
    pub fn daemon_url(&self) -> String {
        format!("http://{}:{}", self.daemon.host, self.daemon.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.daemon.host, "127.0.0.1");
        assert_eq!(config.daemon.port, 11434);
        assert_eq!(config.models.llm, "llama3.2:3b");
        assert_eq!(config.models.embedding, "nomic-embed-text");
        assert_eq!(config.wait.poll_interval_ms, 1000);
        assert!(config.wait.max_attempts.is_none());
        assert!(!config.wait.strict);
    }

    #[test]
    fn test_daemon_url() {
        let mut config = Config::default();
        config.daemon.port = 8080;
        assert_eq!(config.daemon_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.models.llm = "qwen2.5:7b".to_string();
        config.wait.max_attempts = Some(30);

        let toml_string = toml::to_string(&config).unwrap();
        assert!(toml_string.contains("qwen2.5:7b"));

        let deserialized: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(deserialized.models.llm, "qwen2.5:7b");
        assert_eq!(deserialized.wait.max_attempts, Some(30));
    }

    #[test]
    fn test_load_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.daemon.port, 11434);
        assert!(path.exists());

        // Second load reads the file it just wrote
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.models.embedding, "nomic-embed-text");
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "daemon = \"not a table").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, PrimerError::ConfigError(_)));
        assert!(err.to_string().contains("parse"));
    }
}
