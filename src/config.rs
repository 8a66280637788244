use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};
use crate::gemini::DEFAULT_MODEL;

const API_KEY_ENV: &str = "GEMINI_API_KEY";
const DEFAULT_CHAT_DELAY_MS: u64 = 1000;
const DEFAULT_FRAME_INTERVAL_MS: u64 = 100;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub model: Option<String>,
    pub chat_delay_ms: Option<u64>,
    pub frame_interval_ms: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            gemini_api_key: None,
            model: Some(DEFAULT_MODEL.to_string()),
            chat_delay_ms: Some(DEFAULT_CHAT_DELAY_MS),
            frame_interval_ms: Some(DEFAULT_FRAME_INTERVAL_MS),
        }
    }

    /// Missing file falls back to defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Environment variable first, then the config file. Empty when unset.
    pub fn api_key(&self) -> String {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.gemini_api_key.clone())
            .unwrap_or_default()
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn chat_delay(&self) -> Duration {
        Duration::from_millis(self.chat_delay_ms.unwrap_or(DEFAULT_CHAT_DELAY_MS))
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.unwrap_or(DEFAULT_FRAME_INTERVAL_MS).max(1))
    }

    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.json"))
    }

    pub fn get_log_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("gymer.log"))
    }

    fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("gymer"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.chat_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            gemini_api_key: Some("abc".to_string()),
            model: Some("gemini-test".to_string()),
            chat_delay_ms: Some(250),
            frame_interval_ms: None,
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.chat_delay(), Duration::from_millis(250));
        assert_eq!(loaded.frame_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_partial_file_uses_defaults_for_missing_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"chat_delay_ms": 10}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.chat_delay(), Duration::from_millis(10));
    }

    #[test]
    fn test_api_key_prefers_environment() {
        let config = Config {
            gemini_api_key: Some("from-file".to_string()),
            ..Config::new()
        };

        std::env::remove_var(API_KEY_ENV);
        assert_eq!(config.api_key(), "from-file");
        assert_eq!(Config::new().api_key(), "");

        std::env::set_var(API_KEY_ENV, "from-env");
        assert_eq!(config.api_key(), "from-env");
        std::env::remove_var(API_KEY_ENV);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
