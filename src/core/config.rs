//! Configuration management

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::core::errors::{Result, TranslationError};

/// Plain-text endpoint of the NiuTrans API
pub const NIUTRANS_API_URL: &str = "https://api.niutrans.com/NiuTransServer/translation";

/// Markup-aware endpoint of the NiuTrans API
pub const NIUTRANS_XML_API_URL: &str = "https://api.niutrans.com/NiuTransServer/translationXML";

/// Cache database, relative to `cache_dir`
pub const CACHE_FILE_NAME: &str = "translation/cache.db";

/// Language suggestion dictionary, relative to `cache_dir`
pub const SUGGESTION_FILE_NAME: &str = "translation/suggestion.txt";

/// Suffix of the read-only snapshot supplying the old cache generation
pub const BACKUP_SUFFIX: &str = ".bak";

/// Configuration for translator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub api_key: String,
    pub api_url: String,
    pub xml_api_url: String,
    pub cache_dir: PathBuf,
    pub max_block_size: usize,
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    pub request_timeout_ms: u64,
    pub detection_threshold: f64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: NIUTRANS_API_URL.to_string(),
            xml_api_url: NIUTRANS_XML_API_URL.to_string(),
            cache_dir: PathBuf::from("."),
            max_block_size: 5000,
            max_retries: 4,
            retry_delay_secs: 10,
            request_timeout_ms: 30000,
            detection_threshold: 0.8,
        }
    }
}

impl TranslatorConfig {
    /// Load configuration from an optional file, then `NIUTRANS_*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("NIUTRANS")
                .prefix_separator("_")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_block_size < 3 {
            return Err(TranslationError::Config {
                message: format!("max_block_size too small: {}", self.max_block_size),
            });
        }

        if !(self.detection_threshold > 0.0 && self.detection_threshold <= 1.0) {
            return Err(TranslationError::Config {
                message: format!(
                    "detection_threshold must be in (0, 1]: {}",
                    self.detection_threshold
                ),
            });
        }

        if self.api_url.is_empty() || self.xml_api_url.is_empty() {
            return Err(TranslationError::Config {
                message: "API endpoints are required".to_string(),
            });
        }

        Ok(())
    }

    /// Path of the primary cache database
    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE_NAME)
    }

    /// Path of the read-only backup cache database
    pub fn backup_cache_path(&self) -> PathBuf {
        let mut path = self.cache_path().into_os_string();
        path.push(BACKUP_SUFFIX);
        PathBuf::from(path)
    }

    /// Path of the language suggestion file
    pub fn suggestion_path(&self) -> PathBuf {
        self.cache_dir.join(SUGGESTION_FILE_NAME)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let config = TranslatorConfig {
            api_key: "test_key".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_threshold() {
        let config = TranslatorConfig {
            detection_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_tiny_block() {
        let config = TranslatorConfig {
            max_block_size: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cache_paths() {
        let config = TranslatorConfig {
            cache_dir: PathBuf::from("/data"),
            ..Default::default()
        };
        assert_eq!(
            config.cache_path(),
            PathBuf::from("/data/translation/cache.db")
        );
        assert_eq!(
            config.backup_cache_path(),
            PathBuf::from("/data/translation/cache.db.bak")
        );
        assert_eq!(
            config.suggestion_path(),
            PathBuf::from("/data/translation/suggestion.txt")
        );
    }

    #[test]
    fn test_load_json_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_key": "k", "max_block_size": 100}"#).unwrap();

        let config = TranslatorConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.max_block_size, 100);
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.api_url, NIUTRANS_API_URL);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_block_size = 1\n").unwrap();

        assert!(matches!(
            TranslatorConfig::load(Some(path.as_path())),
            Err(TranslationError::Config { .. })
        ));
    }
}
