/// Configuration structures loaded from `lens.toml`

use lens_core::TokenCategory;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::ConfigError;
use crate::storage::FingerprintMode;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LensConfig {
    pub classifier: ClassifierSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

/// Token and pool tables; entries extend or override the built-in defaults
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClassifierSettings {
    pub default_decimals: u8,
    pub default_rate: f64,
    pub tokens: Vec<TokenSettings>,
    pub pools: Vec<PoolSettings>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TokenSettings {
    pub symbol: String,
    pub decimals: Option<u8>,
    /// Static conversion rate into the common unit of account
    pub rate: Option<f64>,
    pub category: Option<TokenCategory>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PoolSettings {
    pub id: String,
    pub token_a: String,
    pub token_b: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
    /// Storage duration requested from the store
    pub epochs: u32,
    /// Relative swap-count growth above which a new profile is always stored
    pub growth_threshold: f64,
    pub fingerprint_mode: FingerprintMode,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub log_dir: Option<PathBuf>,
    pub json_file: bool,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            default_decimals: 9,
            default_rate: 1.0,
            tokens: Vec::new(),
            pools: Vec::new(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            data_dir: PathBuf::from("data/analyses"),
            epochs: 5,
            growth_threshold: 0.10,
            fingerprint_mode: FingerprintMode::WithAnalysisDate,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: Some(PathBuf::from("logs")),
            json_file: true,
        }
    }
}

impl LensConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: LensConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.storage.growth_threshold >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "storage.growth_threshold must be non-negative, got {}",
                self.storage.growth_threshold
            )));
        }

        if self.storage.epochs == 0 {
            return Err(ConfigError::Invalid("storage.epochs must be at least 1".to_string()));
        }

        if self.classifier.default_decimals > 30 {
            return Err(ConfigError::Invalid(format!(
                "classifier.default_decimals too large: {}",
                self.classifier.default_decimals
            )));
        }

        for token in &self.classifier.tokens {
            if token.decimals.is_some_and(|d| d > 30) {
                return Err(ConfigError::Invalid(format!(
                    "decimals for {} too large: {:?}",
                    token.symbol, token.decimals
                )));
            }
            if token.rate.is_some_and(|r| !(r >= 0.0)) {
                return Err(ConfigError::Invalid(format!(
                    "rate for {} must be non-negative",
                    token.symbol
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
        [classifier]
        default_decimals = 8

        [[classifier.tokens]]
        symbol = "HASUI"
        decimals = 9
        rate = 3.9
        category = "protocol"

        [[classifier.pools]]
        id = "0xfeed"
        token_a = "HASUI"
        token_b = "SUI"

        [storage]
        backend = "memory"
        epochs = 10
        fingerprint_mode = "content_only"

        [logging]
        level = "debug"
        json_file = false
    "#;

    #[test]
    fn test_parse_sample_config() {
        let config = LensConfig::from_toml_str(SAMPLE).unwrap();

        assert_eq!(config.classifier.default_decimals, 8);
        assert_eq!(config.classifier.default_rate, 1.0);
        assert_eq!(config.classifier.tokens[0].category, Some(TokenCategory::Protocol));
        assert_eq!(config.classifier.pools[0].token_b, "SUI");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.epochs, 10);
        assert_eq!(config.storage.growth_threshold, 0.10);
        assert_eq!(config.storage.fingerprint_mode, FingerprintMode::ContentOnly);
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.json_file);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = LensConfig::from_toml_str("").unwrap();
        assert_eq!(config, LensConfig::default());
        assert_eq!(config.storage.fingerprint_mode, FingerprintMode::WithAnalysisDate);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let negative = "[storage]\ngrowth_threshold = -0.5\n";
        assert!(matches!(LensConfig::from_toml_str(negative), Err(ConfigError::Invalid(_))));

        let zero_epochs = "[storage]\nepochs = 0\n";
        assert!(matches!(LensConfig::from_toml_str(zero_epochs), Err(ConfigError::Invalid(_))));

        let garbage = "[storage\nbackend = ";
        assert!(matches!(LensConfig::from_toml_str(garbage), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = LensConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.storage.epochs, 10);

        let missing = LensConfig::load_from_file("/definitely/not/here/lens.toml");
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }
}
