use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Extraction tuning
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Knowledge-base storage collaborator
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExtractionConfig {
    /// Tesseract language hint for scanned sources
    #[serde(default = "default_ocr_language")]
    pub ocr_language: String,
    /// Ingredient names longer than this are dropped as noise
    #[serde(default = "default_max_ingredient_name_len")]
    pub max_ingredient_name_len: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ocr_language: default_ocr_language(),
            max_ingredient_name_len: default_max_ingredient_name_len(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Base URL of the knowledge-base service API
    #[serde(default = "default_storage_base_url")]
    pub base_url: String,
    /// Bearer token; usually set via RECIPE__STORAGE__API_TOKEN
    #[serde(default)]
    pub api_token: String,
    /// Collection the recipes are stored under
    #[serde(default)]
    pub collection_id: String,
    /// Retry attempts for transient storage failures
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Initial delay between retries in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: default_storage_base_url(),
            api_token: String::new(),
            collection_id: String::new(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_ocr_language() -> String {
    crate::sources::DEFAULT_OCR_LANGUAGE.to_string()
}

fn default_max_ingredient_name_len() -> usize {
    80
}

fn default_storage_base_url() -> String {
    "https://api.notion.com/v1".to_string()
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

impl AppConfig {
    /// Load configuration from file and environment.
    ///
    /// Priority, highest to lowest:
    /// 1. Environment variables with RECIPE__ prefix
    ///    (e.g. RECIPE__STORAGE__API_TOKEN)
    /// 2. config.toml in the current directory
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Optional config file (can be missing)
            .add_source(File::with_name("config").required(false))
            // Use double underscore for nested: RECIPE__STORAGE__API_TOKEN
            .add_source(
                Environment::with_prefix("RECIPE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.extraction.ocr_language, "spa+eng");
        assert_eq!(config.extraction.max_ingredient_name_len, 80);
        assert_eq!(config.storage.retry_attempts, 3);
    }
}
