//! User settings for Spendwise
//!
//! Manages user preferences: base currency and exchange rates, duplicate
//! detection thresholds, categorization behaviour and the AI provider.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::paths::SpendwisePaths;
use crate::error::SpendwiseError;

/// Thresholds used by the duplicate detector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuplicateSettings {
    /// Minimum token-overlap similarity for a medium-confidence match
    pub medium_similarity: f64,
    /// Maximum date distance (days) for a medium-confidence match
    pub medium_day_window: i64,
    /// Minimum token-overlap similarity for a low-confidence match
    pub low_similarity: f64,
    /// Maximum date distance (days) for a low-confidence match
    pub low_day_window: i64,
}

impl Default for DuplicateSettings {
    fn default() -> Self {
        Self {
            medium_similarity: 0.8,
            medium_day_window: 1,
            low_similarity: 0.9,
            low_day_window: 3,
        }
    }
}

/// Categorization behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategorizationSettings {
    /// Whether the built-in merchant rule table is consulted
    #[serde(default = "default_true")]
    pub use_builtin_rules: bool,

    /// Minimum confidence for a history-based suggestion to be applied
    #[serde(default = "default_history_min_confidence")]
    pub history_min_confidence: f64,
}

impl Default for CategorizationSettings {
    fn default() -> Self {
        Self {
            use_builtin_rules: true,
            history_min_confidence: default_history_min_confidence(),
        }
    }
}

/// AI provider settings (OpenAI-compatible chat completions endpoint)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiSettings {
    /// Chat completions endpoint URL
    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,

    /// Model identifier sent with each request
    #[serde(default = "default_ai_model")]
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_ai_key_env")]
    pub api_key_env: String,

    /// Maximum transactions per categorization request
    #[serde(default = "default_ai_batch")]
    pub max_batch: usize,

    /// Request timeout in seconds
    #[serde(default = "default_ai_timeout")]
    pub timeout_secs: u64,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            endpoint: default_ai_endpoint(),
            model: default_ai_model(),
            api_key_env: default_ai_key_env(),
            max_batch: default_ai_batch(),
            timeout_secs: default_ai_timeout(),
        }
    }
}

/// User settings for Spendwise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency all reports are converted into (ISO 4217 code)
    #[serde(default = "default_currency")]
    pub base_currency: String,

    /// Exchange rates into the base currency, keyed by currency code
    #[serde(default)]
    pub exchange_rates: BTreeMap<String, f64>,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default)]
    pub duplicates: DuplicateSettings,

    #[serde(default)]
    pub categorization: CategorizationSettings,

    #[serde(default)]
    pub ai: AiSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_true() -> bool {
    true
}

fn default_history_min_confidence() -> f64 {
    0.5
}

fn default_ai_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_ai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_ai_key_env() -> String {
    "SPENDWISE_AI_API_KEY".to_string()
}

fn default_ai_batch() -> usize {
    25
}

fn default_ai_timeout() -> u64 {
    60
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            base_currency: default_currency(),
            exchange_rates: BTreeMap::new(),
            date_format: default_date_format(),
            duplicates: DuplicateSettings::default(),
            categorization: CategorizationSettings::default(),
            ai: AiSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &SpendwisePaths) -> Result<Self, SpendwiseError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                SpendwiseError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                SpendwiseError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &SpendwisePaths) -> Result<(), SpendwiseError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            SpendwiseError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            SpendwiseError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }

    /// Rate that converts one unit of `currency` into the base currency
    pub fn rate_for(&self, currency: &str) -> Result<f64, SpendwiseError> {
        let code = currency.trim().to_uppercase();
        if code.is_empty() || code == self.base_currency.to_uppercase() {
            return Ok(1.0);
        }
        self.exchange_rates
            .iter()
            .find(|(k, _)| k.to_uppercase() == code)
            .map(|(_, rate)| *rate)
            .ok_or(SpendwiseError::UnknownCurrency(code))
    }

    /// Validate values that serde cannot constrain
    pub fn validate(&self) -> Result<(), SpendwiseError> {
        if self.base_currency.trim().len() != 3 {
            return Err(SpendwiseError::Config(format!(
                "Base currency must be a 3-letter code, got '{}'",
                self.base_currency
            )));
        }
        for (code, rate) in &self.exchange_rates {
            if !(*rate > 0.0) || !rate.is_finite() {
                return Err(SpendwiseError::Config(format!(
                    "Exchange rate for {} must be positive, got {}",
                    code, rate
                )));
            }
        }
        let d = &self.duplicates;
        for value in [d.medium_similarity, d.low_similarity] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SpendwiseError::Config(format!(
                    "Similarity thresholds must be within 0..=1, got {}",
                    value
                )));
            }
        }
        if self.ai.max_batch == 0 {
            return Err(SpendwiseError::Config("ai.max_batch must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.base_currency, "USD");
        assert_eq!(settings.duplicates.medium_day_window, 1);
        assert_eq!(settings.duplicates.low_day_window, 3);
        assert!(settings.categorization.use_builtin_rules);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.base_currency = "EUR".into();
        settings.exchange_rates.insert("USD".into(), 0.92);
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.base_currency, "EUR");
        assert_eq!(loaded.exchange_rates.get("USD"), Some(&0.92));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        std::fs::write(paths.settings_file(), r#"{"base_currency": "GBP"}"#).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.base_currency, "GBP");
        assert_eq!(loaded.ai.max_batch, 25);
        assert_eq!(loaded.duplicates, DuplicateSettings::default());
    }

    #[test]
    fn test_rate_for() {
        let mut settings = Settings::default();
        settings.exchange_rates.insert("EUR".into(), 1.1);

        assert_eq!(settings.rate_for("USD").unwrap(), 1.0);
        assert_eq!(settings.rate_for("usd").unwrap(), 1.0);
        assert_eq!(settings.rate_for("eur").unwrap(), 1.1);
        assert!(matches!(
            settings.rate_for("JPY"),
            Err(SpendwiseError::UnknownCurrency(code)) if code == "JPY"
        ));
    }

    #[test]
    fn test_validate_rejects_bad_rate() {
        let mut settings = Settings::default();
        settings.exchange_rates.insert("EUR".into(), 0.0);
        assert!(settings.validate().is_err());
    }
}
