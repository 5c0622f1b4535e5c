//! Configuration management

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::core::errors::ConfigError;

/// Largest accepted `MAX_RETRIES`
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Settings for the chat-completion provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Sent as `HTTP-Referer` for provider-side attribution
    pub site_url: String,
    /// Sent as `X-Title` for provider-side attribution
    pub site_name: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
            site_url: "http://localhost:3000".to_string(),
            site_name: "Tiny Translator".to_string(),
            timeout_ms: 30000,
            max_retries: 2,
            retry_delay_ms: 500,
        }
    }
}

impl ProviderConfig {
    /// Per-attempt timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Whether a credential is present
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Full URL of the chat-completion endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Process-wide application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    pub debug: bool,
    pub host: String,
    pub port: u16,
    pub default_source_lang: String,
    pub default_target_lang: String,
    pub provider: ProviderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "Tiny Translator".to_string(),
            debug: false,
            host: "127.0.0.1".to_string(),
            port: 8765,
            default_source_lang: "auto".to_string(),
            default_target_lang: "zh-CN".to_string(),
            provider: ProviderConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();
        let provider_defaults = defaults.provider;

        let provider = ProviderConfig {
            api_key: get("OPENROUTER_API_KEY"),
            base_url: get("OPENROUTER_BASE_URL").unwrap_or(provider_defaults.base_url),
            model: get("MODEL_NAME").unwrap_or(provider_defaults.model),
            site_url: get("OPENROUTER_SITE_URL").unwrap_or(provider_defaults.site_url),
            site_name: get("OPENROUTER_SITE_NAME").unwrap_or(provider_defaults.site_name),
            timeout_ms: parse_or("REQUEST_TIMEOUT_MS", get("REQUEST_TIMEOUT_MS"), provider_defaults.timeout_ms)?,
            max_retries: parse_or("MAX_RETRIES", get("MAX_RETRIES"), provider_defaults.max_retries)?,
            retry_delay_ms: parse_or("RETRY_DELAY_MS", get("RETRY_DELAY_MS"), provider_defaults.retry_delay_ms)?,
        };

        let debug = match get("DEBUG") {
            Some(value) => parse_bool("DEBUG", &value)?,
            None => defaults.debug,
        };

        let config = Self {
            app_name: get("APP_NAME").unwrap_or(defaults.app_name),
            debug,
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", get("PORT"), defaults.port)?,
            default_source_lang: get("DEFAULT_SOURCE_LANG").unwrap_or(defaults.default_source_lang),
            default_target_lang: get("DEFAULT_TARGET_LANG").unwrap_or(defaults.default_target_lang),
            provider,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.base_url.is_empty() {
            return Err(ConfigError::MissingValue {
                key: "OPENROUTER_BASE_URL".to_string(),
            });
        }

        if self.provider.model.is_empty() {
            return Err(ConfigError::MissingValue {
                key: "MODEL_NAME".to_string(),
            });
        }

        if self.provider.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "REQUEST_TIMEOUT_MS".to_string(),
                value: "0".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        if self.provider.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::InvalidValue {
                key: "MAX_RETRIES".to_string(),
                value: self.provider.max_retries.to_string(),
                message: format!("must be at most {}", MAX_RETRIES_LIMIT),
            });
        }

        Ok(())
    }

    /// Socket address string the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.clone(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            message: "expected a boolean".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = load(&[]).unwrap();

        assert_eq!(config.app_name, "Tiny Translator");
        assert_eq!(config.bind_addr(), "127.0.0.1:8765");
        assert_eq!(config.default_source_lang, "auto");
        assert_eq!(config.default_target_lang, "zh-CN");
        assert_eq!(config.provider.model, "openai/gpt-4o-mini");
        assert_eq!(config.provider.timeout(), Duration::from_secs(30));
        assert_eq!(config.provider.max_retries, 2);
        assert!(!config.provider.is_configured());
        assert!(!config.debug);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("OPENROUTER_BASE_URL", "http://127.0.0.1:9000/v1/"),
            ("PORT", "9999"),
            ("DEBUG", "True"),
            ("MODEL_NAME", "anthropic/claude-3-haiku"),
        ])
        .unwrap();

        assert!(config.provider.is_configured());
        assert_eq!(config.port, 9999);
        assert!(config.debug);
        assert_eq!(config.provider.model, "anthropic/claude-3-haiku");
        assert_eq!(
            config.provider.completions_url(),
            "http://127.0.0.1:9000/v1/chat/completions"
        );
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = load(&[("OPENROUTER_API_KEY", "  "), ("PORT", "")]).unwrap();

        assert_eq!(config.provider.api_key, None);
        assert_eq!(config.port, 8765);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            load(&[("PORT", "not-a-port")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(load(&[("DEBUG", "maybe")]).is_err());
        assert!(load(&[("REQUEST_TIMEOUT_MS", "0")]).is_err());
    }

    #[test]
    fn test_retry_budget_is_capped() {
        assert_eq!(load(&[("MAX_RETRIES", "10")]).unwrap().provider.max_retries, 10);
        assert_eq!(load(&[("MAX_RETRIES", "0")]).unwrap().provider.max_retries, 0);

        match load(&[("MAX_RETRIES", "70")]) {
            Err(ConfigError::InvalidValue { key, value, .. }) => {
                assert_eq!(key, "MAX_RETRIES");
                assert_eq!(value, "70");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
