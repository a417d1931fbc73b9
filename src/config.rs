//! Configuration management for the `WanderWise` backend
//!
//! Settings come from environment variables (optionally seeded from a `.env`
//! file), are read once at startup and handed to the clients by value.

use crate::WanderError;
use anyhow::{Context, Result};
use config::{Config, Environment, Map};
use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure for the `WanderWise` backend
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// LLM provider settings
    pub llm: LlmConfig,
    /// Maps provider settings
    pub maps: MapsConfig,
    /// Settings shared by all outbound calls
    pub upstream: UpstreamConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Pre-built frontend served for every non-API path
    pub static_dir: PathBuf,
    pub tls_cert_path: Option<PathBuf>,
    pub tls_key_path: Option<PathBuf>,
}

/// LLM chat-completion provider settings
#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

/// Directions and places provider settings
#[derive(Clone)]
pub struct MapsConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `wanderwise=debug`
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
    /// OTLP collector endpoint; trace export is off when unset
    pub otlp_endpoint: Option<String>,
}

/// The recognised environment variables, keyed by their lowercased names
#[derive(Debug, Deserialize)]
struct EnvSettings {
    port: Option<u16>,
    static_dir: Option<String>,
    tls_cert_path: Option<String>,
    tls_key_path: Option<String>,
    openai_api_key: Option<String>,
    openai_model: Option<String>,
    openai_base_url: Option<String>,
    google_maps_api_key: Option<String>,
    google_maps_base_url: Option<String>,
    upstream_timeout_seconds: Option<u32>,
    rust_log: Option<String>,
    log_format: Option<String>,
    otel_exporter_otlp_endpoint: Option<String>,
}

// Keys must never end up in logs.
impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl std::fmt::Debug for MapsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapsConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

// Default value functions
fn default_port() -> u16 {
    5000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("frontend/dist")
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_maps_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

fn default_upstream_timeout() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: default_port(),
                static_dir: default_static_dir(),
                tls_cert_path: None,
                tls_key_path: None,
            },
            llm: LlmConfig {
                api_key: None,
                model: default_llm_model(),
                base_url: default_llm_base_url(),
            },
            maps: MapsConfig {
                api_key: None,
                base_url: default_maps_base_url(),
            },
            upstream: UpstreamConfig {
                timeout_seconds: default_upstream_timeout(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
                otlp_endpoint: None,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env` and the process environment
    pub fn load() -> Result<Self> {
        dotenv_outcome(dotenvy::dotenv())?;
        Self::from_environment(None)
    }

    /// Build configuration from the process environment, or from `vars` when
    /// given.
    ///
    /// Empty and whitespace-only values count as unset.
    pub fn from_environment(vars: Option<Map<String, String>>) -> Result<Self> {
        // Numeric fields are parsed during deserialization; `try_parsing`
        // would also turn all-digit keys into integers.
        let settings = Config::builder()
            .add_source(Environment::default().ignore_empty(true).source(vars))
            .build()
            .with_context(|| "Failed to build configuration")?;

        let env: EnvSettings = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        let mut config = Self::from(env);

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.llm.model.is_empty() {
            self.llm.model = default_llm_model();
        }
        if self.llm.base_url.is_empty() {
            self.llm.base_url = default_llm_base_url();
        }
        if self.maps.base_url.is_empty() {
            self.maps.base_url = default_maps_base_url();
        }
        if self.upstream.timeout_seconds == 0 {
            self.upstream.timeout_seconds = default_upstream_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        // Trailing slashes would produce `//` when endpoints are appended.
        self.llm.base_url = self.llm.base_url.trim_end_matches('/').to_string();
        self.maps.base_url = self.maps.base_url.trim_end_matches('/').to_string();
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_tls()?;
        Ok(())
    }

    /// Names of provider keys that are not configured
    #[must_use]
    pub fn missing_api_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.llm.api_key.is_none() {
            missing.push("OPENAI_API_KEY");
        }
        if self.maps.api_key.is_none() {
            missing.push("GOOGLE_MAPS_API_KEY");
        }
        missing
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.upstream.timeout_seconds > 300 {
            return Err(
                WanderError::config("Upstream timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.server.port == 0 {
            return Err(WanderError::config("PORT cannot be 0").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WanderError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("OPENAI_BASE_URL", &self.llm.base_url),
            ("GOOGLE_MAPS_BASE_URL", &self.maps.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WanderError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }

    fn validate_tls(&self) -> Result<()> {
        match (&self.server.tls_cert_path, &self.server.tls_key_path) {
            (Some(_), None) | (None, Some(_)) => Err(WanderError::config(
                "TLS_CERT_PATH and TLS_KEY_PATH must be set together",
            )
            .into()),
            _ => Ok(()),
        }
    }
}

impl From<EnvSettings> for AppConfig {
    fn from(env: EnvSettings) -> Self {
        let defaults = Self::default();
        Self {
            server: ServerConfig {
                port: env.port.unwrap_or(defaults.server.port),
                static_dir: non_blank(env.static_dir)
                    .map_or(defaults.server.static_dir, PathBuf::from),
                tls_cert_path: non_blank(env.tls_cert_path).map(PathBuf::from),
                tls_key_path: non_blank(env.tls_key_path).map(PathBuf::from),
            },
            llm: LlmConfig {
                api_key: non_blank(env.openai_api_key),
                model: non_blank(env.openai_model).unwrap_or(defaults.llm.model),
                base_url: non_blank(env.openai_base_url).unwrap_or(defaults.llm.base_url),
            },
            maps: MapsConfig {
                api_key: non_blank(env.google_maps_api_key),
                base_url: non_blank(env.google_maps_base_url).unwrap_or(defaults.maps.base_url),
            },
            upstream: UpstreamConfig {
                timeout_seconds: env
                    .upstream_timeout_seconds
                    .unwrap_or(defaults.upstream.timeout_seconds),
            },
            logging: LoggingConfig {
                level: non_blank(env.rust_log).unwrap_or(defaults.logging.level),
                format: non_blank(env.log_format)
                    .map_or(defaults.logging.format, |format| format.to_lowercase()),
                otlp_endpoint: non_blank(env.otel_exporter_otlp_endpoint),
            },
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// A missing `.env` file is the normal case in production; a broken one is not.
fn dotenv_outcome<T>(result: dotenvy::Result<T>) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e).with_context(|| "Failed to load .env file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(
            config.maps.base_url,
            "https://maps.googleapis.com/maps/api"
        );
        assert_eq!(config.upstream.timeout_seconds, 30);
        assert_eq!(config.logging.level, "info");
        assert!(config.llm.api_key.is_none());
        assert!(config.maps.api_key.is_none());
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = AppConfig::from_environment(env(&[])).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(
            config.missing_api_keys(),
            vec!["OPENAI_API_KEY", "GOOGLE_MAPS_API_KEY"]
        );
    }

    #[test]
    fn test_environment_overrides() {
        let config = AppConfig::from_environment(env(&[
            ("PORT", "8080"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("GOOGLE_MAPS_API_KEY", "maps-key"),
            ("GOOGLE_MAPS_BASE_URL", "http://127.0.0.1:9000/maps/"),
            ("UPSTREAM_TIMEOUT_SECONDS", "10"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.maps.api_key.as_deref(), Some("maps-key"));
        assert_eq!(config.maps.base_url, "http://127.0.0.1:9000/maps");
        assert_eq!(config.upstream.timeout_seconds, 10);
        assert_eq!(config.logging.format, "json");
        assert!(config.missing_api_keys().is_empty());
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = AppConfig::from_environment(env(&[
            ("OPENAI_API_KEY", "   "),
            ("OPENAI_MODEL", ""),
        ]))
        .unwrap();
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = AppConfig::from_environment(env(&[("PORT", "not-a-port")]));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to deserialize configuration")
        );
    }

    #[test]
    fn test_all_digit_key_stays_verbatim() {
        let config =
            AppConfig::from_environment(env(&[("GOOGLE_MAPS_API_KEY", "0012345")])).unwrap();
        assert_eq!(config.maps.api_key.as_deref(), Some("0012345"));
    }

    #[test]
    fn test_unrelated_variables_are_ignored() {
        let config = AppConfig::from_environment(env(&[
            ("HOME", "/root"),
            ("CARGO_PKG_NAME", "wanderwise"),
            ("PORT", "7000"),
        ]))
        .unwrap();
        assert_eq!(config.server.port, 7000);
    }

    #[test]
    fn test_missing_dotenv_file_is_fine() {
        let missing = std::env::temp_dir().join("wanderwise-no-such-file.env");
        assert!(dotenv_outcome(dotenvy::from_path(&missing)).is_ok());
    }

    #[test]
    fn test_malformed_dotenv_file_is_an_error() {
        let path = std::env::temp_dir().join(format!(
            "wanderwise-malformed-{}.env",
            std::process::id()
        ));
        std::fs::write(&path, "NOT VALID LINE\n").unwrap();

        let result = dotenv_outcome(dotenvy::from_path(&path));
        std::fs::remove_file(&path).unwrap();

        assert!(result.unwrap_err().to_string().contains(".env"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = AppConfig::default();
        config.upstream.timeout_seconds = 500;
        let result = config.validate();
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("timeout cannot exceed")
        );
    }

    #[test]
    fn test_config_validation_invalid_log_format() {
        let mut config = AppConfig::default();
        config.logging.format = "xml".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Invalid log format"));
    }

    #[test]
    fn test_config_validation_base_url_scheme() {
        let result = AppConfig::from_environment(env(&[("OPENAI_BASE_URL", "api.openai.com")]));
        assert!(result.unwrap_err().to_string().contains("OPENAI_BASE_URL"));
    }

    #[test]
    fn test_tls_paths_must_be_paired() {
        let result = AppConfig::from_environment(env(&[("TLS_CERT_PATH", "cert.pem")]));
        assert!(result.is_err());

        let config = AppConfig::from_environment(env(&[
            ("TLS_CERT_PATH", "cert.pem"),
            ("TLS_KEY_PATH", "key.pem"),
        ]))
        .unwrap();
        assert_eq!(
            config.server.tls_cert_path,
            Some(PathBuf::from("cert.pem"))
        );
    }

    #[test]
    fn test_debug_output_redacts_keys() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("sk-secret".to_string());
        config.maps.api_key = Some("maps-secret".to_string());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(!debug.contains("maps-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
