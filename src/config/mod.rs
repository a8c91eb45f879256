use crate::utils::validation::{ContentTypeMatch, FilenamePolicy};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "whisper-large-v3";
pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("GROQ_API_KEY must be set")]
    MissingApiKey,

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Service configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Credential for the transcription provider
    pub api_key: String,

    /// Base URL of the OpenAI-compatible provider (default: Groq)
    pub api_base_url: String,

    /// Model identifier sent with every request (default: "whisper-large-v3")
    pub model: String,

    /// Spoken language sent with every request (default: "en")
    pub language: String,

    /// Overall provider request timeout; `None` waits indefinitely
    pub request_timeout: Option<Duration>,

    /// Staging directory for uploads (default: "uploads"), never created by the service
    pub upload_dir: PathBuf,

    /// Maximum request body size in bytes (default: 100 MB)
    pub max_upload_size: usize,

    /// How client filenames become staging paths (default: strict)
    pub filename_policy: FilenamePolicy,

    /// How the declared content type is matched (default: normalized)
    pub content_type_match: ContentTypeMatch,

    /// Sniff uploaded bytes for an audio/video signature (default: false)
    pub verify_audio_content: bool,

    pub host: String,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            request_timeout: None,
            upload_dir: PathBuf::from("uploads"),
            max_upload_size: 100 * 1024 * 1024, // 100 MB
            filename_policy: FilenamePolicy::Strict,
            content_type_match: ContentTypeMatch::Normalized,
            verify_audio_content: false,
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Fails when the provider credential is absent so a misconfigured
    /// process never starts serving requests.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        let api_key = lookup("GROQ_API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let filename_policy = match lookup("FILENAME_POLICY") {
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
                name: "FILENAME_POLICY",
                value: v,
            })?,
            None => default.filename_policy,
        };

        let content_type_match = match lookup("CONTENT_TYPE_MATCH") {
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
                name: "CONTENT_TYPE_MATCH",
                value: v,
            })?,
            None => default.content_type_match,
        };

        let request_timeout = match lookup("TRANSCRIPTION_TIMEOUT_SECS") {
            Some(v) => Some(Duration::from_secs(v.parse().map_err(|_| {
                ConfigError::InvalidValue {
                    name: "TRANSCRIPTION_TIMEOUT_SECS",
                    value: v.clone(),
                }
            })?)),
            None => None,
        };

        Ok(Self {
            api_key,
            api_base_url: lookup("GROQ_API_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(default.api_base_url),
            model: lookup("TRANSCRIPTION_MODEL").unwrap_or(default.model),
            language: lookup("TRANSCRIPTION_LANGUAGE").unwrap_or(default.language),
            request_timeout,
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),
            max_upload_size: lookup("MAX_UPLOAD_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),
            filename_policy,
            content_type_match,
            verify_audio_content: lookup("VERIFY_AUDIO_CONTENT")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(default.verify_audio_content),
            host: lookup("HOST").unwrap_or(default.host),
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),
        })
    }

    /// Create config for development and tests (dummy key, permissive limits)
    pub fn development() -> Self {
        Self {
            api_key: "test-key".to_string(),
            ..Self::default()
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                name: "HOST",
                value: self.host.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_missing_api_key_fails() {
        let result = AppConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));

        let result = AppConfig::from_lookup(lookup_from(&[("GROQ_API_KEY", "   ")]));
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_defaults_with_api_key() {
        let config = AppConfig::from_lookup(lookup_from(&[("GROQ_API_KEY", "gsk_abc")])).unwrap();
        assert_eq!(config.api_key, "gsk_abc");
        assert_eq!(config.model, "whisper-large-v3");
        assert_eq!(config.language, "en");
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.filename_policy, FilenamePolicy::Strict);
        assert_eq!(config.content_type_match, ContentTypeMatch::Normalized);
        assert!(!config.verify_audio_content);
        assert!(config.request_timeout.is_none());
        assert_eq!(config.bind_addr().unwrap().port(), 8000);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("GROQ_API_KEY", "k"),
            ("GROQ_API_BASE_URL", "http://localhost:9999/v1/"),
            ("FILENAME_POLICY", "permissive"),
            ("CONTENT_TYPE_MATCH", "exact"),
            ("VERIFY_AUDIO_CONTENT", "TRUE"),
            ("TRANSCRIPTION_TIMEOUT_SECS", "30"),
            ("UPLOAD_DIR", "/tmp/staging"),
            ("PORT", "9000"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "http://localhost:9999/v1");
        assert_eq!(config.filename_policy, FilenamePolicy::Permissive);
        assert_eq!(config.content_type_match, ContentTypeMatch::Exact);
        assert!(config.verify_audio_content);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/staging"));
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_invalid_filename_policy() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("GROQ_API_KEY", "k"),
            ("FILENAME_POLICY", "lenient"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { name: "FILENAME_POLICY", .. })
        ));
    }

    #[test]
    fn test_development_config() {
        let config = AppConfig::development();
        assert!(!config.api_key.is_empty());
        assert_eq!(config.filename_policy, FilenamePolicy::Strict);
    }
}
