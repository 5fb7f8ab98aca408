//! Application configuration
//!
//! Settings come from environment variables with sensible defaults. The API
//! key is the one exception: it is read once at startup from a small JSON
//! file in the user's home directory.

use crate::error::ConfigError;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use zeroize::Zeroize;

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default Gemini API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default display drain cadence in milliseconds
pub const DEFAULT_FRAME_MS: u64 = 50;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Gemini API configuration
    pub gemini: GeminiConfig,
    /// Location of the credential file
    pub credential_path: PathBuf,
    /// How often the front-end drains the display queue (in milliseconds)
    pub frame_interval_ms: u64,
}

/// Gemini API configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Model name (e.g. "gemini-2.5-flash")
    pub model: String,
    /// API base URL, without trailing slash
    pub api_base_url: String,
    /// Timeout for a single generateContent call (in seconds)
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            gemini: GeminiConfig {
                model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                api_base_url: var("GEMINI_API_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
                timeout_secs: var("GEMINI_TIMEOUT_SECS")
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
            credential_path: var("GEMINI_CHAT_CREDENTIALS")
                .map(PathBuf::from)
                .unwrap_or_else(|| default_credential_path(var("HOME"))),
            frame_interval_ms: var("GEMINI_CHAT_FRAME_MS")
                .and_then(|t| t.parse().ok())
                .unwrap_or(DEFAULT_FRAME_MS),
        }
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gemini.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model cannot be empty".to_string()));
        }
        if self.gemini.api_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "api_base_url cannot be empty".to_string(),
            ));
        }
        if self.gemini.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be > 0".to_string()));
        }
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "frame_interval_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default credential path: `$HOME/.gemini-chat/credentials.json`,
/// or `credentials.json` in the working directory when there is no home
fn default_credential_path(home: Option<String>) -> PathBuf {
    match home {
        Some(home) => {
            let mut path = PathBuf::from(home);
            path.push(".gemini-chat");
            path.push("credentials.json");
            path
        }
        None => PathBuf::from("credentials.json"),
    }
}

/// Gemini API key that never shows up in logs or debug output
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Raw key value, for the request query string only
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the key is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey([REDACTED])")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED API KEY]")
    }
}

impl Drop for ApiKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// On-disk shape of the credential file
#[derive(Deserialize)]
struct CredentialFile {
    #[serde(alias = "apiKey")]
    api_key: String,
}

/// Load the API key from a JSON credential file
///
/// # Returns
/// * `Ok(Some(ApiKey))` - The file exists and holds an `api_key` string
/// * `Ok(None)` - The file does not exist
/// * `Err(ConfigError)` - The file exists but is unreadable or malformed
///
/// The key's shape is not validated; a bad key only surfaces as a failed request.
pub fn load_credential<P: AsRef<Path>>(path: P) -> Result<Option<ApiKey>, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(path).map_err(|source| ConfigError::CredentialRead {
        path: path.to_path_buf(),
        source,
    })?;

    let file: CredentialFile =
        serde_json::from_str(&json).map_err(|source| ConfigError::CredentialParse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(Some(ApiKey::new(file.api_key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("HOME", "/home/tester")]);
        assert_eq!(config.gemini.model, DEFAULT_MODEL);
        assert_eq!(config.gemini.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.gemini.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.frame_interval_ms, DEFAULT_FRAME_MS);
        assert_eq!(
            config.credential_path,
            PathBuf::from("/home/tester/.gemini-chat/credentials.json")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_no_home_falls_back_to_working_directory() {
        let config = config_from(&[]);
        assert_eq!(config.credential_path, PathBuf::from("credentials.json"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("GEMINI_MODEL", "gemini-2.5-pro"),
            ("GEMINI_API_BASE_URL", "http://127.0.0.1:9999/"),
            ("GEMINI_TIMEOUT_SECS", "5"),
            ("GEMINI_CHAT_CREDENTIALS", "/tmp/key.json"),
            ("GEMINI_CHAT_FRAME_MS", "16"),
        ]);
        assert_eq!(config.gemini.model, "gemini-2.5-pro");
        assert_eq!(config.gemini.api_base_url, "http://127.0.0.1:9999");
        assert_eq!(config.gemini.timeout_secs, 5);
        assert_eq!(config.credential_path, PathBuf::from("/tmp/key.json"));
        assert_eq!(config.frame_interval_ms, 16);
    }

    #[test]
    fn test_unparseable_numbers_use_defaults() {
        let config = config_from(&[
            ("GEMINI_TIMEOUT_SECS", "soon"),
            ("GEMINI_CHAT_FRAME_MS", "-1"),
        ]);
        assert_eq!(config.gemini.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.frame_interval_ms, DEFAULT_FRAME_MS);
    }

    #[test]
    fn test_validate_rejects_zero_and_empty() {
        let mut config = config_from(&[]);
        config.gemini.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = config_from(&[]);
        config.gemini.model = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = config_from(&[]);
        config.frame_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_credential() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"api_key": "secret-123"}}"#).unwrap();

        let key = load_credential(file.path()).unwrap().unwrap();
        assert_eq!(key.expose(), "secret-123");
    }

    #[test]
    fn test_load_credential_camel_case_field() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"apiKey": "secret-456"}}"#).unwrap();

        let key = load_credential(file.path()).unwrap().unwrap();
        assert_eq!(key.expose(), "secret-456");
    }

    #[test]
    fn test_load_credential_missing_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();
        drop(temp_file);

        assert!(load_credential(&path).unwrap().is_none());
    }

    #[test]
    fn test_load_credential_malformed() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "api_key = nope").unwrap();

        let result = load_credential(file.path());
        assert!(matches!(result, Err(ConfigError::CredentialParse { .. })));
    }

    #[test]
    fn test_api_key_is_redacted() {
        let key = ApiKey::new("super-secret");
        assert!(!format!("{:?}", key).contains("super-secret"));
        assert!(!key.to_string().contains("super-secret"));
    }
}
