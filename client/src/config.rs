//! Client configuration.
//!
//! [`AppwriteConfig`] locates the backend project and the resources the
//! client uses; [`PollPolicy`] bounds the completion polling loop.
//!
//! Defaults match the hosted deployment. With the `cli` feature both can be
//! read from the environment (a `.env` file is loaded first):
//!
//! | Variable | Default |
//! |----------|---------|
//! | `APPWRITE_ENDPOINT` | `https://sfo.cloud.appwrite.io/v1` |
//! | `APPWRITE_PROJECT_ID` | `699f63e60001708923ba` |
//! | `APPWRITE_DATABASE_ID` | `main` |
//! | `APPWRITE_COLLECTION_ID` | `results` |
//! | `APPWRITE_BUCKET_ID` | `ply-files` |
//! | `APPWRITE_FUNCTION_ID` | `process-ply` |
//! | `APPWRITE_API_KEY` | unset |
//! | `PLYMEASURE_POLL_INTERVAL_SECS` | `2` |
//! | `PLYMEASURE_POLL_MAX_ATTEMPTS` | `30` |

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "https://sfo.cloud.appwrite.io/v1";
pub const DEFAULT_PROJECT_ID: &str = "699f63e60001708923ba";
pub const DEFAULT_DATABASE_ID: &str = "main";
pub const DEFAULT_COLLECTION_ID: &str = "results";
pub const DEFAULT_BUCKET_ID: &str = "ply-files";
pub const DEFAULT_FUNCTION_ID: &str = "process-ply";

/// Seconds between two reads of the result record.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Reads of the result record before giving up.
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 30;

/// Backend project and resource identifiers.
#[derive(Clone, PartialEq)]
pub struct AppwriteConfig {
    /// API root, e.g. `https://cloud.appwrite.io/v1`.
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub collection_id: String,
    pub bucket_id: String,
    pub function_id: String,
    /// Server API key. Mobile and browser clients run without one.
    pub api_key: Option<String>,
}

impl Default for AppwriteConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            project_id: DEFAULT_PROJECT_ID.to_string(),
            database_id: DEFAULT_DATABASE_ID.to_string(),
            collection_id: DEFAULT_COLLECTION_ID.to_string(),
            bucket_id: DEFAULT_BUCKET_ID.to_string(),
            function_id: DEFAULT_FUNCTION_ID.to_string(),
            api_key: None,
        }
    }
}

impl std::fmt::Debug for AppwriteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppwriteConfig")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("database_id", &self.database_id)
            .field("collection_id", &self.collection_id)
            .field("bucket_id", &self.bucket_id)
            .field("function_id", &self.function_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AppwriteConfig {
    /// Build a config from a variable lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str, default: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            endpoint: get("APPWRITE_ENDPOINT", DEFAULT_ENDPOINT)
                .trim_end_matches('/')
                .to_string(),
            project_id: get("APPWRITE_PROJECT_ID", DEFAULT_PROJECT_ID),
            database_id: get("APPWRITE_DATABASE_ID", DEFAULT_DATABASE_ID),
            collection_id: get("APPWRITE_COLLECTION_ID", DEFAULT_COLLECTION_ID),
            bucket_id: get("APPWRITE_BUCKET_ID", DEFAULT_BUCKET_ID),
            function_id: get("APPWRITE_FUNCTION_ID", DEFAULT_FUNCTION_ID),
            api_key: lookup("APPWRITE_API_KEY")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        }
    }

    /// Read the config from the process environment, loading `.env` first.
    #[cfg(feature = "cli")]
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Set the API endpoint.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    /// Set the project id.
    pub fn with_project(mut self, project_id: &str) -> Self {
        self.project_id = project_id.to_string();
        self
    }

    /// Set the server API key.
    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }
}

/// Bounded polling of the result record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait before each read.
    pub interval: Duration,
    /// Maximum number of reads.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
        }
    }
}

impl PollPolicy {
    /// Upper bound on the time spent polling.
    pub fn ceiling(&self) -> Duration {
        self.interval * self.max_attempts
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let interval = match lookup("PLYMEASURE_POLL_INTERVAL_SECS") {
            Some(value) => Duration::from_secs(parse_var("PLYMEASURE_POLL_INTERVAL_SECS", &value)?),
            None => defaults.interval,
        };

        let max_attempts = match lookup("PLYMEASURE_POLL_MAX_ATTEMPTS") {
            Some(value) => parse_var("PLYMEASURE_POLL_MAX_ATTEMPTS", &value)?,
            None => defaults.max_attempts,
        };

        if max_attempts == 0 {
            return Err(ConfigError::OutOfRange(
                "PLYMEASURE_POLL_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        Ok(Self { interval, max_attempts })
    }

    /// Read the policy from the process environment, loading `.env` first.
    #[cfg(feature = "cli")]
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppwriteConfig::from_lookup(|_| None);
        assert_eq!(config, AppwriteConfig::default());
        assert_eq!(config.bucket_id, "ply-files");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_lookup_overrides() {
        let config = AppwriteConfig::from_lookup(lookup_from(&[
            ("APPWRITE_ENDPOINT", "http://localhost:8080/v1/"),
            ("APPWRITE_PROJECT_ID", "local"),
            ("APPWRITE_API_KEY", "secret"),
            ("APPWRITE_BUCKET_ID", "  "),
        ]));
        assert_eq!(config.endpoint, "http://localhost:8080/v1");
        assert_eq!(config.project_id, "local");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.bucket_id, DEFAULT_BUCKET_ID);
    }

    #[test]
    fn test_api_key_redacted_in_debug() {
        let config = AppwriteConfig::default().with_api_key("very-secret");
        assert!(!format!("{:?}", config).contains("very-secret"));
    }

    #[test]
    fn test_poll_policy_defaults() {
        let policy = PollPolicy::from_lookup(|_| None).unwrap();
        assert_eq!(policy.interval, Duration::from_secs(2));
        assert_eq!(policy.max_attempts, 30);
        assert_eq!(policy.ceiling(), Duration::from_secs(60));
    }

    #[test]
    fn test_poll_policy_invalid_values() {
        let err = PollPolicy::from_lookup(lookup_from(&[("PLYMEASURE_POLL_INTERVAL_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("PLYMEASURE_POLL_INTERVAL_SECS"));

        let err = PollPolicy::from_lookup(lookup_from(&[("PLYMEASURE_POLL_MAX_ATTEMPTS", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange(_)));
    }
}
