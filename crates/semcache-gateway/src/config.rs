//! Environment-backed process configuration.
//!
//! Built the way the teacher's `reflex::config::Config` is: hardcoded
//! defaults, a `from_env()` that overlays `std::env::var` lookups behind
//! named `ENV_*` constants, and a `validate()` run before the server binds.

use std::time::Duration;

use thiserror::Error;

const ENV_PORT: &str = "SEMCACHE_PORT";
const ENV_BIND_ADDR: &str = "SEMCACHE_BIND_ADDR";
const ENV_UPSTREAM_BASE_URL: &str = "SEMCACHE_UPSTREAM_BASE_URL";
const ENV_UPSTREAM_API_KEY: &str = "SEMCACHE_UPSTREAM_API_KEY";
const ENV_MATCH_THRESHOLD: &str = "SEMCACHE_MATCH_THRESHOLD";
const ENV_CAPTURE_MAX_BYTES: &str = "SEMCACHE_CAPTURE_MAX_BYTES";
const ENV_BACKGROUND_DEADLINE_MS: &str = "SEMCACHE_BACKGROUND_DEADLINE_MS";
const ENV_DEFAULT_MODEL: &str = "SEMCACHE_DEFAULT_MODEL";
const ENV_QDRANT_URL: &str = "SEMCACHE_QDRANT_URL";
const ENV_EMBEDDING_DIM: &str = "SEMCACHE_EMBEDDING_DIM";
const ENV_MOCK_UPSTREAM: &str = "SEMCACHE_MOCK_UPSTREAM";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be set (e.g. https://api.openai.com/v1)")]
    MissingRequired { var: &'static str },

    #[error("{var}='{value}' is not a valid {kind}")]
    InvalidValue {
        var: &'static str,
        value: String,
        kind: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind_addr: String,
    pub upstream_base_url: String,
    pub upstream_api_key: Option<String>,
    pub match_threshold: f32,
    pub capture_max_bytes: usize,
    pub background_deadline: Duration,
    pub default_model: String,
    pub qdrant_url: String,
    pub embedding_dim: usize,
    pub mock_upstream: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            upstream_base_url: String::new(),
            upstream_api_key: None,
            match_threshold: semcache::constants::DEFAULT_MATCH_THRESHOLD,
            capture_max_bytes: semcache::constants::DEFAULT_CAPTURE_MAX_BYTES,
            background_deadline: Duration::from_millis(
                semcache::constants::DEFAULT_BACKGROUND_DEADLINE_MS,
            ),
            default_model: semcache::constants::DEFAULT_MODEL.to_string(),
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            embedding_dim: semcache::constants::DEFAULT_EMBEDDING_DIM,
            mock_upstream: false,
        }
    }
}

impl Config {
    /// Loads config from the process environment, overlaying [`Default`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = env_var(ENV_PORT) {
            config.port = v
                .parse()
                .map_err(|_| invalid(ENV_PORT, &v, "u16 port number"))?;
        }
        if let Some(v) = env_var(ENV_BIND_ADDR) {
            config.bind_addr = v;
        }
        if let Some(v) = env_var(ENV_UPSTREAM_BASE_URL) {
            config.upstream_base_url = v;
        }
        config.upstream_api_key = env_var(ENV_UPSTREAM_API_KEY);
        if let Some(v) = env_var(ENV_MATCH_THRESHOLD) {
            config.match_threshold = v
                .parse()
                .map_err(|_| invalid(ENV_MATCH_THRESHOLD, &v, "float in [0,1]"))?;
        }
        if let Some(v) = env_var(ENV_CAPTURE_MAX_BYTES) {
            config.capture_max_bytes = v
                .parse()
                .map_err(|_| invalid(ENV_CAPTURE_MAX_BYTES, &v, "positive integer"))?;
        }
        if let Some(v) = env_var(ENV_BACKGROUND_DEADLINE_MS) {
            let ms: u64 = v
                .parse()
                .map_err(|_| invalid(ENV_BACKGROUND_DEADLINE_MS, &v, "positive integer"))?;
            config.background_deadline = Duration::from_millis(ms);
        }
        if let Some(v) = env_var(ENV_DEFAULT_MODEL) {
            config.default_model = v;
        }
        if let Some(v) = env_var(ENV_QDRANT_URL) {
            config.qdrant_url = v;
        }
        if let Some(v) = env_var(ENV_EMBEDDING_DIM) {
            config.embedding_dim = v
                .parse()
                .map_err(|_| invalid(ENV_EMBEDDING_DIM, &v, "positive integer"))?;
        }
        config.mock_upstream = env_var(ENV_MOCK_UPSTREAM).is_some_and(|v| !v.is_empty());

        Ok(config)
    }

    /// Checks preconditions that `from_env()` alone can't (cross-field
    /// constraints, not just per-field parseability).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream_base_url.is_empty() && !self.mock_upstream {
            return Err(ConfigError::MissingRequired {
                var: ENV_UPSTREAM_BASE_URL,
            });
        }
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(ConfigError::InvalidValue {
                var: ENV_MATCH_THRESHOLD,
                value: self.match_threshold.to_string(),
                kind: "float in [0,1]",
            });
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn invalid(var: &'static str, value: &str, kind: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        var,
        value: value.to_string(),
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_reference_values() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.match_threshold, 0.9);
        assert_eq!(config.capture_max_bytes, 1024 * 1024);
        assert_eq!(config.background_deadline, Duration::from_millis(120_000));
    }

    #[test]
    fn validate_requires_upstream_url_unless_mocked() {
        let mut config = Config::default();
        assert!(config.validate().is_err());
        config.mock_upstream = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_threshold() {
        let mut config = Config::default();
        config.mock_upstream = true;
        config.match_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn socket_addr_formats_bind_addr_and_port() {
        let config = Config::default();
        assert_eq!(config.socket_addr(), "127.0.0.1:8080");
    }
}
