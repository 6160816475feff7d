//! API configuration.

use std::path::PathBuf;
use std::time::Duration;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second (global; single-operator service)
    pub rate_limit_rps: u32,
    /// Request timeout
    pub request_timeout: Duration,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Directory for persisted documents
    pub data_dir: PathBuf,
    /// Public base URL used to build the OAuth redirect URI
    pub public_base_url: String,
    /// Text-generation API base URL
    pub generation_base_url: String,
    /// Text-generation model
    pub generation_model: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 10,
            request_timeout: Duration::from_secs(30),
            max_body_size: 1024 * 1024, // 1MB, JSON bodies only
            environment: "development".to_string(),
            data_dir: PathBuf::from("data"),
            public_base_url: "http://localhost:8000".to_string(),
            generation_base_url: "https://api.anthropic.com".to_string(),
            generation_model: "claude-3-5-haiku-latest".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.rate_limit_rps),
            request_timeout: Duration::from_secs(
                std::env::var("REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or(defaults.public_base_url),
            generation_base_url: std::env::var("GENERATION_API_BASE")
                .unwrap_or(defaults.generation_base_url),
            generation_model: std::env::var("GENERATION_MODEL")
                .unwrap_or(defaults.generation_model),
        }
    }

    /// OAuth redirect URI handled by this server.
    pub fn redirect_uri(&self) -> String {
        format!(
            "{}/api/auth/callback",
            self.public_base_url.trim_end_matches('/')
        )
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        std::env::remove_var("API_PORT");
        std::env::remove_var("DATA_DIR");
        let config = ApiConfig::from_env();
        assert_eq!(config.port, 8000);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(!config.is_production());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("API_PORT", "9001");
        std::env::set_var("PUBLIC_BASE_URL", "https://shorts.example/");
        let config = ApiConfig::from_env();
        assert_eq!(config.port, 9001);
        assert_eq!(
            config.redirect_uri(),
            "https://shorts.example/api/auth/callback"
        );
        std::env::remove_var("API_PORT");
        std::env::remove_var("PUBLIC_BASE_URL");
    }

    #[test]
    #[serial]
    fn test_invalid_env_values_fall_back() {
        std::env::set_var("API_PORT", "not-a-port");
        let config = ApiConfig::from_env();
        assert_eq!(config.port, 8000);
        std::env::remove_var("API_PORT");
    }
}
