//! API Configuration Module
//!
//! Configuration is loaded from `GITPULSE_*` environment variables with
//! development defaults: a local Redis on database 0, the public GitHub API
//! as the upstream, and a 10 requests/minute per-route rate limit.

use std::net::SocketAddr;

use crate::error::{ApiError, ApiResult};

// ============================================================================
// APP CONFIGURATION
// ============================================================================

/// Application configuration for the GitPulse API server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // ========================================================================
    // Server Configuration
    // ========================================================================
    /// Bind host for the HTTP listener.
    pub bind_host: String,

    /// Bind port for the HTTP listener.
    pub port: u16,

    // ========================================================================
    // Cache Store Configuration
    // ========================================================================
    /// Redis host.
    pub redis_host: String,

    /// Redis port.
    pub redis_port: u16,

    /// Redis password, if the server requires one.
    pub redis_password: Option<String>,

    /// Redis database index.
    pub redis_db: u32,

    // ========================================================================
    // Upstream Configuration
    // ========================================================================
    /// Base URL of the upstream search API.
    pub github_base_url: String,

    // ========================================================================
    // Rate Limiting Configuration
    // ========================================================================
    /// Whether rate limiting is enabled.
    pub rate_limit_enabled: bool,

    /// Requests per minute allowed per route, per client.
    pub rate_limit_per_minute: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3000,

            redis_host: "127.0.0.1".to_string(),
            redis_port: 6379,
            redis_password: None,
            redis_db: 0,

            github_base_url: gitpulse_core::DEFAULT_BASE_URL.to_string(),

            rate_limit_enabled: true,
            rate_limit_per_minute: 10,
        }
    }
}

impl AppConfig {
    /// Create AppConfig from environment variables.
    ///
    /// Environment variables:
    /// - `GITPULSE_BIND`: Bind host (default: 0.0.0.0)
    /// - `PORT` / `GITPULSE_PORT`: Bind port (default: 3000)
    /// - `GITPULSE_REDIS_HOST`: Redis host (default: 127.0.0.1)
    /// - `GITPULSE_REDIS_PORT`: Redis port (default: 6379)
    /// - `GITPULSE_REDIS_PASSWORD`: Redis password (default: none)
    /// - `GITPULSE_REDIS_DB`: Redis database index (default: 0)
    /// - `GITPULSE_GITHUB_BASE_URL`: Upstream base URL (default: https://api.github.com)
    /// - `GITPULSE_RATE_LIMIT_ENABLED`: "true" or "false" (default: true)
    /// - `GITPULSE_RATE_LIMIT_PER_MINUTE`: Per-route quota (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_host = std::env::var("GITPULSE_BIND").unwrap_or(defaults.bind_host);

        let port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("GITPULSE_PORT").ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let redis_host = std::env::var("GITPULSE_REDIS_HOST").unwrap_or(defaults.redis_host);

        let redis_port = std::env::var("GITPULSE_REDIS_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.redis_port);

        let redis_password = std::env::var("GITPULSE_REDIS_PASSWORD")
            .ok()
            .filter(|s| !s.is_empty());

        let redis_db = std::env::var("GITPULSE_REDIS_DB")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.redis_db);

        let github_base_url =
            std::env::var("GITPULSE_GITHUB_BASE_URL").unwrap_or(defaults.github_base_url);

        let rate_limit_enabled = std::env::var("GITPULSE_RATE_LIMIT_ENABLED")
            .ok()
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(defaults.rate_limit_enabled);

        let rate_limit_per_minute = std::env::var("GITPULSE_RATE_LIMIT_PER_MINUTE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.rate_limit_per_minute);

        Self {
            bind_host,
            port,
            redis_host,
            redis_port,
            redis_password,
            redis_db,
            github_base_url,
            rate_limit_enabled,
            rate_limit_per_minute,
        }
    }

    /// Render the Redis connection URL.
    pub fn redis_url(&self) -> String {
        match &self.redis_password {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                password, self.redis_host, self.redis_port, self.redis_db
            ),
            None => format!(
                "redis://{}:{}/{}",
                self.redis_host, self.redis_port, self.redis_db
            ),
        }
    }

    /// Resolve the socket address to bind the listener to.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>().map_err(|e| {
            ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.redis_port, 6379);
        assert_eq!(config.redis_db, 0);
        assert!(config.redis_password.is_none());
        assert_eq!(config.github_base_url, "https://api.github.com");
        assert!(config.rate_limit_enabled);
        assert_eq!(config.rate_limit_per_minute, 10);
    }

    #[test]
    fn test_redis_url_without_password() {
        let config = AppConfig::default();
        assert_eq!(config.redis_url(), "redis://127.0.0.1:6379/0");
    }

    #[test]
    fn test_redis_url_with_password() {
        let config = AppConfig {
            redis_password: Some("sesame".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(config.redis_url(), "redis://:sesame@127.0.0.1:6379/0");
    }

    #[test]
    fn test_bind_addr() {
        let config = AppConfig {
            bind_host: "127.0.0.1".to_string(),
            port: 8080,
            ..AppConfig::default()
        };
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_bind_addr_rejects_invalid_host() {
        let config = AppConfig {
            bind_host: "not a host".to_string(),
            ..AppConfig::default()
        };
        assert!(config.bind_addr().is_err());
    }
}
