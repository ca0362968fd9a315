use std::env::var;
use std::time::Duration;

use dotenvy::dotenv;

use crate::TransportLimits;

/// Application configuration with environment variable overrides
#[derive(Debug, Clone)]
pub struct Config {
    /// Port of the public HTTP facade
    /// Env: SERVER_PORT (default: 8080)
    pub http_port: u16,

    /// Port of the remote procedure listener
    /// Env: GRPC_PORT (default: 50051)
    pub rpc_port: u16,

    /// Database file path
    /// Env: DATABASE_PATH (default: "multiplayer.db")
    pub database_path: String,

    /// Lifetime of every cache entry
    /// Env: CACHE_TTL_SECS (default: 600)
    pub cache_ttl: Duration,

    /// How often expired cache entries are swept
    /// Env: CACHE_SWEEP_SECS (default: 60)
    pub cache_sweep_interval: Duration,

    /// Request body size limit in bytes
    /// Env: REQUEST_BODY_LIMIT (default: 65536)
    pub request_body_limit: usize,

    /// Request timeout in seconds
    /// Env: REQUEST_TIMEOUT_SECS (default: 30)
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let _ = dotenv();
        let defaults = Self::default();
        Self {
            http_port: env_or_default("SERVER_PORT", defaults.http_port),
            rpc_port: env_or_default("GRPC_PORT", defaults.rpc_port),
            database_path: env_or_default_string("DATABASE_PATH", &defaults.database_path),
            cache_ttl: env_or_default_secs("CACHE_TTL_SECS", defaults.cache_ttl),
            cache_sweep_interval: env_or_default_secs(
                "CACHE_SWEEP_SECS",
                defaults.cache_sweep_interval,
            ),
            request_body_limit: env_or_default("REQUEST_BODY_LIMIT", defaults.request_body_limit),
            request_timeout: env_or_default_secs("REQUEST_TIMEOUT_SECS", defaults.request_timeout),
        }
    }

    pub fn transport_limits(&self) -> TransportLimits {
        TransportLimits {
            request_body_limit: self.request_body_limit,
            request_timeout: self.request_timeout,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let limits = TransportLimits::default();
        Self {
            http_port: 8080,
            rpc_port: 50051,
            database_path: "multiplayer.db".to_string(),
            cache_ttl: crate::DEFAULT_CACHE_TTL,
            cache_sweep_interval: Duration::from_secs(60),
            request_body_limit: limits.request_body_limit,
            request_timeout: limits.request_timeout,
        }
    }
}

/// Parse environment variable or return default value
fn env_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    var(key)
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or(default)
}

/// Parse a duration in whole seconds; zero falls back to the default
fn env_or_default_secs(key: &str, default: Duration) -> Duration {
    non_zero_secs(key, env_or_default(key, default.as_secs()), default)
}

fn non_zero_secs(key: &str, secs: u64, default: Duration) -> Duration {
    if secs == 0 {
        tracing::warn!("{} must be positive, using {}s", key, default.as_secs());
        return default;
    }
    Duration::from_secs(secs)
}

/// Parse environment variable string or return default value
fn env_or_default_string(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.rpc_port, 50051);
        assert_eq!(config.database_path, "multiplayer.db");
        assert_eq!(config.cache_ttl, Duration::from_secs(600));
        assert_eq!(config.cache_sweep_interval, Duration::from_secs(60));
        assert_eq!(config.request_body_limit, 64 * 1024);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_unset_value_falls_back() {
        assert_eq!(env_or_default("MULTIPLAYER_TEST_UNSET_PORT", 7u16), 7);
    }

    #[test]
    fn test_zero_duration_falls_back() {
        let default = Duration::from_secs(60);
        assert_eq!(non_zero_secs("CACHE_SWEEP_SECS", 0, default), default);
        assert_eq!(
            non_zero_secs("CACHE_SWEEP_SECS", 5, default),
            Duration::from_secs(5)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_sweep_interval_drives_a_timer() {
        let interval = non_zero_secs("CACHE_SWEEP_SECS", 0, Config::default().cache_sweep_interval);
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        ticker.tick().await;
    }

    #[test]
    fn test_transport_limits_follow_config() {
        let config = Config {
            request_body_limit: 10,
            request_timeout: Duration::from_secs(2),
            ..Config::default()
        };
        let limits = config.transport_limits();
        assert_eq!(limits.request_body_limit, 10);
        assert_eq!(limits.request_timeout, Duration::from_secs(2));
    }
}
