//! Application configuration loaded from environment variables.

use std::time::Duration;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`: PostgreSQL URL; the in-memory store is used when unset
/// - `CATALOG_SERVICE_URL`: catalog service base URL (default: `"http://localhost:8081"`)
/// - `ORDER_SERVICE_URL`: order service base URL (default: `"http://localhost:8082"`)
/// - `COLLABORATOR_TIMEOUT_MS`: deadline per collaborator call (default: `5000`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub catalog_service_url: String,
    pub order_service_url: String,
    pub collaborator_timeout_ms: u64,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.is_empty()),
            catalog_service_url: std::env::var("CATALOG_SERVICE_URL")
                .unwrap_or(defaults.catalog_service_url),
            order_service_url: std::env::var("ORDER_SERVICE_URL")
                .unwrap_or(defaults.order_service_url),
            collaborator_timeout_ms: std::env::var("COLLABORATOR_TIMEOUT_MS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.collaborator_timeout_ms),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            catalog_service_url: "http://localhost:8081".to_string(),
            order_service_url: "http://localhost:8082".to_string(),
            collaborator_timeout_ms: 5000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert!(config.database_url.is_none());
        assert_eq!(config.catalog_service_url, "http://localhost:8081");
        assert_eq!(config.order_service_url, "http://localhost:8082");
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_collaborator_timeout() {
        let config = Config {
            collaborator_timeout_ms: 250,
            ..Config::default()
        };
        assert_eq!(config.collaborator_timeout(), Duration::from_millis(250));
    }
}
