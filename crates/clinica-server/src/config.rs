//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Filesystem path where generated invoice PDFs are stored.
    /// Env: `INVOICE_STORAGE_PATH`
    /// Default: `./invoices`
    pub invoice_storage_path: PathBuf,

    /// Upstream mail relay endpoint that actually delivers email.
    /// Env: `MAIL_RELAY_URL`
    /// Default: empty (email sending disabled, requests are rejected).
    pub mail_relay_url: Option<String>,

    /// Public base URL used when building invoice download links.
    /// Env: `PUBLIC_BASE_URL`
    /// Default: `http://localhost:8080`
    pub public_base_url: String,

    /// Admin API bearer token. Required to upload invoices when set.
    /// Env: `ADMIN_TOKEN`
    /// Default: empty (uploads open, for local development).
    pub admin_token: Option<String>,

    /// Maximum invoice size in bytes (10 MiB).
    /// Env: `MAX_INVOICE_SIZE`
    pub max_invoice_size: usize,

    /// Human-readable name for this server instance.
    /// Env: `INSTANCE_NAME`
    /// Default: `"Clinica"`
    pub instance_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], 8080).into(),
            invoice_storage_path: PathBuf::from("./invoices"),
            mail_relay_url: None,
            public_base_url: "http://localhost:8080".to_string(),
            admin_token: None,
            max_invoice_size: 10 * 1024 * 1024, // 10 MiB
            instance_name: "Clinica".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(
                    value = %addr,
                    "Invalid HTTP_ADDR, using default"
                );
            }
        }

        if let Ok(path) = std::env::var("INVOICE_STORAGE_PATH") {
            config.invoice_storage_path = PathBuf::from(path);
        }

        if let Ok(url) = std::env::var("MAIL_RELAY_URL") {
            if !url.is_empty() {
                config.mail_relay_url = Some(url);
            }
        }

        if let Ok(url) = std::env::var("PUBLIC_BASE_URL") {
            if !url.is_empty() {
                config.public_base_url = url.trim_end_matches('/').to_string();
            }
        }

        if let Ok(token) = std::env::var("ADMIN_TOKEN") {
            if !token.is_empty() {
                config.admin_token = Some(token);
            }
        }

        if let Ok(val) = std::env::var("MAX_INVOICE_SIZE") {
            if let Ok(n) = val.parse::<usize>() {
                config.max_invoice_size = n;
            }
        }

        if let Ok(name) = std::env::var("INSTANCE_NAME") {
            config.instance_name = name;
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.max_invoice_size, 10 * 1024 * 1024);
        assert!(config.mail_relay_url.is_none());
        assert!(config.admin_token.is_none());
    }

    #[test]
    fn test_base_url_has_no_trailing_slash() {
        let config = ServerConfig::default();
        assert!(!config.public_base_url.ends_with('/'));
    }
}
