//! Configuration for wtyczka-daemon

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use wtyczka_types::UploadPolicy;

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Admin gate configuration
    #[serde(default)]
    pub admin: AdminConfig,

    /// Proof-of-payment upload limits
    #[serde(default)]
    pub uploads: UploadConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub listen_addr: SocketAddr,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            enable_cors: true,
            max_body_size: default_max_body_size(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage (for development/testing)
    #[default]
    Memory,

    /// PostgreSQL storage
    Postgres {
        /// Connection URL
        url: String,

        /// Maximum connections in pool
        #[serde(default = "default_pool_size")]
        max_connections: u32,

        /// Connection timeout in seconds
        #[serde(default = "default_connection_timeout")]
        connect_timeout_secs: u64,
    },
}

/// Admin shared-secret gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Shared passphrase. Unset or empty means nobody can pass.
    #[serde(default)]
    pub password: Option<String>,

    /// Name of the cookie carrying the admin flag
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Lifetime of the admin cookie in seconds
    #[serde(default = "default_cookie_max_age")]
    pub cookie_max_age_secs: u64,

    /// Mark the admin cookie `Secure`. Enable when served over TLS.
    #[serde(default)]
    pub cookie_secure: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            password: None,
            cookie_name: default_cookie_name(),
            cookie_max_age_secs: default_cookie_max_age(),
            cookie_secure: false,
        }
    }
}

impl AdminConfig {
    /// The configured secret, if usable
    pub fn secret(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

/// Upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Largest accepted proof file in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Accepted proof content types
    #[serde(default = "default_content_types")]
    pub allowed_content_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            allowed_content_types: default_content_types(),
        }
    }
}

impl UploadConfig {
    pub fn policy(&self) -> UploadPolicy {
        UploadPolicy {
            max_size_bytes: self.max_file_size,
            allowed_content_types: self.allowed_content_types.clone(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_max_body_size() -> usize {
    10 * 1024 * 1024
}

fn default_pool_size() -> u32 {
    10
}

fn default_connection_timeout() -> u64 {
    5
}

fn default_cookie_name() -> String {
    "admin_access".to_string()
}

fn default_cookie_max_age() -> u64 {
    60 * 60 * 24
}

fn default_max_file_size() -> u64 {
    UploadPolicy::default().max_size_bytes
}

fn default_content_types() -> Vec<String> {
    UploadPolicy::default().allowed_content_types
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // Add environment variables, e.g. WTYCZKA_ADMIN__PASSWORD
        builder = builder.add_source(
            config::Environment::with_prefix("WTYCZKA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DaemonConfig::default();
        assert_eq!(config.server.listen_addr.port(), 8080);
        assert!(matches!(config.storage, StorageConfig::Memory));
        assert!(config.admin.secret().is_none());
        assert_eq!(config.admin.cookie_name, "admin_access");
        assert!(!config.admin.cookie_secure);
    }

    #[test]
    fn test_empty_password_is_unconfigured() {
        let admin = AdminConfig {
            password: Some(String::new()),
            ..AdminConfig::default()
        };
        assert!(admin.secret().is_none());
    }

    #[test]
    fn test_upload_policy_from_config() {
        let uploads = UploadConfig {
            max_file_size: 1024,
            ..UploadConfig::default()
        };
        let policy = uploads.policy();
        assert_eq!(policy.max_size_bytes, 1024);
        assert!(policy
            .allowed_content_types
            .contains(&"application/pdf".to_string()));
    }

    #[test]
    fn test_storage_config_tagged() {
        let storage: StorageConfig = serde_json::from_value(serde_json::json!({
            "type": "postgres",
            "url": "postgres://localhost/wtyczka"
        }))
        .unwrap();

        match storage {
            StorageConfig::Postgres {
                max_connections,
                connect_timeout_secs,
                ..
            } => {
                assert_eq!(max_connections, 10);
                assert_eq!(connect_timeout_secs, 5);
            }
            StorageConfig::Memory => panic!("expected postgres"),
        }
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = DaemonConfig::load(None).unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(config.server.enable_cors);
    }
}
