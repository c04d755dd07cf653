//! TOML file configuration structures.
//!
//! These structs directly map to the `dirsync-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub directory: DirectoryConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Admin configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// The admin secret. If this is plaintext (doesn't start with `$argon2`),
    /// it will be hashed and the config file will be rewritten.
    pub secret: String,
}

/// Directory provider section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Root of the provider API.
    #[serde(default = "default_api_root")]
    pub api_root: String,
    /// Customer whose users are watched.
    #[serde(default = "default_customer")]
    pub customer: String,
    /// Public HTTPS URL of this server's `/receive` endpoint.
    pub callback_url: String,
    /// Bearer token for provider calls. Falls back to `DIRSYNC_ACCESS_TOKEN`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Requested channel lifetime; the provider default applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_ttl_secs: Option<u64>,
}

fn default_api_root() -> String {
    "https://admin.googleapis.com/".to_string()
}

fn default_customer() -> String {
    "my_customer".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl FileConfig {
    /// Check if the admin secret is already hashed (argon2 format).
    pub fn is_admin_secret_hashed(&self) -> bool {
        self.admin.secret.starts_with("$argon2")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[admin]
secret = "test-secret"

[directory]
callback_url = "https://sync.example.com/receive"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.directory.api_root, "https://admin.googleapis.com/");
        assert_eq!(config.directory.customer, "my_customer");
        assert_eq!(config.directory.request_timeout_secs, 30);
        assert!(config.directory.access_token.is_none());
        assert!(config.directory.channel_ttl_secs.is_none());
        assert!(!config.is_admin_secret_hashed());
    }

    #[test]
    fn test_hashed_secret_detection() {
        let config = FileConfig {
            server: ServerConfig {
                listen: default_listen_addr(),
            },
            admin: AdminConfig {
                secret: "$argon2id$v=19$m=19456,t=2,p=1$abc123".to_string(),
            },
            directory: DirectoryConfig {
                api_root: default_api_root(),
                customer: default_customer(),
                callback_url: "https://sync.example.com/receive".to_string(),
                access_token: Some("token".to_string()),
                request_timeout_secs: default_request_timeout_secs(),
                channel_ttl_secs: Some(3600),
            },
        };
        assert!(config.is_admin_secret_hashed());
    }
}
