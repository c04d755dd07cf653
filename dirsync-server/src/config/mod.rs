//! Configuration module for dirsync-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables. Also handles admin secret hashing.

pub mod file;

use crate::config::file::{DirectoryConfig as FileDirectoryConfig, FileConfig};
use dirsync_core::config::{AdminConfig, DirectoryConfig, ServerConfig, SharedConfig};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Environment variable consulted when the file carries no access token.
pub const ACCESS_TOKEN_ENV: &str = "DIRSYNC_ACCESS_TOKEN";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("password hashing error: {0}")]
    HashError(String),

    #[error("no directory access token in config file or {ACCESS_TOKEN_ENV}")]
    MissingAccessToken,

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Loaded configuration result containing all parts.
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub directory: DirectoryConfig,
}

impl LoadedConfig {
    /// Split off the reloadable sections behind their locks.
    pub fn into_shared(self) -> (SharedConfig, DirectoryConfig) {
        (SharedConfig::new(self.server, self.admin), self.directory)
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Hash the admin secret if it's plaintext (and rewrite the file)
    /// 5. Build the loaded configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        let directory = build_directory_config(
            &file_config.directory,
            std::env::var(ACCESS_TOKEN_ENV).ok(),
        )?;

        let secret_hash = if file_config.is_admin_secret_hashed() {
            file_config.admin.secret.clone()
        } else {
            let hash = self.hash_secret(&file_config.admin.secret)?;
            file_config.admin.secret = hash.clone();
            self.rewrite_config(&file_config)?;
            tracing::info!("Admin secret hashed and config file updated");
            hash
        };

        let listen = self.listen_override.unwrap_or(file_config.server.listen);

        Ok(LoadedConfig {
            server: ServerConfig { listen },
            admin: AdminConfig::new(secret_hash),
            directory,
        })
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn hash_secret(&self, plaintext: &str) -> Result<String, ConfigError> {
        use argon2::{
            Argon2, PasswordHasher,
            password_hash::{SaltString, rand_core::OsRng},
        };

        if plaintext.is_empty() {
            return Err(ConfigError::ValidationError(
                "admin secret must not be empty".to_string(),
            ));
        }

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ConfigError::HashError(e.to_string()))
    }

    fn rewrite_config(&self, config: &FileConfig) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(config)?;

        // Write atomically: write to temp file, then rename
        let temp_path = self.config_path.with_extension("toml.tmp");
        std::fs::write(&temp_path, toml_string)?;
        std::fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}

/// Validate the directory section and resolve the access token.
///
/// The file's token wins over the environment's.
fn build_directory_config(
    file: &FileDirectoryConfig,
    env_token: Option<String>,
) -> Result<DirectoryConfig, ConfigError> {
    let mut api_root = Url::parse(&file.api_root)
        .map_err(|e| ConfigError::ValidationError(format!("invalid directory.api_root: {e}")))?;
    // `Url::join` drops the last segment unless the path ends in a slash.
    if !api_root.path().ends_with('/') {
        let path = format!("{}/", api_root.path());
        api_root.set_path(&path);
    }

    let callback_url = Url::parse(&file.callback_url).map_err(|e| {
        ConfigError::ValidationError(format!("invalid directory.callback_url: {e}"))
    })?;
    if callback_url.scheme() != "https" {
        return Err(ConfigError::ValidationError(
            "directory.callback_url must use https".to_string(),
        ));
    }

    if file.customer.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "directory.customer must not be empty".to_string(),
        ));
    }

    if file.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "directory.request_timeout_secs must be positive".to_string(),
        ));
    }

    let access_token = file
        .access_token
        .clone()
        .or(env_token)
        .filter(|t| !t.trim().is_empty())
        .ok_or(ConfigError::MissingAccessToken)?;

    Ok(DirectoryConfig {
        api_root,
        customer: file.customer.clone(),
        callback_url,
        access_token,
        request_timeout: Duration::from_secs(file.request_timeout_secs),
        channel_ttl: file.channel_ttl_secs.map(Duration::from_secs),
    })
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CONFIG: &str = r#"
[server]
listen = "127.0.0.1:3000"

[admin]
secret = "operator-secret"

[directory]
api_root = "https://admin.googleapis.com"
callback_url = "https://sync.example.com/receive"
access_token = "ya29.file"
channel_ttl_secs = 86400
"#;

    fn directory_section() -> FileDirectoryConfig {
        toml::from_str::<FileConfig>(CONFIG).unwrap().directory
    }

    #[test]
    fn test_load_hashes_plaintext_secret_and_rewrites_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let loaded = ConfigLoader::new(file.path(), None).load().unwrap();
        assert!(loaded.admin.verify_secret("operator-secret"));
        assert_eq!(loaded.server.listen.port(), 3000);
        assert_eq!(loaded.directory.api_root.as_str(), "https://admin.googleapis.com/");
        assert_eq!(loaded.directory.channel_ttl, Some(Duration::from_secs(86400)));

        let rewritten: FileConfig =
            toml::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        assert!(rewritten.is_admin_secret_hashed());
        assert_eq!(rewritten.directory.access_token.as_deref(), Some("ya29.file"));

        // A second load keeps the existing hash.
        let reloaded = ConfigLoader::new(file.path(), None).reload().unwrap();
        assert_eq!(reloaded.admin.secret_hash, rewritten.admin.secret);
    }

    #[test]
    fn test_listen_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let addr: SocketAddr = "0.0.0.0:9999".parse().unwrap();
        let loaded = ConfigLoader::new(file.path(), Some(addr)).load().unwrap();
        assert_eq!(loaded.server.listen, addr);
    }

    #[test]
    fn test_access_token_resolution() {
        let mut section = directory_section();
        let config = build_directory_config(&section, Some("ya29.env".to_string())).unwrap();
        assert_eq!(config.access_token, "ya29.file");

        section.access_token = None;
        let config = build_directory_config(&section, Some("ya29.env".to_string())).unwrap();
        assert_eq!(config.access_token, "ya29.env");

        assert!(matches!(
            build_directory_config(&section, None),
            Err(ConfigError::MissingAccessToken)
        ));
    }

    #[test]
    fn test_callback_must_be_https() {
        let mut section = directory_section();
        section.callback_url = "http://sync.example.com/receive".to_string();
        assert!(matches!(
            build_directory_config(&section, None),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
