//! Configuration types for dirsync.
//!
//! These types represent the validated runtime configuration handed to each
//! component at startup. The actual config loading/parsing is handled by the
//! server crate.

mod admin;
mod directory;
mod server;

pub use admin::AdminConfig;
pub use directory::DirectoryConfig;
pub use server::ServerConfig;

use std::sync::Arc;
use tokio::sync::RwLock;

/// The reloadable configuration sections, each behind its own lock.
///
/// The directory section is fixed for the lifetime of the process because the
/// watch client is built from it at startup.
#[derive(Clone)]
pub struct SharedConfig {
    /// Server configuration (listen address, etc.).
    pub server: Arc<RwLock<ServerConfig>>,
    /// Admin configuration (authentication).
    pub admin: Arc<RwLock<AdminConfig>>,
}

impl SharedConfig {
    pub fn new(server: ServerConfig, admin: AdminConfig) -> Self {
        Self {
            server: Arc::new(RwLock::new(server)),
            admin: Arc::new(RwLock::new(admin)),
        }
    }
}
