//! Application state shared across all request handlers.

use dirsync_core::config::SharedConfig;
use dirsync_core::intake::NotificationIntake;
use dirsync_core::lifecycle::LifecycleCoordinator;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Reloadable configuration sections (updated via SIGHUP).
    pub config: SharedConfig,
    /// Starts and stops provider watch channels.
    pub coordinator: LifecycleCoordinator,
    /// Records inbound push notifications.
    pub intake: NotificationIntake,
}

impl AppState {
    pub fn new(
        config: SharedConfig,
        coordinator: LifecycleCoordinator,
        intake: NotificationIntake,
    ) -> Self {
        Self {
            config,
            coordinator,
            intake,
        }
    }
}
