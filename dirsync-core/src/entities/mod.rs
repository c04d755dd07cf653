pub mod channel;
pub mod notification;

use dirsync_sdk::objects::DirectoryEvent as SdkDirectoryEvent;

/// Watched directory event for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see
/// `dirsync_sdk::objects::DirectoryEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "snake_case", type_name = "directory_event")]
pub enum WatchedEvent {
    Add,
    Delete,
    MakeAdmin,
    Undelete,
    Update,
}

impl From<WatchedEvent> for SdkDirectoryEvent {
    fn from(value: WatchedEvent) -> Self {
        match value {
            WatchedEvent::Add => SdkDirectoryEvent::Add,
            WatchedEvent::Delete => SdkDirectoryEvent::Delete,
            WatchedEvent::MakeAdmin => SdkDirectoryEvent::MakeAdmin,
            WatchedEvent::Undelete => SdkDirectoryEvent::Undelete,
            WatchedEvent::Update => SdkDirectoryEvent::Update,
        }
    }
}

impl From<SdkDirectoryEvent> for WatchedEvent {
    fn from(value: SdkDirectoryEvent) -> Self {
        match value {
            SdkDirectoryEvent::Add => WatchedEvent::Add,
            SdkDirectoryEvent::Delete => WatchedEvent::Delete,
            SdkDirectoryEvent::MakeAdmin => WatchedEvent::MakeAdmin,
            SdkDirectoryEvent::Undelete => WatchedEvent::Undelete,
            SdkDirectoryEvent::Update => WatchedEvent::Update,
        }
    }
}
