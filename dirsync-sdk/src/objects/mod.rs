pub mod admin;
pub mod directory;
pub mod push;

pub use directory::{DirectoryEvent, ResourceState};
pub use push::{DirectoryUser, DirectoryUserPayload, PayloadError};
