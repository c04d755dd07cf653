use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
/// User events the directory can be watched for.
#[serde(rename_all = "camelCase")]
pub enum DirectoryEvent {
    Add,
    #[default]
    Delete,
    MakeAdmin,
    Undelete,
    Update,
}

impl DirectoryEvent {
    /// The value the provider expects in the `event` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectoryEvent::Add => "add",
            DirectoryEvent::Delete => "delete",
            DirectoryEvent::MakeAdmin => "makeAdmin",
            DirectoryEvent::Undelete => "undelete",
            DirectoryEvent::Update => "update",
        }
    }
}

impl std::fmt::Display for DirectoryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown directory event: {0}")]
pub struct UnknownDirectoryEvent(pub String);

impl std::str::FromStr for DirectoryEvent {
    type Err = UnknownDirectoryEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(DirectoryEvent::Add),
            "delete" => Ok(DirectoryEvent::Delete),
            "makeAdmin" => Ok(DirectoryEvent::MakeAdmin),
            "undelete" => Ok(DirectoryEvent::Undelete),
            "update" => Ok(DirectoryEvent::Update),
            other => Err(UnknownDirectoryEvent(other.to_owned())),
        }
    }
}

/// Value of the `X-Goog-Resource-State` push header.
///
/// The provider documents a handful of states but may send others, so
/// anything unrecognised is kept verbatim in [`ResourceState::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// Handshake sent right after a watch is created.
    Sync,
    Exists,
    NotExists,
    Event(DirectoryEvent),
    Other(String),
}

impl ResourceState {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceState::Sync => "sync",
            ResourceState::Exists => "exists",
            ResourceState::NotExists => "not_exists",
            ResourceState::Event(event) => event.as_str(),
            ResourceState::Other(s) => s,
        }
    }
}

impl From<&str> for ResourceState {
    fn from(value: &str) -> Self {
        match value {
            "sync" => ResourceState::Sync,
            "exists" => ResourceState::Exists,
            "not_exists" => ResourceState::NotExists,
            other => match other.parse::<DirectoryEvent>() {
                Ok(event) => ResourceState::Event(event),
                Err(_) => ResourceState::Other(other.to_owned()),
            },
        }
    }
}

impl From<String> for ResourceState {
    fn from(value: String) -> Self {
        ResourceState::from(value.as_str())
    }
}

impl std::fmt::Display for ResourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ResourceState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResourceState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(ResourceState::from(s.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_names() {
        assert_eq!(DirectoryEvent::MakeAdmin.as_str(), "makeAdmin");
        assert_eq!(
            serde_json::to_string(&DirectoryEvent::MakeAdmin).unwrap(),
            "\"makeAdmin\""
        );
        assert_eq!("undelete".parse::<DirectoryEvent>(), Ok(DirectoryEvent::Undelete));
        assert!("remove".parse::<DirectoryEvent>().is_err());
        assert_eq!(DirectoryEvent::default(), DirectoryEvent::Delete);
    }

    #[test]
    fn test_resource_state_keeps_unknown_values() {
        assert_eq!(ResourceState::from("sync"), ResourceState::Sync);
        assert_eq!(
            ResourceState::from("delete"),
            ResourceState::Event(DirectoryEvent::Delete)
        );
        let other = ResourceState::from("rename");
        assert_eq!(other, ResourceState::Other("rename".to_string()));
        assert_eq!(other.as_str(), "rename");
    }
}
