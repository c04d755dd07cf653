//! Body of a directory push notification.

use serde::{Deserialize, Serialize};

/// The user resource as the provider delivers it in a push body.
///
/// Only the fields we record are modelled; everything else is ignored.
/// Both are optional here so that a missing field surfaces as a
/// [`PayloadError::MissingField`] instead of a generic JSON error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUserPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub primary_email: Option<String>,
}

/// A push body that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    pub id: String,
    pub primary_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("body is not a JSON object: {0}")]
    InvalidJson(String),
    #[error("missing or empty field `{0}`")]
    MissingField(&'static str),
}

impl DirectoryUserPayload {
    /// Parse a raw push body.
    pub fn parse(body: &[u8]) -> Result<Self, PayloadError> {
        serde_json::from_slice(body).map_err(|e| PayloadError::InvalidJson(e.to_string()))
    }

    /// Check that the required fields are present and non-empty.
    pub fn validate(self) -> Result<DirectoryUser, PayloadError> {
        let id = non_empty(self.id).ok_or(PayloadError::MissingField("id"))?;
        let primary_email =
            non_empty(self.primary_email).ok_or(PayloadError::MissingField("primaryEmail"))?;
        Ok(DirectoryUser { id, primary_email })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
