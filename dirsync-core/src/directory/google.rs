//! Google Admin SDK Directory API implementation of [`DirectoryWatchClient`].
//!
//! - `POST admin/directory/v1/users/watch?customer=..&event=..` creates a channel
//! - `POST admin/directory_v1/channels/stop` tears one down
//!
//! Channel ids and tokens are generated here; the provider echoes them back.

use super::{ChannelDescriptor, DirectoryWatchClient, ProviderError};
use crate::config::DirectoryConfig;
use async_trait::async_trait;
use dirsync_sdk::objects::DirectoryEvent;
use rand::{Rng, distr::Alphanumeric};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use url::Url;

const TOKEN_LEN: usize = 32;

pub struct GoogleDirectoryClient {
    config: DirectoryConfig,
    http_client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct WatchChannelRequest<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    address: &'a str,
    token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<WatchParams>,
}

#[derive(Debug, Serialize)]
struct WatchParams {
    /// Seconds, as a string.
    ttl: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WatchChannelResponse {
    id: String,
    resource_id: String,
    #[serde(default)]
    resource_uri: Option<String>,
    #[serde(default)]
    expiration: Option<EpochMillis>,
}

/// int64 fields arrive as JSON strings, but accept plain numbers too.
///
/// Anything else lands in `Other` so that a bad expiration never fails the
/// whole response.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EpochMillis {
    Text(String),
    Number(i64),
    Other(serde_json::Value),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StopChannelRequest<'a> {
    id: &'a str,
    resource_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    message: String,
}

impl GoogleDirectoryClient {
    const WATCH_PATH: &str = "admin/directory/v1/users/watch";
    const STOP_PATH: &str = "admin/directory_v1/channels/stop";

    /// Create a new client. The request timeout from `config` applies to every call.
    pub fn new(config: DirectoryConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            config,
            http_client,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.config
            .api_root
            .join(path)
            .map_err(|e| ProviderError::new(None, format!("invalid provider url: {e}")))
    }

    /// Turn a non-2xx response into a [`ProviderError`], preferring the
    /// provider's own error message.
    async fn error_from_response(response: reqwest::Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<GoogleErrorBody>(&body) {
            Ok(parsed) => parsed.error.message,
            Err(_) if body.is_empty() => status.to_string(),
            Err(_) => body,
        };
        ProviderError::new(Some(status.as_u16()), message)
    }
}

fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

fn parse_expiration(value: EpochMillis) -> Result<OffsetDateTime, ProviderError> {
    let millis = match value {
        EpochMillis::Text(s) => s
            .parse::<i64>()
            .map_err(|e| ProviderError::new(None, format!("invalid channel expiration: {e}")))?,
        EpochMillis::Number(n) => n,
        EpochMillis::Other(v) => {
            return Err(ProviderError::new(
                None,
                format!("invalid channel expiration: {v}"),
            ));
        }
    };
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .map_err(|e| ProviderError::new(None, format!("invalid channel expiration: {e}")))
}

#[async_trait]
impl DirectoryWatchClient for GoogleDirectoryClient {
    async fn start_watch(&self, event: DirectoryEvent) -> Result<ChannelDescriptor, ProviderError> {
        let channel_id = uuid::Uuid::new_v4().to_string();
        let token = generate_token();
        let body = WatchChannelRequest {
            id: &channel_id,
            kind: "web_hook",
            address: self.config.callback_url.as_str(),
            token: &token,
            params: self.config.channel_ttl.map(|ttl| WatchParams {
                ttl: ttl.as_secs().to_string(),
            }),
        };

        debug!(channel_id = %channel_id, event = %event, "Requesting directory watch");

        let response = self
            .http_client
            .post(self.endpoint(Self::WATCH_PATH)?)
            .query(&[
                ("customer", self.config.customer.as_str()),
                ("event", event.as_str()),
            ])
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        // The channel exists remotely from here on. Only a body without
        // `resourceId` keeps us from recording it.
        let status = response.status();
        let body = response.text().await?;
        let created: WatchChannelResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::new(
                Some(status.as_u16()),
                format!("unreadable watch response for channel {channel_id}: {e}"),
            )
        })?;
        let expiration = match created.expiration.map(parse_expiration).transpose() {
            Ok(expiration) => expiration,
            Err(e) => {
                warn!(
                    channel_id = %created.id,
                    error = %e,
                    "Ignoring unreadable channel expiration"
                );
                None
            }
        };

        info!(
            channel_id = %created.id,
            resource_id = %created.resource_id,
            event = %event,
            "Directory watch created"
        );

        Ok(ChannelDescriptor {
            channel_id: created.id,
            resource_id: created.resource_id,
            resource_uri: created.resource_uri,
            event,
            token,
            expiration,
        })
    }

    async fn stop_watch(&self, channel_id: &str, resource_id: &str) -> Result<(), ProviderError> {
        let response = self
            .http_client
            .post(self.endpoint(Self::STOP_PATH)?)
            .bearer_auth(&self.config.access_token)
            .json(&StopChannelRequest {
                id: channel_id,
                resource_id,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        info!(channel_id = %channel_id, resource_id = %resource_id, "Directory watch stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::{Query, State},
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::post,
    };
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Recorded {
        requests: Arc<Mutex<Vec<(String, HashMap<String, String>, Option<String>, Value)>>>,
        fail_with: Option<StatusCode>,
        expiration: Option<Value>,
    }

    async fn watch(
        State(recorded): State<Recorded>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> impl IntoResponse {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        recorded
            .requests
            .lock()
            .unwrap()
            .push(("watch".to_string(), query, auth, body.clone()));
        if let Some(status) = recorded.fail_with {
            let error = json!({"error": {"code": status.as_u16(), "message": "Not Authorized to access this resource/api"}});
            return (status, Json(error)).into_response();
        }
        Json(json!({
            "kind": "api#channel",
            "id": body["id"],
            "resourceId": "r1",
            "resourceUri": "https://admin.googleapis.com/admin/directory/v1/users?customer=my_customer&event=delete",
            "token": body["token"],
            "expiration": recorded.expiration.clone().unwrap_or_else(|| json!("1767225600000"))
        }))
        .into_response()
    }

    async fn stop(State(recorded): State<Recorded>, Json(body): Json<Value>) -> impl IntoResponse {
        recorded.requests.lock().unwrap().push((
            "stop".to_string(),
            HashMap::new(),
            None,
            body,
        ));
        match recorded.fail_with {
            Some(status) => (status, "upstream exploded").into_response(),
            None => StatusCode::NO_CONTENT.into_response(),
        }
    }

    async fn spawn_provider(recorded: Recorded) -> SocketAddr {
        let app = Router::new()
            .route("/admin/directory/v1/users/watch", post(watch))
            .route("/admin/directory_v1/channels/stop", post(stop))
            .with_state(recorded);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn client(addr: SocketAddr, channel_ttl: Option<Duration>) -> GoogleDirectoryClient {
        GoogleDirectoryClient::new(DirectoryConfig {
            api_root: Url::parse(&format!("http://{addr}/")).unwrap(),
            customer: "my_customer".to_string(),
            callback_url: Url::parse("https://sync.example.com/receive").unwrap(),
            access_token: "ya29.test".to_string(),
            request_timeout: Duration::from_secs(5),
            channel_ttl,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_start_watch_sends_channel_and_parses_response() {
        let recorded = Recorded::default();
        let addr = spawn_provider(recorded.clone()).await;
        let client = client(addr, Some(Duration::from_secs(3600)));

        let descriptor = client.start_watch(DirectoryEvent::Delete).await.unwrap();

        assert_eq!(descriptor.resource_id, "r1");
        assert_eq!(descriptor.event, DirectoryEvent::Delete);
        assert_eq!(descriptor.token.len(), TOKEN_LEN);
        assert_eq!(
            descriptor.expiration.map(|t| t.unix_timestamp()),
            Some(1_767_225_600)
        );

        let requests = recorded.requests.lock().unwrap();
        let (kind, query, auth, body) = &requests[0];
        assert_eq!(kind, "watch");
        assert_eq!(query.get("customer").map(String::as_str), Some("my_customer"));
        assert_eq!(query.get("event").map(String::as_str), Some("delete"));
        assert_eq!(auth.as_deref(), Some("Bearer ya29.test"));
        assert_eq!(body["type"], "web_hook");
        assert_eq!(body["address"], "https://sync.example.com/receive");
        assert_eq!(body["id"], descriptor.channel_id.as_str());
        assert_eq!(body["token"], descriptor.token.as_str());
        assert_eq!(body["params"]["ttl"], "3600");
    }

    #[tokio::test]
    async fn test_start_watch_surfaces_provider_message() {
        let recorded = Recorded {
            fail_with: Some(StatusCode::FORBIDDEN),
            ..Default::default()
        };
        let addr = spawn_provider(recorded).await;

        let err = client(addr, None)
            .start_watch(DirectoryEvent::Delete)
            .await
            .unwrap_err();

        assert_eq!(err.status, Some(403));
        assert_eq!(err.message, "Not Authorized to access this resource/api");
    }

    #[tokio::test]
    async fn test_start_watch_keeps_channel_with_unreadable_expiration() {
        let recorded = Recorded {
            expiration: Some(json!({"when": "soon"})),
            ..Default::default()
        };
        let addr = spawn_provider(recorded).await;

        let descriptor = client(addr, None)
            .start_watch(DirectoryEvent::Add)
            .await
            .unwrap();

        assert_eq!(descriptor.resource_id, "r1");
        assert!(descriptor.expiration.is_none());
    }

    #[tokio::test]
    async fn test_stop_watch() {
        let recorded = Recorded::default();
        let addr = spawn_provider(recorded.clone()).await;

        client(addr, None).stop_watch("c1", "r1").await.unwrap();

        let requests = recorded.requests.lock().unwrap();
        assert_eq!(requests[0].3, json!({"id": "c1", "resourceId": "r1"}));
    }

    #[tokio::test]
    async fn test_stop_watch_failure_keeps_plain_body() {
        let recorded = Recorded {
            fail_with: Some(StatusCode::BAD_GATEWAY),
            ..Default::default()
        };
        let addr = spawn_provider(recorded).await;

        let err = client(addr, None).stop_watch("c1", "r1").await.unwrap_err();
        assert_eq!(err, ProviderError::new(Some(502), "upstream exploded"));
    }

    #[tokio::test]
    async fn test_unreachable_provider_has_no_status() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(addr, None)
            .start_watch(DirectoryEvent::Delete)
            .await
            .unwrap_err();
        assert_eq!(err.status, None);
    }

    #[test]
    fn test_parse_expiration() {
        let t = parse_expiration(EpochMillis::Text("1500".to_string())).unwrap();
        assert_eq!(t.unix_timestamp(), 1);
        assert_eq!(t.millisecond(), 500);
        assert!(parse_expiration(EpochMillis::Text("soon".to_string())).is_err());
        assert!(parse_expiration(EpochMillis::Other(json!(true))).is_err());
        assert_eq!(
            parse_expiration(EpochMillis::Number(0)).unwrap(),
            OffsetDateTime::UNIX_EPOCH
        );
    }
}
