use crate::entities::WatchedEvent;
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use time::OffsetDateTime;

/// A stored subscription channel.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Channel {
    pub id: i64,
    pub channel_id: String,
    pub resource_id: String,
    pub resource_uri: Option<String>,
    pub event: WatchedEvent,
    pub token: String,
    pub expiration: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl Channel {
    /// A channel without an expiration never expires.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expiration.is_some_and(|expiration| expiration <= now)
    }
}

/// Data for registering a new channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInsert {
    pub channel_id: String,
    pub resource_id: String,
    pub resource_uri: Option<String>,
    pub event: WatchedEvent,
    pub token: String,
    pub expiration: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
/// Insert a channel unless its `channel_id` is already stored.
///
/// Returns `None` on conflict.
pub struct InsertChannel {
    pub channel: ChannelInsert,
}

impl Processor<InsertChannel> for DatabaseProcessor {
    type Output = Option<Channel>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertChannel")]
    async fn process(&self, query: InsertChannel) -> Result<Option<Channel>, sqlx::Error> {
        let channel = query.channel;
        sqlx::query_as::<_, Channel>(
            r#"
            INSERT INTO channels (channel_id, resource_id, resource_uri, event, token, expiration)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (channel_id) DO NOTHING
            RETURNING id, channel_id, resource_id, resource_uri, event, token, expiration, created_at
            "#,
        )
        .bind(channel.channel_id)
        .bind(channel.resource_id)
        .bind(channel.resource_uri)
        .bind(channel.event)
        .bind(channel.token)
        .bind(channel.expiration)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct GetChannelByChannelId {
    pub channel_id: String,
}

impl Processor<GetChannelByChannelId> for DatabaseProcessor {
    type Output = Option<Channel>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetChannelByChannelId")]
    async fn process(&self, query: GetChannelByChannelId) -> Result<Option<Channel>, sqlx::Error> {
        sqlx::query_as::<_, Channel>(
            r#"
            SELECT id, channel_id, resource_id, resource_uri, event, token, expiration, created_at
            FROM channels
            WHERE channel_id = $1
            "#,
        )
        .bind(query.channel_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// All stored channels, newest first.
pub struct ListChannels;

impl Processor<ListChannels> for DatabaseProcessor {
    type Output = Vec<Channel>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListChannels")]
    async fn process(&self, _query: ListChannels) -> Result<Vec<Channel>, sqlx::Error> {
        sqlx::query_as::<_, Channel>(
            r#"
            SELECT id, channel_id, resource_id, resource_uri, event, token, expiration, created_at
            FROM channels
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Delete a channel, returning the removed row.
///
/// Returns `None` when nothing was deleted, so a second delete of the same id
/// is distinguishable from the first.
pub struct DeleteChannelByChannelId {
    pub channel_id: String,
}

impl Processor<DeleteChannelByChannelId> for DatabaseProcessor {
    type Output = Option<Channel>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:DeleteChannelByChannelId")]
    async fn process(
        &self,
        query: DeleteChannelByChannelId,
    ) -> Result<Option<Channel>, sqlx::Error> {
        sqlx::query_as::<_, Channel>(
            r#"
            DELETE FROM channels
            WHERE channel_id = $1
            RETURNING id, channel_id, resource_id, resource_uri, event, token, expiration, created_at
            "#,
        )
        .bind(query.channel_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn channel(expiration: Option<OffsetDateTime>) -> Channel {
        Channel {
            id: 1,
            channel_id: "c1".to_string(),
            resource_id: "r1".to_string(),
            resource_uri: None,
            event: WatchedEvent::Delete,
            token: "secret".to_string(),
            expiration,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_is_expired() {
        let now = OffsetDateTime::now_utc();
        assert!(!channel(None).is_expired(now));
        assert!(!channel(Some(now + Duration::hours(1))).is_expired(now));
        assert!(channel(Some(now - Duration::seconds(1))).is_expired(now));
        assert!(channel(Some(now)).is_expired(now));
    }
}
