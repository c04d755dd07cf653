use crate::framework::DatabaseProcessor;
use dirsync_sdk::objects::ResourceState;
use kanau::processor::Processor;
use time::OffsetDateTime;

/// A received push notification.
///
/// `channel_id` is a lookup key only: the channel may have been retired or may
/// never have been known.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Notification {
    pub id: i64,
    pub channel_id: String,
    #[sqlx(try_from = "String")]
    pub state: ResourceState,
    pub sequence_number: i64,
    pub subject_id: String,
    pub subject_email: String,
    pub received_at: OffsetDateTime,
}

/// Data for appending a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationInsert {
    pub channel_id: String,
    pub state: ResourceState,
    pub sequence_number: i64,
    pub subject_id: String,
    pub subject_email: String,
    pub received_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
/// Append a notification. There is no uniqueness constraint; redeliveries are
/// stored as separate rows.
pub struct AppendNotification {
    pub notification: NotificationInsert,
}

impl Processor<AppendNotification> for DatabaseProcessor {
    type Output = Notification;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:AppendNotification")]
    async fn process(&self, query: AppendNotification) -> Result<Notification, sqlx::Error> {
        let n = query.notification;
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications
            (channel_id, state, sequence_number, subject_id, subject_email, received_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, channel_id, state, sequence_number, subject_id, subject_email, received_at
            "#,
        )
        .bind(n.channel_id)
        .bind(n.state.as_str())
        .bind(n.sequence_number)
        .bind(n.subject_id)
        .bind(n.subject_email)
        .bind(n.received_at)
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Page through notifications, newest first.
pub struct ListNotifications {
    pub limit: i64,
    pub offset: i64,
    pub channel_id: Option<String>,
}

impl Processor<ListNotifications> for DatabaseProcessor {
    type Output = Vec<Notification>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListNotifications")]
    async fn process(&self, query: ListNotifications) -> Result<Vec<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, channel_id, state, sequence_number, subject_id, subject_email, received_at
            FROM notifications
            WHERE ($1::text IS NULL OR channel_id = $1)
            ORDER BY received_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(query.channel_id)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct CountNotifications;

impl Processor<CountNotifications> for DatabaseProcessor {
    type Output = i64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CountNotifications")]
    async fn process(&self, _query: CountNotifications) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications")
            .fetch_one(&self.pool)
            .await
    }
}
