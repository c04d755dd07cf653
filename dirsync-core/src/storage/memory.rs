use super::{ChannelStore, NotificationStore, StoreError};
use crate::entities::channel::{Channel, ChannelInsert};
use crate::entities::notification::{Notification, NotificationInsert};
use async_trait::async_trait;
use std::collections::HashMap;
use time::OffsetDateTime;
use tokio::sync::Mutex;

/// Process-local store. State is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    channels: Mutex<ChannelTable>,
    notifications: Mutex<NotificationTable>,
}

#[derive(Debug, Default)]
struct ChannelTable {
    next_id: i64,
    by_channel_id: HashMap<String, Channel>,
}

#[derive(Debug, Default)]
struct NotificationTable {
    next_id: i64,
    rows: Vec<Notification>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChannelStore for MemoryStore {
    async fn insert(&self, channel: ChannelInsert) -> Result<Option<Channel>, StoreError> {
        let mut table = self.channels.lock().await;
        if table.by_channel_id.contains_key(&channel.channel_id) {
            return Ok(None);
        }
        table.next_id += 1;
        let stored = Channel {
            id: table.next_id,
            channel_id: channel.channel_id,
            resource_id: channel.resource_id,
            resource_uri: channel.resource_uri,
            event: channel.event,
            token: channel.token,
            expiration: channel.expiration,
            created_at: OffsetDateTime::now_utc(),
        };
        table
            .by_channel_id
            .insert(stored.channel_id.clone(), stored.clone());
        Ok(Some(stored))
    }

    async fn get(&self, channel_id: &str) -> Result<Option<Channel>, StoreError> {
        Ok(self.channels.lock().await.by_channel_id.get(channel_id).cloned())
    }

    async fn list(&self) -> Result<Vec<Channel>, StoreError> {
        let mut channels: Vec<Channel> = self
            .channels
            .lock()
            .await
            .by_channel_id
            .values()
            .cloned()
            .collect();
        channels.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(channels)
    }

    async fn delete(&self, channel_id: &str) -> Result<Option<Channel>, StoreError> {
        Ok(self.channels.lock().await.by_channel_id.remove(channel_id))
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn append(&self, notification: NotificationInsert) -> Result<Notification, StoreError> {
        let mut table = self.notifications.lock().await;
        table.next_id += 1;
        let stored = Notification {
            id: table.next_id,
            channel_id: notification.channel_id,
            state: notification.state,
            sequence_number: notification.sequence_number,
            subject_id: notification.subject_id,
            subject_email: notification.subject_email,
            received_at: notification.received_at,
        };
        table.rows.push(stored.clone());
        Ok(stored)
    }

    async fn list(
        &self,
        limit: i64,
        offset: i64,
        channel_id: Option<String>,
    ) -> Result<Vec<Notification>, StoreError> {
        let table = self.notifications.lock().await;
        let mut rows: Vec<Notification> = table
            .rows
            .iter()
            .filter(|n| channel_id.as_ref().is_none_or(|id| &n.channel_id == id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.received_at, b.id).cmp(&(a.received_at, a.id)));
        Ok(rows
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let table = self.notifications.lock().await;
        Ok(i64::try_from(table.rows.len()).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::WatchedEvent;
    use dirsync_sdk::objects::ResourceState;

    fn insert(channel_id: &str) -> ChannelInsert {
        ChannelInsert {
            channel_id: channel_id.to_string(),
            resource_id: format!("res-{channel_id}"),
            resource_uri: None,
            event: WatchedEvent::Delete,
            token: "token".to_string(),
            expiration: None,
        }
    }

    fn notification(channel_id: &str, sequence_number: i64) -> NotificationInsert {
        NotificationInsert {
            channel_id: channel_id.to_string(),
            state: ResourceState::from("delete"),
            sequence_number,
            subject_id: "u1".to_string(),
            subject_email: "a@x.com".to_string(),
            received_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn test_channel_insert_conflict_and_delete() {
        let store = MemoryStore::new();
        let first = ChannelStore::insert(&store, insert("c1")).await.unwrap();
        assert_eq!(first.map(|c| c.id), Some(1));
        assert!(ChannelStore::insert(&store, insert("c1")).await.unwrap().is_none());
        assert_eq!(ChannelStore::list(&store).await.unwrap().len(), 1);

        assert!(store.delete("c1").await.unwrap().is_some());
        assert!(store.delete("c1").await.unwrap().is_none());
        assert!(store.get("c1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_channels_listed_newest_first() {
        let store = MemoryStore::new();
        for id in ["a", "b", "c"] {
            ChannelStore::insert(&store, insert(id)).await.unwrap();
        }
        let ids: Vec<_> = ChannelStore::list(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.channel_id)
            .collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_notifications_accept_duplicates_and_page() {
        let store = MemoryStore::new();
        store.append(notification("c1", 1)).await.unwrap();
        store.append(notification("c1", 1)).await.unwrap();
        store.append(notification("c2", 7)).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 3);

        let c1 = NotificationStore::list(&store, 10, 0, Some("c1".to_string()))
            .await
            .unwrap();
        assert_eq!(c1.len(), 2);
        assert!(c1.iter().all(|n| n.sequence_number == 1));

        let page = NotificationStore::list(&store, 1, 1, None).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, 2);
    }
}
