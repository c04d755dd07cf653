use super::{ChannelStore, NotificationStore, StoreError};
use crate::entities::channel::{
    Channel, ChannelInsert, DeleteChannelByChannelId, GetChannelByChannelId, InsertChannel,
    ListChannels,
};
use crate::entities::notification::{
    AppendNotification, CountNotifications, ListNotifications, Notification, NotificationInsert,
};
use crate::framework::DatabaseProcessor;
use async_trait::async_trait;
use kanau::processor::Processor;

#[async_trait]
impl ChannelStore for DatabaseProcessor {
    async fn insert(&self, channel: ChannelInsert) -> Result<Option<Channel>, StoreError> {
        Ok(self.process(InsertChannel { channel }).await?)
    }

    async fn get(&self, channel_id: &str) -> Result<Option<Channel>, StoreError> {
        Ok(self
            .process(GetChannelByChannelId {
                channel_id: channel_id.to_owned(),
            })
            .await?)
    }

    async fn list(&self) -> Result<Vec<Channel>, StoreError> {
        Ok(self.process(ListChannels).await?)
    }

    async fn delete(&self, channel_id: &str) -> Result<Option<Channel>, StoreError> {
        Ok(self
            .process(DeleteChannelByChannelId {
                channel_id: channel_id.to_owned(),
            })
            .await?)
    }
}

#[async_trait]
impl NotificationStore for DatabaseProcessor {
    async fn append(&self, notification: NotificationInsert) -> Result<Notification, StoreError> {
        Ok(self.process(AppendNotification { notification }).await?)
    }

    async fn list(
        &self,
        limit: i64,
        offset: i64,
        channel_id: Option<String>,
    ) -> Result<Vec<Notification>, StoreError> {
        Ok(self
            .process(ListNotifications {
                limit,
                offset,
                channel_id,
            })
            .await?)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.process(CountNotifications).await?)
    }
}
