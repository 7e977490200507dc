//! Redis Pub/Sub publisher.
//!
//! Publishes inbox events to Redis channels; the realtime gateway relays
//! them to connected browsers.

use async_trait::async_trait;
use inbox_core::{DomainError, ProviderResult, RealtimeEvent, RealtimePublisher};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use crate::pool::{RedisPool, RedisResult};
use crate::pubsub::PubSubChannel;

/// Event wrapper for Pub/Sub messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubSubEvent {
    /// Event type name (e.g., "MESSAGE_CREATE")
    pub event_type: String,
    pub data: serde_json::Value,
}

impl PubSubEvent {
    #[must_use]
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&RealtimeEvent> for PubSubEvent {
    fn from(event: &RealtimeEvent) -> Self {
        Self::new(event.kind.as_str(), event.data.clone())
    }
}

/// Redis Pub/Sub publisher
#[derive(Clone)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish an event to a channel
    ///
    /// Returns the number of subscribers that received the message
    pub async fn publish(&self, channel: &PubSubChannel, event: &PubSubEvent) -> RedisResult<i32> {
        let json = event.to_json()?;
        let mut conn = self.pool.get().await?;
        let receivers: i32 = conn.publish(channel.name(), &json).await?;

        tracing::debug!(
            channel = %channel,
            event_type = %event.event_type,
            receivers = receivers,
            "Published event"
        );

        Ok(receivers)
    }

    /// Publish the same event to several channels in one pipeline
    pub async fn publish_many(
        &self,
        channels: &[PubSubChannel],
        event: &PubSubEvent,
    ) -> RedisResult<()> {
        if channels.is_empty() {
            return Ok(());
        }

        let json = event.to_json()?;
        let mut conn = self.pool.get().await?;
        let mut pipe = redis::pipe();
        for channel in channels {
            pipe.publish(channel.name(), &json).ignore();
        }
        pipe.query_async::<()>(&mut conn).await?;

        tracing::debug!(
            channels = channels.len(),
            event_type = %event.event_type,
            "Published event to multiple channels"
        );

        Ok(())
    }
}

#[async_trait]
impl RealtimePublisher for Publisher {
    async fn publish(&self, event: &RealtimeEvent) -> ProviderResult<()> {
        let channels = [
            PubSubChannel::company(event.company_id),
            PubSubChannel::conversation(event.conversation_id),
        ];
        self.publish_many(&channels, &PubSubEvent::from(event))
            .await
            .map_err(DomainError::from)
    }
}
