//! `PubSub` seam (section 1): per-room broadcast fan-out, consumed by the
//! room engine and the session gateway. Production implementation wraps
//! `tokio::sync::broadcast`, the same primitive the teacher's `Room` used
//! for its single global channel in `main.rs` -- here scoped per room.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 128;

pub trait PubSub: Send + Sync {
    /// Subscribes to a room's channel, creating it if this is the first subscriber.
    fn subscribe(&self, room_id: Uuid) -> broadcast::Receiver<String>;
    /// Publishes a JSON-encoded event to every current subscriber. No-op if none.
    fn publish(&self, room_id: Uuid, payload: String);
    /// Drops the channel once a room is settled; subsequent subscribes get a fresh one.
    fn close(&self, room_id: Uuid);
}

#[derive(Default)]
pub struct BroadcastPubSub {
    channels: RwLock<HashMap<Uuid, broadcast::Sender<String>>>,
}

impl BroadcastPubSub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn sender(&self, room_id: Uuid) -> broadcast::Sender<String> {
        if let Some(tx) = self.channels.read().unwrap().get(&room_id) {
            return tx.clone();
        }
        let mut channels = self.channels.write().unwrap();
        channels
            .entry(room_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

impl PubSub for BroadcastPubSub {
    fn subscribe(&self, room_id: Uuid) -> broadcast::Receiver<String> {
        self.sender(room_id).subscribe()
    }

    fn publish(&self, room_id: Uuid, payload: String) {
        let _ = self.sender(room_id).send(payload);
    }

    fn close(&self, room_id: Uuid) {
        self.channels.write().unwrap().remove(&room_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let pubsub = BroadcastPubSub::new();
        let room_id = Uuid::new_v4();
        let mut rx = pubsub.subscribe(room_id);

        pubsub.publish(room_id, "hello".to_string());
        assert_eq!(rx.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_does_not_panic() {
        let pubsub = BroadcastPubSub::new();
        pubsub.publish(Uuid::new_v4(), "noop".to_string());
    }

    #[tokio::test]
    async fn close_drops_the_channel() {
        let pubsub = BroadcastPubSub::new();
        let room_id = Uuid::new_v4();
        let _rx = pubsub.subscribe(room_id);
        pubsub.close(room_id);
        assert!(pubsub.channels.read().unwrap().get(&room_id).is_none());
    }
}
