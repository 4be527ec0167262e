// [libs/infra/config-store/src/memory.rs]
/*!
 * =================================================================
 * APARATO: IN-MEMORY STORE (V1.0 - PROVING GROUNDS)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: IMPLEMENTACIÓN EFÍMERA DEL CONTRATO DEL ALMACÉN
 *
 * Usada en pruebas y en operación autónoma (sin backend compartido);
 * respeta exactamente el mismo contrato que `LibsqlConfigStore`, de modo
 * que los detectores nunca conocen cuál de las dos está activa.
 * =================================================================
 */

use crate::client::{ConfigStoreClient, ScoredMember};
use crate::errors::StoreError;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Mutex;
use tokio::sync::broadcast;

const PUBSUB_CHANNEL_CAPACITY: usize = 1024;

#[derive(Default)]
pub struct InMemoryConfigStore {
    scalars: DashMap<String, Value>,
    sets: DashMap<String, Vec<String>>,
    hashes: DashMap<String, DashMap<String, Value>>,
    sorted_sets: DashMap<String, Vec<ScoredMember>>,
    lists: DashMap<String, Vec<Value>>,
    counters: DashMap<String, i64>,
    channels: Mutex<DashMap<String, broadcast::Sender<String>>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn channel_sender(&self, channel: &str) -> broadcast::Sender<String> {
        let channels_guard = self.channels.lock().expect("channel registry lock poisoned");
        if let Some(existing) = channels_guard.get(channel) {
            return existing.clone();
        }
        let (sender, _receiver) = broadcast::channel(PUBSUB_CHANNEL_CAPACITY);
        channels_guard.insert(channel.to_string(), sender.clone());
        sender
    }
}

#[async_trait]
impl ConfigStoreClient for InMemoryConfigStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.scalars.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.scalars.insert(key.to_string(), value);
        Ok(())
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut entry = self.sets.entry(key.to_string()).or_default();
        if !entry.iter().any(|existing| existing == member) {
            entry.push(member.to_string());
        }
        Ok(())
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<(), StoreError> {
        if let Some(mut entry) = self.sets.get_mut(key) {
            entry.retain(|existing| existing != member);
        }
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        Ok(self.sets.get(key).map(|entry| entry.clone()).unwrap_or_default())
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .hashes
            .get(key)
            .and_then(|fields| fields.get(field).map(|entry| entry.value().clone())))
    }

    async fn hash_set(&self, key: &str, field: &str, value: Value) -> Result<(), StoreError> {
        let fields = self.hashes.entry(key.to_string()).or_default();
        fields.insert(field.to_string(), value);
        Ok(())
    }

    async fn sorted_set_range(&self, key: &str) -> Result<Vec<ScoredMember>, StoreError> {
        let mut members = self.sorted_sets.get(key).map(|entry| entry.clone()).unwrap_or_default();
        members.sort_by(|left, right| left.score.total_cmp(&right.score));
        Ok(members)
    }

    async fn sorted_set_add(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError> {
        let mut entry = self.sorted_sets.entry(key.to_string()).or_default();
        entry.retain(|existing| existing.member != member);
        entry.push(ScoredMember { member: member.to_string(), score });
        Ok(())
    }

    async fn list_push(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut entry = self.lists.entry(key.to_string()).or_default();
        entry.push(value);
        Ok(())
    }

    async fn list_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Value>, StoreError> {
        let entry = self.lists.get(key).map(|entry| entry.clone()).unwrap_or_default();
        let length = entry.len() as i64;
        if length == 0 {
            return Ok(Vec::new());
        }
        let normalize = |index: i64| -> i64 {
            if index < 0 { (length + index).max(0) } else { index.min(length - 1) }
        };
        let first = normalize(start) as usize;
        let last = normalize(stop) as usize;
        if first > last {
            return Ok(Vec::new());
        }
        Ok(entry[first..=last].to_vec())
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        let mut counter = self.counters.entry(key.to_string()).or_insert(0);
        *counter += delta;
        Ok(*counter)
    }

    async fn publish(&self, channel: &str, message: &str) -> Result<(), StoreError> {
        let _ = self.channel_sender(channel).send(message.to_string());
        Ok(())
    }

    fn subscribe(&self, channel: &str) -> broadcast::Receiver<String> {
        self.channel_sender(channel).subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scalar_round_trip_is_identity() {
        let store = InMemoryConfigStore::new();
        store.set("waf:vhosts:default", serde_json::json!({"id": "default"})).await.unwrap();
        let read_back = store.get("waf:vhosts:default").await.unwrap();
        assert_eq!(read_back, Some(serde_json::json!({"id": "default"})));
    }

    #[tokio::test]
    async fn sorted_set_range_orders_by_score_ascending() {
        let store = InMemoryConfigStore::new();
        store.sorted_set_add("waf:endpoints:idx", "b", 20.0).await.unwrap();
        store.sorted_set_add("waf:endpoints:idx", "a", 10.0).await.unwrap();
        let members = store.sorted_set_range("waf:endpoints:idx").await.unwrap();
        assert_eq!(members, vec![
            ScoredMember { member: "a".into(), score: 10.0 },
            ScoredMember { member: "b".into(), score: 20.0 },
        ]);
    }

    #[tokio::test]
    async fn publish_reaches_active_subscriber() {
        let store = InMemoryConfigStore::new();
        let mut subscriber = store.subscribe("waf:invalidate:vhosts");
        store.publish("waf:invalidate:vhosts", "vhost:default").await.unwrap();
        let received = subscriber.recv().await.unwrap();
        assert_eq!(received, "vhost:default");
    }

    #[tokio::test]
    async fn incr_by_is_atomic_per_key() {
        let store = InMemoryConfigStore::new();
        assert_eq!(store.incr_by("waf:ratelimit:ip:1.2.3.4", 1).await.unwrap(), 1);
        assert_eq!(store.incr_by("waf:ratelimit:ip:1.2.3.4", 1).await.unwrap(), 2);
    }
}
