// [libs/domain/field-learner/src/store.rs]
/*!
 * APARATO: FIELD OBSERVATION PERSISTENCE (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: VOLCADO AL ALMACÉN COMPARTIDO (spec §4.J)
 *
 * Para cada observación por lote se actualizan dos documentos: el
 * registro del endpoint concreto y el agregado del vhost (clave
 * `endpoint_id = "*"`, que acumula sobre todos sus endpoints vía
 * `endpoint_set`). El TTL de 30 días sobre `last_seen` es aplicado por
 * el lector (`is_expired`), no por el almacén: el contrato
 * `ConfigStoreClient` no modela expiración nativa (spec §4.A).
 */

use crate::batch::{BatchEntry, BatchKey};
use crate::errors::FieldLearnerError;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use waf_domain_models::prelude::LearningFieldObservation;
use waf_infra_config_store::prelude::ConfigStoreClient;

pub const AGGREGATE_ENDPOINT_SENTINEL: &str = "*";
pub const RECORD_TTL: Duration = Duration::days(30);

fn endpoint_key(vhost_id: &str, endpoint_id: &str) -> String {
    format!("waf:fieldlearner:endpoint:{vhost_id}:{endpoint_id}")
}

fn vhost_key(vhost_id: &str) -> String {
    format!("waf:fieldlearner:vhost:{vhost_id}")
}

/// Un registro se considera expirado cuando su último avistamiento
/// excede el TTL de 30 días (spec §4.J).
pub fn is_expired(observation: &LearningFieldObservation, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(observation.last_seen) > RECORD_TTL
}

async fn merge_into_document(
    store: &Arc<dyn ConfigStoreClient>,
    key: &str,
    field_name: &str,
    vhost_id: &str,
    endpoint_id: &str,
    entry: &BatchEntry,
) -> Result<(), FieldLearnerError> {
    let existing = store.hash_get(key, field_name).await?;
    let mut observation = match existing {
        Some(value) => serde_json::from_value::<LearningFieldObservation>(value)
            .map_err(|fault| FieldLearnerError::MalformedRecord(fault.to_string()))?,
        None => LearningFieldObservation {
            endpoint_id: endpoint_id.to_string(),
            vhost_id: vhost_id.to_string(),
            field_name: field_name.to_string(),
            inferred_type: entry.inferred_type,
            count: 0,
            first_seen: entry.first_seen,
            last_seen: entry.first_seen,
            endpoint_set: Default::default(),
        },
    };

    observation.count += entry.count;
    if entry.last_seen > observation.last_seen {
        observation.last_seen = entry.last_seen;
    }
    observation.endpoint_set.insert(endpoint_id.to_string());

    let encoded = serde_json::to_value(&observation).map_err(|fault| FieldLearnerError::MalformedRecord(fault.to_string()))?;
    store.hash_set(key, field_name, encoded).await?;
    Ok(())
}

/// Indica si `field_name` ya fue observado (y no expiró) para el
/// endpoint dado, consultando el registro agregado a nivel de vhost —
/// usado por el detector `field_anomalies` del ejecutor de perfiles de
/// defensa para marcar campos nunca antes vistos.
pub async fn is_known_field(
    store: &Arc<dyn ConfigStoreClient>,
    vhost_id: &str,
    field_name: &str,
    now: DateTime<Utc>,
) -> Result<bool, FieldLearnerError> {
    let Some(value) = store.hash_get(&vhost_key(vhost_id), field_name).await? else {
        return Ok(false);
    };
    let observation = serde_json::from_value::<LearningFieldObservation>(value)
        .map_err(|fault| FieldLearnerError::MalformedRecord(fault.to_string()))?;
    Ok(!is_expired(&observation, now))
}

/// Vuelca un lote drenado al almacén, actualizando tanto el registro del
/// endpoint como el agregado del vhost para cada campo observado.
pub async fn flush_batch(
    store: &Arc<dyn ConfigStoreClient>,
    batch: HashMap<BatchKey, BatchEntry>,
) -> Result<usize, FieldLearnerError> {
    let mut flushed = 0usize;
    for (key, entry) in batch {
        merge_into_document(store, &endpoint_key(&key.vhost_id, &key.endpoint_id), &key.field_name, &key.vhost_id, &key.endpoint_id, &entry)
            .await?;
        merge_into_document(store, &vhost_key(&key.vhost_id), &key.field_name, &key.vhost_id, AGGREGATE_ENDPOINT_SENTINEL, &entry).await?;
        flushed += 1;
    }
    Ok(flushed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use waf_domain_models::prelude::InferredFieldType;
    use waf_infra_config_store::prelude::InMemoryConfigStore;

    fn batch_with_one_entry() -> HashMap<BatchKey, BatchEntry> {
        let now = Utc::now();
        let mut map = HashMap::new();
        map.insert(
            BatchKey { vhost_id: "vh-1".into(), endpoint_id: "ep-1".into(), field_name: "email".into() },
            BatchEntry { inferred_type: InferredFieldType::Email, count: 3, first_seen: now, last_seen: now },
        );
        map
    }

    #[tokio::test]
    async fn flush_writes_both_endpoint_and_vhost_aggregate_records() {
        let store: Arc<dyn ConfigStoreClient> = Arc::new(InMemoryConfigStore::new());
        flush_batch(&store, batch_with_one_entry()).await.unwrap();

        let endpoint_doc = store.hash_get(&endpoint_key("vh-1", "ep-1"), "email").await.unwrap();
        assert!(endpoint_doc.is_some());
        let vhost_doc = store.hash_get(&vhost_key("vh-1"), "email").await.unwrap();
        assert!(vhost_doc.is_some());
    }

    #[tokio::test]
    async fn repeated_flushes_accumulate_count_rather_than_overwrite() {
        let store: Arc<dyn ConfigStoreClient> = Arc::new(InMemoryConfigStore::new());
        flush_batch(&store, batch_with_one_entry()).await.unwrap();
        flush_batch(&store, batch_with_one_entry()).await.unwrap();

        let value = store.hash_get(&endpoint_key("vh-1", "ep-1"), "email").await.unwrap().unwrap();
        let observation: LearningFieldObservation = serde_json::from_value(value).unwrap();
        assert_eq!(observation.count, 6);
    }

    #[test]
    fn record_older_than_ttl_is_expired() {
        let now = Utc::now();
        let observation = LearningFieldObservation {
            endpoint_id: "ep-1".into(),
            vhost_id: "vh-1".into(),
            field_name: "email".into(),
            inferred_type: InferredFieldType::Email,
            count: 1,
            first_seen: now - Duration::days(40),
            last_seen: now - Duration::days(31),
            endpoint_set: Default::default(),
        };
        assert!(is_expired(&observation, now));
    }

    #[tokio::test]
    async fn is_known_field_is_false_before_any_flush() {
        let store: Arc<dyn ConfigStoreClient> = Arc::new(InMemoryConfigStore::new());
        let known = is_known_field(&store, "vh-1", "email", Utc::now()).await.unwrap();
        assert!(!known);
    }

    #[tokio::test]
    async fn is_known_field_is_true_after_flush() {
        let store: Arc<dyn ConfigStoreClient> = Arc::new(InMemoryConfigStore::new());
        flush_batch(&store, batch_with_one_entry()).await.unwrap();
        let known = is_known_field(&store, "vh-1", "email", Utc::now()).await.unwrap();
        assert!(known);
    }

    #[test]
    fn record_within_ttl_is_not_expired() {
        let now = Utc::now();
        let observation = LearningFieldObservation {
            endpoint_id: "ep-1".into(),
            vhost_id: "vh-1".into(),
            field_name: "email".into(),
            inferred_type: InferredFieldType::Email,
            count: 1,
            first_seen: now - Duration::days(5),
            last_seen: now - Duration::days(1),
            endpoint_set: Default::default(),
        };
        assert!(!is_expired(&observation, now));
    }
}
