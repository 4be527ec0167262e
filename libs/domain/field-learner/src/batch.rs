// [libs/domain/field-learner/src/batch.rs]
/*!
 * APARATO: LOCAL OBSERVATION BATCH (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: MAPA ACOTADO CON DEDUPLICACIÓN POR CLAVE Y FUSIÓN DE
 * CONTEO (spec §4.J)
 *
 * La clave es (vhost_id, endpoint_id, field_name); cada ocurrencia
 * adicional del mismo campo solo incrementa el conteo y avanza
 * `last_seen`, nunca crea una segunda entrada.
 */

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use waf_domain_models::prelude::InferredFieldType;

pub const DEFAULT_FLUSH_COUNT_THRESHOLD: usize = 100;
pub const DEFAULT_FLUSH_INTERVAL_SECONDS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchKey {
    pub vhost_id: String,
    pub endpoint_id: String,
    pub field_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub inferred_type: InferredFieldType,
    pub count: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// Mapa local de observaciones pendientes de volcado. No es thread-safe
/// por diseño: cada worker cooperativo posee su propio lote (spec §5,
/// "la cola del webhook es per-worker"; el mismo principio aplica aquí).
#[derive(Default)]
pub struct FieldObservationBatch {
    entries: HashMap<BatchKey, BatchEntry>,
}

impl FieldObservationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registra una observación, fusionando con cualquier entrada
    /// existente para la misma clave.
    pub fn record(&mut self, vhost_id: &str, endpoint_id: &str, field_name: &str, inferred_type: InferredFieldType, observed_at: DateTime<Utc>) {
        let key = BatchKey { vhost_id: vhost_id.to_string(), endpoint_id: endpoint_id.to_string(), field_name: field_name.to_string() };
        self.entries
            .entry(key)
            .and_modify(|entry| {
                entry.count += 1;
                entry.last_seen = observed_at;
            })
            .or_insert(BatchEntry { inferred_type, count: 1, first_seen: observed_at, last_seen: observed_at });
    }

    pub fn should_flush(&self, count_threshold: usize) -> bool {
        self.entries.len() >= count_threshold
    }

    /// Vacía y retorna todas las entradas acumuladas, dejando el lote vacío.
    pub fn drain(&mut self) -> HashMap<BatchKey, BatchEntry> {
        std::mem::take(&mut self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_field_merges_into_a_single_entry_with_incremented_count() {
        let mut batch = FieldObservationBatch::new();
        let now = Utc::now();
        batch.record("vh-1", "ep-1", "email", InferredFieldType::Email, now);
        batch.record("vh-1", "ep-1", "email", InferredFieldType::Email, now + chrono::Duration::seconds(5));
        assert_eq!(batch.len(), 1);
        let drained = batch.drain();
        let entry = drained.values().next().unwrap();
        assert_eq!(entry.count, 2);
    }

    #[test]
    fn different_endpoints_produce_distinct_entries() {
        let mut batch = FieldObservationBatch::new();
        let now = Utc::now();
        batch.record("vh-1", "ep-1", "email", InferredFieldType::Email, now);
        batch.record("vh-1", "ep-2", "email", InferredFieldType::Email, now);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn should_flush_triggers_at_threshold() {
        let mut batch = FieldObservationBatch::new();
        let now = Utc::now();
        for index in 0..3 {
            batch.record("vh-1", "ep-1", &format!("field_{index}"), InferredFieldType::Generic, now);
        }
        assert!(batch.should_flush(3));
        assert!(!batch.should_flush(4));
    }

    #[test]
    fn drain_empties_the_batch() {
        let mut batch = FieldObservationBatch::new();
        batch.record("vh-1", "ep-1", "email", InferredFieldType::Email, Utc::now());
        batch.drain();
        assert!(batch.is_empty());
    }
}
