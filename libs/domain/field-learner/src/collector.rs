// [libs/domain/field-learner/src/collector.rs]
/*!
 * APARATO: FIELD LEARNER COLLECTOR (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: PUERTA DE MUESTREO + LOTE COMPARTIDO + DAEMON DE
 * VOLCADO PERIÓDICO (spec §4.J)
 */

use crate::batch::{FieldObservationBatch, DEFAULT_FLUSH_COUNT_THRESHOLD, DEFAULT_FLUSH_INTERVAL_SECONDS};
use crate::errors::FieldLearnerError;
use crate::sampler::{should_sample, DEFAULT_SAMPLE_RATE};
use crate::store::flush_batch;
use crate::type_inference::infer_field_type;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};
use waf_infra_config_store::prelude::ConfigStoreClient;

pub struct FieldLearnerCollector {
    store: Arc<dyn ConfigStoreClient>,
    batch: Mutex<FieldObservationBatch>,
    sample_rate: f64,
    flush_count_threshold: usize,
}

impl FieldLearnerCollector {
    pub fn new(store: Arc<dyn ConfigStoreClient>) -> Self {
        Self { store, batch: Mutex::new(FieldObservationBatch::new()), sample_rate: DEFAULT_SAMPLE_RATE, flush_count_threshold: DEFAULT_FLUSH_COUNT_THRESHOLD }
    }

    /// Observa los nombres de campo de una solicitud ya parseada, con
    /// probabilidad `sample_rate` (spec §4.J). No-op si el muestreo no
    /// selecciona esta solicitud.
    pub fn observe_request_fields(&self, vhost_id: &str, endpoint_id: &str, field_names: impl IntoIterator<Item = impl AsRef<str>>) {
        if !should_sample(self.sample_rate) {
            return;
        }

        let now = Utc::now();
        let mut guard = self.batch.lock().expect("field learner batch lock poisoned");
        for field_name in field_names {
            let field_name = field_name.as_ref();
            guard.record(vhost_id, endpoint_id, field_name, infer_field_type(field_name), now);
        }
    }

    /// Indica si el lote actual alcanzó el umbral de volcado por conteo.
    pub fn should_flush_now(&self) -> bool {
        self.batch.lock().expect("field learner batch lock poisoned").should_flush(self.flush_count_threshold)
    }

    /// Drena el lote actual y lo persiste en el almacén.
    pub async fn flush(&self) -> Result<usize, FieldLearnerError> {
        let drained = self.batch.lock().expect("field learner batch lock poisoned").drain();
        if drained.is_empty() {
            return Ok(0);
        }
        flush_batch(&self.store, drained).await
    }

    /// Daemon de fondo: vuelca por temporizador (spec §4.J, "(b) un
    /// temporizador periódico dispara cada 10 s por defecto"). El volcado
    /// por umbral de conteo se dispara inline desde `observe_request_fields`
    /// a través de `should_flush_now` por quien posea el ciclo de la solicitud.
    pub async fn spawn_flush_daemon(self: Arc<Self>) {
        let mut timer = tokio::time::interval(std::time::Duration::from_secs(DEFAULT_FLUSH_INTERVAL_SECONDS));
        loop {
            timer.tick().await;
            match self.flush().await {
                Ok(0) => {}
                Ok(count) => debug!("field learner flushed {} field observations", count),
                Err(fault) => warn!("field learner flush failed, observations retained for next tick: {}", fault),
            }
        }
    }
}

impl std::fmt::Debug for FieldLearnerCollector {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("FieldLearnerCollector").field("sample_rate", &self.sample_rate).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waf_infra_config_store::prelude::InMemoryConfigStore;

    #[tokio::test]
    async fn full_sample_rate_always_records_and_flush_persists() {
        let store: Arc<dyn ConfigStoreClient> = Arc::new(InMemoryConfigStore::new());
        let collector = FieldLearnerCollector { sample_rate: 1.0, ..FieldLearnerCollector::new(store) };
        collector.observe_request_fields("vh-1", "ep-1", ["email", "password"]);
        let flushed = collector.flush().await.unwrap();
        assert_eq!(flushed, 2);
    }

    #[tokio::test]
    async fn zero_sample_rate_never_records() {
        let store: Arc<dyn ConfigStoreClient> = Arc::new(InMemoryConfigStore::new());
        let collector = FieldLearnerCollector { sample_rate: 0.0, ..FieldLearnerCollector::new(store) };
        collector.observe_request_fields("vh-1", "ep-1", ["email"]);
        let flushed = collector.flush().await.unwrap();
        assert_eq!(flushed, 0);
    }

    #[tokio::test]
    async fn should_flush_now_reflects_count_threshold() {
        let store: Arc<dyn ConfigStoreClient> = Arc::new(InMemoryConfigStore::new());
        let collector = FieldLearnerCollector { sample_rate: 1.0, flush_count_threshold: 2, ..FieldLearnerCollector::new(store) };
        collector.observe_request_fields("vh-1", "ep-1", ["a"]);
        assert!(!collector.should_flush_now());
        collector.observe_request_fields("vh-1", "ep-1", ["b"]);
        assert!(collector.should_flush_now());
    }
}
