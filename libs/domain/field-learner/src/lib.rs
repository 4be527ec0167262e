// [libs/domain/field-learner/src/lib.rs]
/*!
 * =================================================================
 * APARATO: FIELD LEARNER CRATE ROOT (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: MUESTREO, LOTE Y PERSISTENCIA DE NOMBRES DE CAMPO
 * OBSERVADOS (spec §4.J)
 * =================================================================
 */

pub mod batch;
pub mod collector;
pub mod errors;
pub mod sampler;
pub mod store;
pub mod type_inference;

pub mod prelude {
    pub use crate::batch::{BatchEntry, BatchKey, FieldObservationBatch, DEFAULT_FLUSH_COUNT_THRESHOLD, DEFAULT_FLUSH_INTERVAL_SECONDS};
    pub use crate::collector::FieldLearnerCollector;
    pub use crate::errors::FieldLearnerError;
    pub use crate::sampler::{should_sample, DEFAULT_SAMPLE_RATE};
    pub use crate::store::{is_expired, is_known_field, RECORD_TTL};
    pub use crate::type_inference::infer_field_type;
}
