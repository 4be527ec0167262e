// [libs/domain/behavioral/src/lib.rs]
/*!
 * =================================================================
 * APARATO: BEHAVIORAL BASELINE ENGINE CRATE ROOT (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: AGREGACIÓN POR BUCKET HORARIO, LÍNEA BASE MÓVIL Y
 * DETECCIÓN POR Z-SCORE (spec §4.I)
 * =================================================================
 */

pub mod baseline;
pub mod detection;
pub mod engine;
pub mod errors;
pub mod ingest;
pub mod ip_tracker;

pub mod prelude {
    pub use crate::baseline::compute_baseline;
    pub use crate::detection::{detect_anomaly, AnomalyOutcome};
    pub use crate::engine::{BehavioralEngine, DEFAULT_BASELINE_REFRESH_TTL};
    pub use crate::errors::BehavioralError;
    pub use crate::ingest::{truncate_to_hour, FlowObservation};
    pub use crate::ip_tracker::UniqueIpTracker;
}
