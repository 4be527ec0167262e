// [libs/domain/signatures/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ATTACK SIGNATURE REGISTRY CRATE ROOT (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: FUSIÓN DE FIRMAS Y ESTADÍSTICAS DE COINCIDENCIA (spec §4.E)
 * =================================================================
 */

pub mod merge;
pub mod registry;
pub mod stats;

pub mod prelude {
    pub use crate::merge::merge_config;
    pub use crate::registry::SignatureRegistry;
    pub use crate::stats::SignatureStatsLedger;
}
