// [libs/domain/fingerprint/src/lib.rs]
/*!
 * =================================================================
 * APARATO: FINGERPRINT CRATE ROOT (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: EMPAREJAMIENTO DE PERFILES DE FINGERPRINT (spec §4.H)
 * =================================================================
 */

pub mod engine;
pub mod hash;
pub mod headers;
pub mod matching;

pub mod prelude {
    pub use crate::engine::{match_profiles, FingerprintMatchResult};
    pub use crate::hash::{compose_fingerprint_hash, default_recipe};
    pub use crate::headers::{header_value, RequestHeaders};
    pub use crate::matching::matching_rules_satisfied;
}
