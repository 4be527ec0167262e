// [libs/domain/models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DOMAIN MODELS CRATE ROOT (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN MODEL (ESTRATO L2)
 * RESPONSABILIDAD: FORMAS DE DATOS COMPARTIDAS ENTRE TODO EL DOMINIO
 *
 * VISION HIPER-HOLÍSTICA:
 * Ningún crate de dominio define de nuevo estas estructuras; todas las
 * entidades de configuración (Vhost, Endpoint, Defense Profile, Attack
 * Signature, Fingerprint Profile) y de estado aprendido (Flow buckets,
 * Learning Field Observation) conviven aquí como el único vocabulario
 * común (spec §3).
 * =================================================================
 */

pub mod attack_signature;
pub mod common;
pub mod defense_profile;
pub mod endpoint;
pub mod fingerprint_profile;
pub mod flow;
pub mod learning_observation;
pub mod vhost;

pub mod prelude {
    pub use crate::attack_signature::*;
    pub use crate::common::*;
    pub use crate::defense_profile::*;
    pub use crate::endpoint::*;
    pub use crate::fingerprint_profile::*;
    pub use crate::flow::*;
    pub use crate::learning_observation::*;
    pub use crate::vhost::*;
}
