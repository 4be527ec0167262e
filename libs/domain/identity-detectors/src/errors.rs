// [libs/domain/identity-detectors/src/errors.rs]
/*!
 * APARATO: IDENTITY DETECTOR ERROR CATALOG (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityDetectorError {
    /// Un proveedor individual (reputación externa, webhook, almacén)
    /// falló o no respondió a tiempo. Contribuye exactamente 0 a la
    /// puntuación; nunca bloquea por sí mismo (spec §7).
    #[error("[L2_IDENTITY_FAULT]: PROVIDER_UNAVAILABLE -> {0}")]
    ProviderUnavailable(String),
}
