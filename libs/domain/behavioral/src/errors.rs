// [libs/domain/behavioral/src/errors.rs]
/*!
 * APARATO: BEHAVIORAL ENGINE ERROR CATALOG (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BehavioralError {
    /// El almacén de buckets no respondió; la detección queda inerte para
    /// este ciclo y el ingreso se descarta sin bloquear la solicitud.
    #[error("[L2_BEHAVIORAL_FAULT]: STORE_UNAVAILABLE -> {0}")]
    StoreUnavailable(String),

    /// Un documento de bucket leído del almacén no decodificó como `HourlyBucket`.
    #[error("[L2_BEHAVIORAL_FAULT]: MALFORMED_BUCKET -> {0}")]
    MalformedBucket(String),
}

impl From<waf_infra_config_store::prelude::StoreError> for BehavioralError {
    fn from(fault: waf_infra_config_store::prelude::StoreError) -> Self {
        BehavioralError::StoreUnavailable(fault.to_string())
    }
}
