// [libs/domain/field-learner/src/errors.rs]
/*!
 * APARATO: FIELD LEARNER ERROR CATALOG (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FieldLearnerError {
    #[error("[L2_FIELD_LEARNER_FAULT]: STORE_UNAVAILABLE -> {0}")]
    StoreUnavailable(String),

    #[error("[L2_FIELD_LEARNER_FAULT]: MALFORMED_RECORD -> {0}")]
    MalformedRecord(String),
}

impl From<waf_infra_config_store::prelude::StoreError> for FieldLearnerError {
    fn from(fault: waf_infra_config_store::prelude::StoreError) -> Self {
        FieldLearnerError::StoreUnavailable(fault.to_string())
    }
}
