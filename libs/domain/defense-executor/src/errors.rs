// [libs/domain/defense-executor/src/errors.rs]
/*!
 * APARATO: DEFENSE EXECUTOR ERROR CATALOG (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: TAXONOMÍA DE FALLOS DEL EJECUTOR (spec §7)
 *
 * Un detector individual nunca propaga un fallo de almacén al
 * ejecutor: lo absorbe como `score=0, triggered=false` más una bandera
 * de degradación (spec §7, `ProviderUnavailable`/`StoreUnavailable`).
 * El único fallo que el ejecutor produce es el rechazo de un grafo
 * malformado en tiempo de carga.
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("[L2_EXECUTOR_FAULT]: PROFILE_INVALID -> {0}")]
    ProfileInvalid(String),
}
