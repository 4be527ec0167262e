// [libs/infra/config-store/src/errors.rs]
/*!
 * =================================================================
 * APARATO: STORE ERROR CATALOG (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE PERSISTENCIA
 *
 * VISION HIPER-HOLÍSTICA:
 * El contrato de errores nunca distingue el almacén físico subyacente;
 * cualquier fallo de enlace, tiempo de espera o malformación se nivela
 * a 'StoreUnavailable' para que los estratos superiores degraden en
 * lugar de abortar la evaluación de la petición (ver spec §7).
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// El almacén no respondió dentro del presupuesto configurado, o el
    /// enlace físico/red está caído. Los consumidores deben sustituir
    /// valores por defecto o la última copia en cache; nunca bloquear
    /// la petición únicamente por este motivo.
    #[error("[L3_STORE_FAULT]: STORE_UNAVAILABLE -> {0}")]
    StoreUnavailable(String),

    /// Fallo en la configuración del entorno (URL o token vacíos/malformados).
    #[error("[L3_STORE_CONFIG_FAULT]: STRATEGIC_ENV_VOID -> {0}")]
    ConfigurationError(String),

    /// El valor leído no pudo decodificarse como el documento JSON esperado.
    #[error("[L3_STORE_MAPPING_FAULT]: DOCUMENT_DECODE_FAILURE -> {0}")]
    MalformedDocument(String),

    /// La clave solicitada no existe en el almacén.
    #[error("[L3_STORE_FAULT]: KEY_NOT_FOUND -> {0}")]
    KeyNotFound(String),
}

impl From<libsql::Error> for StoreError {
    fn from(underlying_fault: libsql::Error) -> Self {
        StoreError::StoreUnavailable(underlying_fault.to_string())
    }
}
