// [libs/core/body-parser/src/errors.rs]
/*!
 * APARATO: BODY PARSER ERROR CATALOG (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: CORE UTILITY (ESTRATO L2)
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BodyParseError {
    /// El `Content-Type` declarado no tiene un decodificador soberano; el
    /// evaluador debe tratarlo como "omitir escaneo", nunca como bloqueo.
    #[error("[L2_BODY_FAULT]: UNSUPPORTED_CONTENT_TYPE -> {0}")]
    UnsupportedContentType(String),

    /// El cuerpo no pudo decodificarse según la gramática de su tipo
    /// declarado. No constituye, por sí mismo, motivo de bloqueo.
    #[error("[L2_BODY_FAULT]: PARSE_ERROR -> {0}")]
    ParseError(String),

    /// El cuerpo excede el límite de tamaño configurado; verificado
    /// antes de cualquier intento de decodificación.
    #[error("[L2_BODY_FAULT]: BODY_TOO_LARGE -> limit={limit_bytes} actual={actual_bytes}")]
    BodyTooLarge { limit_bytes: usize, actual_bytes: usize },
}
