// [libs/core/body-parser/src/lib.rs]
/*!
 * =================================================================
 * APARATO: BODY PARSER CRATE ROOT (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: CORE UTILITY (ESTRATO L2)
 * RESPONSABILIDAD: DECODIFICACIÓN SOBERANA DE CUERPOS HTTP
 *
 * VISION HIPER-HOLÍSTICA:
 * Tres gramáticas de entrada (`application/x-www-form-urlencoded`,
 * `multipart/form-data`, `application/json`) convergen en un único
 * mapa plano `FlatBody` (spec §4.B). Ningún tipo de contenido no
 * reconocido produce un bloqueo: se traduce en `UnsupportedContentType`,
 * que el evaluador interpreta como "omitir escaneo", jamás como ataque.
 * =================================================================
 */

pub mod errors;
pub mod flat_body;
pub mod json_flatten;
pub mod multipart;
pub mod urlencoded;

pub use errors::BodyParseError;
pub use flat_body::FlatBody;

/// Decodifica un cuerpo HTTP crudo según su `Content-Type` declarado.
///
/// El límite de tamaño se aplica **antes** de cualquier intento de
/// decodificación (spec §4.B): un cuerpo sobredimensionado nunca llega
/// a ejecutar un parser.
pub async fn parse_body(
    raw_body: &[u8],
    content_type: &str,
    size_limit_bytes: usize,
) -> Result<FlatBody, BodyParseError> {
    if raw_body.len() > size_limit_bytes {
        return Err(BodyParseError::BodyTooLarge {
            limit_bytes: size_limit_bytes,
            actual_bytes: raw_body.len(),
        });
    }

    let declared_media_type = content_type.split(';').next().unwrap_or_default().trim().to_lowercase();

    match declared_media_type.as_str() {
        "application/x-www-form-urlencoded" => Ok(urlencoded::parse_urlencoded(raw_body)),
        "multipart/form-data" => multipart::parse_multipart(raw_body, content_type).await,
        "application/json" => {
            let document: serde_json::Value = serde_json::from_slice(raw_body)
                .map_err(|fault| BodyParseError::ParseError(format!("JSON_DECODE_FAILURE: {fault}")))?;
            let mut body = FlatBody::new();
            json_flatten::flatten_json_into(&mut body, &document);
            Ok(body)
        }
        other => Err(BodyParseError::UnsupportedContentType(other.to_string())),
    }
}
