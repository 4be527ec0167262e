// [libs/core/content-hash/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CONTENT HASHER (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: CORE UTILITY (ESTRATO L2)
 * RESPONSABILIDAD: HUELLA DETERMINISTA DE CAMPOS DE FORMULARIO SELECCIONADOS
 *
 * VISION HIPER-HOLÍSTICA:
 * El núcleo no tiene opinión sobre "salado"; la selección de campos es
 * la única perilla de ajuste (spec §4.C). Sin campos configurados, no
 * se computa huella alguna — el llamador recibe `None`.
 * =================================================================
 */

use sha2::{Digest, Sha256};
use waf_core_body_parser::FlatBody;

/// Computa la huella de contenido sobre el subconjunto `selected_fields`
/// del cuerpo ya decodificado.
///
/// Algoritmo (spec §4.C): ordenar los nombres de campo lexicográficamente;
/// concatenar `nombre = valores_unidos_por_NUL`; aplicar SHA-256 y
/// codificar en hexadecimal. Retorna `None` si `selected_fields` está vacío.
pub fn compute_content_hash(body: &FlatBody, selected_fields: &[String]) -> Option<String> {
    if selected_fields.is_empty() {
        return None;
    }

    let mut ordered_fields: Vec<&String> = selected_fields.iter().collect();
    ordered_fields.sort();
    ordered_fields.dedup();

    let mut hasher = Sha256::new();
    for field_name in ordered_fields {
        let joined_values = body
            .get(field_name)
            .map(|values| values.join("\0"))
            .unwrap_or_default();
        hasher.update(field_name.as_bytes());
        hasher.update(b"=");
        hasher.update(joined_values.as_bytes());
        hasher.update(b"\0");
    }

    Some(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_body() -> FlatBody {
        let mut body = FlatBody::new();
        body.push("email", "user@example.com");
        body.push("tags", "red");
        body.push("tags", "blue");
        body
    }

    #[test]
    fn no_fields_configured_yields_no_hash() {
        assert_eq!(compute_content_hash(&sample_body(), &[]), None);
    }

    #[test]
    fn field_order_in_selection_does_not_affect_hash() {
        let body = sample_body();
        let first = compute_content_hash(&body, &["tags".to_string(), "email".to_string()]);
        let second = compute_content_hash(&body, &["email".to_string(), "tags".to_string()]);
        assert_eq!(first, second);
    }

    #[test]
    fn changing_a_selected_value_changes_the_hash() {
        let mut body = sample_body();
        let before = compute_content_hash(&body, &["email".to_string()]);
        body.push("email", "second@example.com");
        let after = compute_content_hash(&body, &["email".to_string()]);
        assert_ne!(before, after);
    }

    #[test]
    fn missing_field_contributes_empty_value_not_an_error() {
        let body = sample_body();
        let hash = compute_content_hash(&body, &["never_present".to_string()]);
        assert!(hash.is_some());
    }
}
