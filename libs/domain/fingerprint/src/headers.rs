// [libs/domain/fingerprint/src/headers.rs]
/*!
 * APARATO: HEADER LOOKUP CONTRACT (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: ABSTRACCIÓN SOBRE LA FUENTE DE CABECERAS DE LA SOLICITUD
 *
 * El crate no depende de ningún framework HTTP; el llamador (edge-gateway)
 * aporta un mapa de cabeceras ya normalizado a minúsculas.
 */

use std::collections::HashMap;

pub type RequestHeaders = HashMap<String, String>;

pub fn header_value<'a>(headers: &'a RequestHeaders, header_name: &str) -> Option<&'a str> {
    headers.get(&header_name.to_ascii_lowercase()).map(String::as_str)
}
