// [libs/core/body-parser/src/json_flatten.rs]
/*!
 * APARATO: JSON PATH FLATTENER (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: CORE UTILITY (ESTRATO L2)
 * RESPONSABILIDAD: APLANADO DE DOCUMENTOS JSON ANIDADOS A RUTAS `a.b.0.c`
 */

use crate::flat_body::FlatBody;
use serde_json::Value;

pub fn flatten_json_into(body: &mut FlatBody, value: &Value) {
    flatten_at(body, None, value);
}

fn flatten_at(body: &mut FlatBody, path: Option<&str>, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                let child_path = join_path(path, key);
                flatten_at(body, Some(&child_path), nested);
            }
        }
        Value::Array(items) => {
            for (index, nested) in items.iter().enumerate() {
                let child_path = join_path(path, &index.to_string());
                flatten_at(body, Some(&child_path), nested);
            }
        }
        Value::String(text) => {
            body.push(path.unwrap_or_default(), text.clone());
        }
        Value::Number(number) => {
            body.push(path.unwrap_or_default(), number.to_string());
        }
        Value::Bool(flag) => {
            body.push(path.unwrap_or_default(), flag.to_string());
        }
        Value::Null => {
            // Un valor nulo explícito no produce ningún par nombre -> valor:
            // no hay cadena que escanear ni aprender.
        }
    }
}

fn join_path(parent: Option<&str>, segment: &str) -> String {
    match parent {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}.{segment}"),
        _ => segment.to_string(),
    }
}
