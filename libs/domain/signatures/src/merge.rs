// [libs/domain/signatures/src/merge.rs]
/*!
 * APARATO: CONFIG PATCH MERGE OPERATOR (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: IMPLEMENTACIÓN DEL OPERADOR ⊕ (spec §4.E)
 *
 * `node_config ⊕ patch`: fusión por clave de nivel superior.
 * - Arreglos: se concatenan (parche al final) y se deduplican preservando
 *   el primer orden de aparición.
 * - Escalares/objetos: el valor del parche solo prevalece cuando la
 *   configuración del nodo carece de esa clave (o el valor es `null`).
 * - Claves presentes solo en el nodo, o solo en el parche, se conservan.
 */

use serde_json::{Map, Value};

pub fn merge_config(node_config: &Value, patch: &Value) -> Value {
    let (Some(base_map), Some(patch_map)) = (node_config.as_object(), patch.as_object()) else {
        // Si alguno de los dos no es un objeto, el parche no tiene clave
        // por la cual fusionarse; la configuración del nodo prevalece.
        return node_config.clone();
    };

    let mut merged: Map<String, Value> = base_map.clone();

    for (key, patch_value) in patch_map {
        match merged.get(key) {
            Some(existing_value) if existing_value.is_array() && patch_value.is_array() => {
                let mut concatenated = existing_value.as_array().cloned().unwrap_or_default();
                if let Some(extra_items) = patch_value.as_array() {
                    for item in extra_items {
                        if !concatenated.contains(item) {
                            concatenated.push(item.clone());
                        }
                    }
                }
                merged.insert(key.clone(), Value::Array(concatenated));
            }
            Some(existing_value) if !existing_value.is_null() => {
                // El valor del nodo ya está presente y no es nulo: se conserva.
            }
            _ => {
                merged.insert(key.clone(), patch_value.clone());
            }
        }
    }

    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_values_concatenate_with_deduplication() {
        let node_config = json!({ "blocked": ["spam", "casino"] });
        let patch = json!({ "blocked": ["casino", "viagra"] });
        let merged = merge_config(&node_config, &patch);
        assert_eq!(merged["blocked"], json!(["spam", "casino", "viagra"]));
    }

    #[test]
    fn scalar_from_patch_only_applies_when_node_value_absent() {
        let node_config = json!({ "block_score": 100 });
        let patch = json!({ "block_score": 50, "flag_score": 10 });
        let merged = merge_config(&node_config, &patch);
        assert_eq!(merged["block_score"], json!(100));
        assert_eq!(merged["flag_score"], json!(10));
    }

    #[test]
    fn null_node_value_is_treated_as_absent() {
        let node_config = json!({ "min_confidence": null });
        let patch = json!({ "min_confidence": 0.8 });
        let merged = merge_config(&node_config, &patch);
        assert_eq!(merged["min_confidence"], json!(0.8));
    }

    #[test]
    fn keys_unique_to_either_side_are_preserved() {
        let node_config = json!({ "only_node": 1 });
        let patch = json!({ "only_patch": 2 });
        let merged = merge_config(&node_config, &patch);
        assert_eq!(merged["only_node"], json!(1));
        assert_eq!(merged["only_patch"], json!(2));
    }
}
