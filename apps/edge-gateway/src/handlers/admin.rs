// [apps/edge-gateway/src/handlers/admin.rs]
/*!
 * APARATO: ADMINISTRATIVE CRUD SURFACE (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: APPLICATION ADAPTER (ESTRATO L4)
 * RESPONSABILIDAD: EXPONER LAS FAMILIAS DE ENTIDADES DE `repository.rs`
 * COMO UNA SUPERFICIE REST GENÉRICA (spec §5, "Admin CRUD surface")
 *
 * Las entidades se tratan como documentos JSON opacos en este estrato:
 * la validación de esquema ya ocurre en la (de)serialización de
 * `repository::load_one`/`save_one`. Solo el perfil de defensa recibe
 * tratamiento tipado, porque `validate_profile` exige la forma concreta
 * del grafo.
 */

use crate::repository::{self, EntityKind};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use waf_domain_defense_executor::prelude::validate_profile;
use waf_domain_models::prelude::DefenseProfile;

fn entity_kind_from_segment(segment: &str) -> Option<EntityKind> {
    match segment {
        "vhosts" => Some(EntityKind::Vhost),
        "endpoints" => Some(EntityKind::Endpoint),
        "defense-profiles" => Some(EntityKind::DefenseProfile),
        "attack-signatures" => Some(EntityKind::AttackSignature),
        "fingerprint-profiles" => Some(EntityKind::FingerprintProfile),
        _ => None,
    }
}

fn bad_kind(segment: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "unknown_entity_kind", "kind": segment }))).into_response()
}

fn document_id(document: &Value) -> Option<String> {
    document.get("id").and_then(Value::as_str).map(str::to_string)
}

pub async fn list(State(state): State<AppState>, Path(kind): Path<String>) -> Response {
    let Some(entity_kind) = entity_kind_from_segment(&kind) else {
        return bad_kind(&kind);
    };
    match repository::load_all::<Value>(&state.config_store, &state.config_cache, &state.namespace, entity_kind).await {
        Ok(entities) => Json(entities).into_response(),
        Err(fault) => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "store_unavailable", "detail": fault.to_string() }))).into_response(),
    }
}

pub async fn get(State(state): State<AppState>, Path((kind, id)): Path<(String, String)>) -> Response {
    let Some(entity_kind) = entity_kind_from_segment(&kind) else {
        return bad_kind(&kind);
    };
    match repository::load_one::<Value>(&state.config_cache, &state.namespace, entity_kind, &id).await {
        Ok(Some(document)) => Json(document).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, Json(json!({ "error": "not_found", "id": id }))).into_response(),
        Err(fault) => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "store_unavailable", "detail": fault.to_string() }))).into_response(),
    }
}

pub async fn put(State(state): State<AppState>, Path((kind, id)): Path<(String, String)>, Json(mut document): Json<Value>) -> Response {
    let Some(entity_kind) = entity_kind_from_segment(&kind) else {
        return bad_kind(&kind);
    };
    if entity_kind == EntityKind::DefenseProfile {
        match serde_json::from_value::<DefenseProfile>(document.clone()) {
            Ok(profile) => {
                if let Err(fault) = validate_profile(&profile) {
                    return (StatusCode::BAD_REQUEST, Json(json!({ "error": "profile_invalid", "detail": fault.to_string() }))).into_response();
                }
            }
            Err(fault) => return (StatusCode::BAD_REQUEST, Json(json!({ "error": "malformed_document", "detail": fault.to_string() }))).into_response(),
        }
    }
    if let Some(map) = document.as_object_mut() {
        map.insert("id".to_string(), Value::String(id.clone()));
    }
    match repository::save_one(&state.config_store, &state.config_cache, &state.namespace, entity_kind, &id, &document).await {
        Ok(()) => (StatusCode::OK, Json(document)).into_response(),
        Err(fault) => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "store_unavailable", "detail": fault.to_string() }))).into_response(),
    }
}

pub async fn delete(State(state): State<AppState>, Path((kind, id)): Path<(String, String)>) -> Response {
    let Some(entity_kind) = entity_kind_from_segment(&kind) else {
        return bad_kind(&kind);
    };
    match repository::delete_one(&state.config_store, &state.config_cache, &state.namespace, entity_kind, &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(fault) => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "store_unavailable", "detail": fault.to_string() }))).into_response(),
    }
}

/// Conmuta el campo `enabled` de un documento. No aplica a perfiles de
/// defensa, que no llevan ese campo (spec §3, Entity Defense Profile).
pub async fn set_enabled(State(state): State<AppState>, Path((kind, id)): Path<(String, String)>, Json(payload): Json<Value>) -> Response {
    let Some(entity_kind) = entity_kind_from_segment(&kind) else {
        return bad_kind(&kind);
    };
    if entity_kind == EntityKind::DefenseProfile {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "no_enabled_field", "kind": kind }))).into_response();
    }
    let Some(enabled) = payload.get("enabled").and_then(Value::as_bool) else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "missing_enabled_field" }))).into_response();
    };
    let mut document = match repository::load_one::<Value>(&state.config_cache, &state.namespace, entity_kind, &id).await {
        Ok(Some(document)) => document,
        Ok(None) => return (StatusCode::NOT_FOUND, Json(json!({ "error": "not_found", "id": id }))).into_response(),
        Err(fault) => return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "store_unavailable", "detail": fault.to_string() }))).into_response(),
    };
    if let Some(map) = document.as_object_mut() {
        map.insert("enabled".to_string(), Value::Bool(enabled));
    }
    match repository::save_one(&state.config_store, &state.config_cache, &state.namespace, entity_kind, &id, &document).await {
        Ok(()) => Json(document).into_response(),
        Err(fault) => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "store_unavailable", "detail": fault.to_string() }))).into_response(),
    }
}

pub async fn validate(Json(document): Json<Value>) -> Response {
    match serde_json::from_value::<DefenseProfile>(document) {
        Ok(profile) => match validate_profile(&profile) {
            Ok(()) => Json(json!({ "valid": true })).into_response(),
            Err(fault) => (StatusCode::BAD_REQUEST, Json(json!({ "valid": false, "detail": fault.to_string() }))).into_response(),
        },
        Err(fault) => (StatusCode::BAD_REQUEST, Json(json!({ "valid": false, "detail": fault.to_string() }))).into_response(),
    }
}

const EXPORTABLE_KINDS: [(&str, EntityKind); 5] = [
    ("vhosts", EntityKind::Vhost),
    ("endpoints", EntityKind::Endpoint),
    ("defense-profiles", EntityKind::DefenseProfile),
    ("attack-signatures", EntityKind::AttackSignature),
    ("fingerprint-profiles", EntityKind::FingerprintProfile),
];

pub async fn export(State(state): State<AppState>) -> Response {
    let mut bundle = serde_json::Map::new();
    for (segment, kind) in EXPORTABLE_KINDS {
        match repository::load_all::<Value>(&state.config_store, &state.config_cache, &state.namespace, kind).await {
            Ok(entities) => {
                bundle.insert(segment.to_string(), Value::Array(entities));
            }
            Err(fault) => return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "store_unavailable", "detail": fault.to_string() }))).into_response(),
        }
    }
    Json(Value::Object(bundle)).into_response()
}

pub async fn import(State(state): State<AppState>, Json(bundle): Json<Value>) -> Response {
    let Some(object) = bundle.as_object() else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "malformed_bundle" }))).into_response();
    };
    let mut imported = 0usize;
    for (segment, kind) in EXPORTABLE_KINDS {
        let Some(documents) = object.get(segment).and_then(Value::as_array) else {
            continue;
        };
        for document in documents {
            let Some(id) = document_id(document) else {
                continue;
            };
            if let Err(fault) = repository::save_one(&state.config_store, &state.config_cache, &state.namespace, kind, &id, document).await {
                return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "store_unavailable", "detail": fault.to_string() }))).into_response();
            }
            imported += 1;
        }
    }
    Json(json!({ "imported": imported })).into_response()
}
