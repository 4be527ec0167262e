// [apps/edge-gateway/src/handlers/simulate.rs]
/*!
 * APARATO: DEFENSE PROFILE SIMULATOR (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: APPLICATION ADAPTER (ESTRATO L4)
 * RESPONSABILIDAD: EJECUTAR UN PERFIL DE DEFENSA CONTRA UNA SOLICITUD
 * SINTÉTICA Y DEVOLVER EL RASTRO COMPLETO (spec §5, "Simulation endpoint")
 *
 * Reutiliza el mismo `execute_profile` del camino caliente; la única
 * diferencia es que el perfil y el contexto llegan en el cuerpo de la
 * petición en lugar de resolverse desde un vhost persistido, por lo que
 * esta ruta nunca puede bloquear tráfico real.
 */

use crate::repository::{self, EntityKind};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::net::IpAddr;
use waf_core_body_parser::FlatBody;
use waf_domain_defense_executor::prelude::{execute_profile, DefenseDeps, RequestContext};
use waf_domain_models::prelude::DefenseProfile;

#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    /// Id de un perfil ya persistido, o el propio perfil en línea cuando
    /// `profile` está presente. Exactamente uno de los dos debe llegar.
    #[serde(default)]
    pub defense_profile_id: Option<String>,
    #[serde(default)]
    pub profile: Option<DefenseProfile>,
    pub client_ip: IpAddr,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub fields: HashMap<String, Vec<String>>,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub timing_cookie: Option<String>,
    pub now_unix: i64,
}

fn default_method() -> String {
    "POST".to_string()
}

fn default_path() -> String {
    "/".to_string()
}

fn synthetic_body(fields: HashMap<String, Vec<String>>) -> FlatBody {
    let mut body = FlatBody::new();
    for (name, values) in fields {
        for value in values {
            body.push(name.clone(), value);
        }
    }
    body
}

/// Punto de entrada de `POST /api/v1/waf/simulate`. Nunca toca tráfico
/// real; el perfil resuelto se ejecuta una única vez, sin agregación
/// multi-perfil (spec §5).
pub async fn simulate(State(state): State<AppState>, Json(request): Json<SimulateRequest>) -> Response {
    let profile = match (request.profile, request.defense_profile_id) {
        (Some(inline), _) => inline,
        (None, Some(id)) => {
            match repository::load_one::<DefenseProfile>(&state.config_cache, &state.namespace, EntityKind::DefenseProfile, &id).await {
                Ok(Some(profile)) => profile,
                Ok(None) => return (StatusCode::NOT_FOUND, Json(json!({ "error": "profile_not_found", "id": id }))).into_response(),
                Err(fault) => {
                    return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "store_unavailable", "detail": fault.to_string() }))).into_response()
                }
            }
        }
        (None, None) => return (StatusCode::BAD_REQUEST, Json(json!({ "error": "missing_profile_or_id" }))).into_response(),
    };

    let context = RequestContext {
        defense_profile_id: profile.id.clone(),
        vhost_id: "_simulation".to_string(),
        endpoint_id: None,
        client_ip: request.client_ip,
        headers: request.headers,
        body: synthetic_body(request.fields),
        method: request.method,
        path: request.path,
        timing_cookie: request.timing_cookie,
        now_unix: request.now_unix,
        fill_duration_seconds: None,
    };

    let deps = DefenseDeps {
        store: state.config_store.clone(),
        signatures: state.signatures.clone(),
        geoip: state.geoip.clone(),
        ip_reputation: state.ip_reputation.clone(),
        behavioral: state.behavioral.clone(),
    };

    let execution = execute_profile(&profile, &context, &deps, &state.signatures).await;

    Json(json!({
        "defense_profile_id": execution.defense_profile_id,
        "score": execution.score,
        "flags": execution.flags,
        "action": format!("{:?}", execution.action),
        "timed_out": execution.timed_out,
        "trace": execution.trace.iter().map(|node| json!({
            "node_id": node.node_id,
            "score": node.outcome.score,
            "triggered": node.outcome.triggered,
            "flags": node.outcome.flags,
            "output": node.outcome.output,
        })).collect::<Vec<_>>(),
    }))
    .into_response()
}
