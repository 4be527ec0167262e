// [apps/edge-gateway/src/middleware.rs]
/*!
 * =================================================================
 * APARATO: PERIMETER GUARDS (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: SECURITY STRATUM (ESTRATO L4)
 * RESPONSABILIDAD: GUARDIANES DE SALUD Y AUTENTICACIÓN ADMINISTRATIVA
 *
 * El guardián de autenticación protege únicamente la superficie
 * administrativa/de simulación: la ruta pública de evaluación nunca
 * lleva este guardia, porque el tráfico protegido no conoce la clave
 * de administración (spec §5, "Admin CRUD surface").
 * =================================================================
 */

use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

/// Guardia de Salud: Bloquea el acceso si el sistema está en mantenimiento.
pub async fn health_guard(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if let Err(reason) = state.is_operational() {
        warn!("⛔ [ACCESS_DENIED]: Sector under maintenance: {}", reason);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "STRATA_MAINTENANCE_ACTIVE", "reason": reason, "retry_after": 60 })),
        )
            .into_response();
    }
    next.run(req).await
}

/// Guardia de Administración: exige `Authorization: Bearer <ADMIN_API_KEY>`
/// coincidente con el valor fijado en el entorno del proceso.
pub async fn admin_guard(req: Request, next: Next) -> Result<Response, StatusCode> {
    let configured_key = std::env::var("ADMIN_API_KEY").unwrap_or_default();
    if configured_key.is_empty() {
        warn!("⛔ [ADMIN_GUARD]: ADMIN_API_KEY not configured, rejecting all administrative traffic.");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    let presented = req.headers().get(header::AUTHORIZATION).and_then(|value| value.to_str().ok());
    match presented {
        Some(header_value) if header_value.strip_prefix("Bearer ") == Some(configured_key.as_str()) => Ok(next.run(req).await),
        _ => {
            warn!("❌ [ADMIN_GUARD]: Missing or mismatched administrative bearer token.");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
