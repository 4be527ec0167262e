// [apps/edge-gateway/src/routes.rs]
/*!
 * =================================================================
 * APARATO: EDGE ROUTING MATRIX (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: TOPOLOGÍA DE RUTAS DEL BORDE WAF (spec §4.N, §5)
 *
 * La ruta pública de evaluación vive como `fallback` del router raíz:
 * el borde debe evaluar cualquier combinación de host/método/ruta, y
 * nunca lleva el guardia administrativo. La superficie de
 * administración y simulación vive bajo `/api/v1/waf`, detrás de
 * `admin_guard`.
 * =================================================================
 */

use crate::handlers::{admin, evaluate, simulate};
use crate::middleware::{admin_guard, health_guard};
use crate::state::AppState;
use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

pub fn create_router(application_shared_state: AppState) -> Router {
    let network_security_shield = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let waf_admin_stratum = Router::new()
        .route("/export", get(admin::export))
        .route("/import", post(admin::import))
        .route("/validate", post(admin::validate))
        .route("/:kind", get(admin::list))
        .route("/:kind/:id", get(admin::get).put(admin::put).delete(admin::delete))
        .route("/:kind/:id/enabled", put(admin::set_enabled));

    let waf_management_stratum = Router::new()
        .nest("/admin", waf_admin_stratum)
        .route("/simulate", post(simulate::simulate))
        .layer(middleware::from_fn(admin_guard));

    let health_gated_stratum = Router::new()
        .nest("/api/v1/waf", waf_management_stratum)
        .fallback(evaluate::evaluate)
        .layer(middleware::from_fn_with_state(application_shared_state.clone(), health_guard));

    Router::new()
        .route("/health", get(|| async { "STATUS_OK" }))
        .merge(health_gated_stratum)
        .layer(network_security_shield)
        .with_state(application_shared_state)
}
