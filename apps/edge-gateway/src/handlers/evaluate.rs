// [apps/edge-gateway/src/handlers/evaluate.rs]
/*!
 * =================================================================
 * APARATO: PUBLIC REQUEST HANDLER (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: APPLICATION ADAPTER (ESTRATO L4)
 * RESPONSABILIDAD: CANALIZACIÓN COMPLETA host/body -> DECISIÓN WAF (spec §4.N)
 *
 * VISION HIPER-HOLÍSTICA:
 * Única puerta de entrada del tráfico protegido. Resuelve vhost/endpoint,
 * aplica el cortocircuito de lista blanca de IP, decodifica el cuerpo,
 * sintetiza el perfil `legacy` y lo ejecuta junto a los adjuntos propios
 * del vhost a través de un único mecanismo (`run_attached_profiles`),
 * fija las cabeceras de decisión y aplica la acción agregada según el
 * modo del vhost.
 * =================================================================
 */

use crate::legacy_profile::{build_legacy_profile, normalize_headers, LEGACY_PROFILE_ID};
use crate::repository::{self, EntityKind};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use ipnetwork::IpNetwork;
use serde_json::json;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use tracing::{instrument, warn};
use waf_core_body_parser::{parse_body, BodyParseError, FlatBody};
use waf_domain_defense_executor::prelude::{run_attached_profiles, AggregatedAction, DefenseDeps, RequestContext};
use waf_domain_models::prelude::{
    DefenseProfile, DefenseProfileAttachment, Endpoint, FingerprintProfile, Vhost,
    VhostDefenseAttachments, WafMode,
};
use waf_domain_resolver::prelude::{build_effective_config, resolve_endpoint, resolve_vhost, GlobalKeywordDefaults};
use waf_infra_webhook_notifier::prelude::{WebhookEvent, WebhookEventType};

/// Límite de tamaño de cuerpo aplicado en el camino caliente del
/// evaluador. No existe una constante equivalente en `waf-core-body-parser`
/// (el límite es una decisión del perímetro, no del parser); se fija aquí
/// en 1 MiB (ver `DESIGN.md`, Open Question "body size limit").
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Prioridad del adjunto sintético `legacy`, siempre ejecutado antes que
/// cualquier perfil de defensa adjunto manualmente al vhost.
const LEGACY_ATTACHMENT_PRIORITY: i32 = i32::MIN;

fn client_ip(headers: &HeaderMap, connect_info: Option<SocketAddr>) -> IpAddr {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .and_then(|candidate| candidate.parse::<IpAddr>().ok())
        .or_else(|| connect_info.map(|addr| addr.ip()))
        .unwrap_or(IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED))
}

/// Replica la semántica CIDR-o-IP-exacta del nodo DAG `ip_allowlist`
/// (`waf-domain-defense-executor::detectors::ip_allowlist`) para el
/// cortocircuito global a nivel de manejador (spec §4.N paso 3).
fn ip_allowlisted(ip: IpAddr, allowlist: &[String]) -> bool {
    allowlist.iter().any(|entry| {
        if let Ok(network) = entry.parse::<IpNetwork>() {
            return network.contains(ip);
        }
        entry.parse::<IpAddr>().map(|exact| exact == ip).unwrap_or(false)
    })
}

async fn load_fingerprint_profiles(state: &AppState) -> Vec<FingerprintProfile> {
    repository::load_all(&state.config_store, &state.config_cache, &state.namespace, EntityKind::FingerprintProfile)
        .await
        .unwrap_or_else(|fault| {
            warn!("⚠️ [EVALUATE]: Fingerprint profile load degraded: {}", fault);
            Vec::new()
        })
}

async fn load_timing_secrets(state: &AppState) -> Vec<String> {
    match state.config_cache.get(&repository::timing_secret_key(&state.namespace)).await {
        Ok((Some(value), _fresh)) => serde_json::from_value(value).unwrap_or_default(),
        _ => Vec::new(),
    }
}

async fn preload_custom_profiles(state: &AppState, attachments: &VhostDefenseAttachments) -> HashMap<String, DefenseProfile> {
    let mut loaded = HashMap::new();
    for attachment in &attachments.attachments {
        if loaded.contains_key(&attachment.defense_profile_id) {
            continue;
        }
        match repository::load_one::<DefenseProfile>(
            &state.config_cache,
            &state.namespace,
            EntityKind::DefenseProfile,
            &attachment.defense_profile_id,
        )
        .await
        {
            Ok(Some(profile)) => {
                loaded.insert(attachment.defense_profile_id.clone(), profile);
            }
            Ok(None) => warn!("⚠️ [EVALUATE]: Attached defense profile '{}' not found, skipping.", attachment.defense_profile_id),
            Err(fault) => warn!("⚠️ [EVALUATE]: Attached defense profile '{}' load degraded: {}", attachment.defense_profile_id, fault),
        }
    }
    loaded
}

fn scraped_content_hash(trace: &[waf_domain_defense_executor::prelude::ExecutedNode]) -> Option<String> {
    trace.iter().find_map(|node| {
        node.outcome.flags.iter().find_map(|flag| flag.strip_prefix("content_hash:").map(str::to_string))
    })
}

fn scraped_issued_cookie(run: &waf_domain_defense_executor::prelude::MultiProfileRun) -> Option<(String, String)> {
    run.executions.iter().find_map(|execution| {
        execution.trace.iter().find_map(|node| node.outcome.issued_cookie.clone())
    })
}

fn aggregated_counts_as_block(action: &AggregatedAction) -> bool {
    matches!(action, AggregatedAction::Block | AggregatedAction::Tarpit { .. } | AggregatedAction::Captcha)
}

/// Deriva el token semántico de `X-Block-Reason` a partir de los prefijos
/// de bandera conocidos, en lugar de exponer la lista cruda de banderas
/// (spec §8, escenario 1: `X-Block-Reason: blocked_keyword`).
fn block_reason(flags: &[String]) -> &'static str {
    let has_prefix = |prefix: &str| flags.iter().any(|flag| flag.starts_with(prefix));
    if has_prefix("kw:") {
        "blocked_keyword"
    } else if has_prefix("honeypot:") {
        "honeypot_triggered"
    } else if has_prefix("timing_token:") {
        "timing_violation"
    } else if has_prefix("fingerprint:") {
        "fingerprint_match"
    } else if has_prefix("rate_limiter:") {
        "rate_limited"
    } else if has_prefix("disposable_email:") {
        "disposable_email"
    } else if has_prefix("content_hash:") {
        "duplicate_content"
    } else if has_prefix("expected_fields:") {
        "field_validation"
    } else if has_prefix("field_anomalies:") {
        "field_anomaly"
    } else if has_prefix("header_consistency:") {
        "header_inconsistent"
    } else if has_prefix("behavioral:") {
        "behavioral_anomaly"
    } else if has_prefix("geoip:") {
        "geo_blocked"
    } else if has_prefix("ip_reputation:") {
        "ip_reputation"
    } else if has_prefix("many_urls:") || has_prefix("short_with_url") || has_prefix("xss_script:") || has_prefix("javascript_uri:") || has_prefix("inline_event_handler:") {
        "spam_pattern"
    } else {
        "policy_violation"
    }
}

fn hard_validation_failure(effective_required: &[String], effective_forbidden: &[String], body: &FlatBody) -> Option<String> {
    for field in effective_required {
        if body.get(field).is_none() {
            return Some(format!("missing_required_field:{field}"));
        }
    }
    for field in effective_forbidden {
        if body.get(field).is_some() {
            return Some(format!("forbidden_field_present:{field}"));
        }
    }
    None
}

/// Canalización pública completa: resolución, cortocircuitos, decodificación
/// de cuerpo, síntesis del perfil `legacy`, ejecución multi-perfil, y
/// aplicación de la acción agregada según el modo del vhost (spec §4.N).
#[instrument(skip(state, headers, raw_body), fields(method = %method, path = %uri.path()))]
pub async fn evaluate(
    State(state): State<AppState>,
    ConnectInfo(connect_info): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    raw_body: Bytes,
) -> Response {
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(':').next().unwrap_or(value).to_string())
        .unwrap_or_default();

    let vhosts = match repository::load_all::<Vhost>(&state.config_store, &state.config_cache, &state.namespace, EntityKind::Vhost).await {
        Ok(vhosts) => vhosts,
        Err(fault) => {
            warn!("⚠️ [EVALUATE]: Vhost index load degraded, evaluating with empty registry: {}", fault);
            Vec::new()
        }
    };

    let Some(resolved_vhost) = resolve_vhost(&host, &vhosts) else {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "no_vhost_configured" }))).into_response();
    };
    let vhost = resolved_vhost.vhost.clone();

    // Paso 2: `passthrough` omite toda evaluación, ninguna cabecera se toca.
    if vhost.mode == WafMode::Passthrough {
        return (StatusCode::OK, Json(json!({ "decision": "passthrough", "vhost": vhost.id }))).into_response();
    }

    let client_ip_addr = client_ip(&headers, Some(connect_info));

    // Paso 3: cortocircuito global de lista blanca de IP, previo a
    // cualquier análisis de cuerpo (spec §4.N paso 3).
    let global_defaults = state.global_defaults_snapshot();
    if ip_allowlisted(client_ip_addr, &global_defaults.ip_allowlist) {
        return (
            StatusCode::OK,
            [("x-waf-vhost", vhost.id.as_str()), ("x-waf-skipped", "ip_allowlist")],
            Json(json!({ "decision": "allow", "reason": "ip_allowlist" })),
        )
            .into_response();
    }

    let endpoints = repository::load_all::<Endpoint>(&state.config_store, &state.config_cache, &state.namespace, EntityKind::Endpoint)
        .await
        .unwrap_or_default();

    let content_type = headers.get(axum::http::header::CONTENT_TYPE).and_then(|value| value.to_str().ok()).unwrap_or("").to_string();
    let path = uri.path().to_string();
    let method_str = method.as_str().to_string();

    let resolved_endpoint = resolve_endpoint(&vhost.id, &method_str, &content_type, &path, &endpoints);

    // Paso 4: decodificación de cuerpo; solo `BodyTooLarge` detiene la
    // petición (límite técnico de recurso). `UnsupportedContentType` y
    // `ParseError` degradan a "omitir escaneo" por diseño del parser.
    let body = match parse_body(&raw_body, &content_type, MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(BodyParseError::BodyTooLarge { limit_bytes, actual_bytes }) => {
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({ "error": "body_too_large", "limit_bytes": limit_bytes, "actual_bytes": actual_bytes })),
            )
                .into_response();
        }
        Err(BodyParseError::UnsupportedContentType(_)) | Err(BodyParseError::ParseError(_)) => FlatBody::new(),
    };

    let global_keywords = GlobalKeywordDefaults { blocked: global_defaults.keyword_blocked.clone(), flagged: global_defaults.keyword_flagged.clone() };
    let effective = build_effective_config(global_defaults.thresholds, &global_keywords, &vhost, resolved_endpoint.as_ref().map(|r| r.endpoint));

    // Paso 5: validación dura de campos requeridos/prohibidos, solo
    // exigida en modos de aplicación (spec §4.N paso 5).
    if matches!(vhost.mode, WafMode::Blocking | WafMode::Strict) {
        if let Some(violation) = hard_validation_failure(&effective.required_fields, &effective.forbidden_fields, &body) {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "validation_failure", "reason": violation, "vhost": vhost.id })),
            )
                .into_response();
        }
    }

    // Observación de campos para el aprendizaje de nombres, independiente
    // de la ejecución del perfil de defensa (`DefenseDeps` no incluye al
    // colector de campos, spec §4.J).
    let endpoint_id_for_learning = resolved_endpoint.as_ref().map(|r| r.endpoint.id.clone()).unwrap_or_else(|| "_none".to_string());
    state.field_learner.observe_request_fields(&vhost.id, &endpoint_id_for_learning, body.field_names());

    let fingerprint_profiles = if vhost.fingerprint_attachment.enabled { load_fingerprint_profiles(&state).await } else { Vec::new() };
    let timing_secrets = if vhost.timing.enabled { load_timing_secrets(&state).await } else { Vec::new() };

    let legacy_profile = build_legacy_profile(&effective, &vhost, &timing_secrets, &fingerprint_profiles);
    let custom_profiles = preload_custom_profiles(&state, &vhost.defense_attachments).await;

    let mut combined_attachments = vhost.defense_attachments.clone();
    combined_attachments.attachments.insert(
        0,
        DefenseProfileAttachment { defense_profile_id: LEGACY_PROFILE_ID.to_string(), priority: LEGACY_ATTACHMENT_PRIORITY, weight: 1.0 },
    );

    let profile_lookup = |id: &str| -> Option<DefenseProfile> {
        if id == LEGACY_PROFILE_ID {
            Some(legacy_profile.clone())
        } else {
            custom_profiles.get(id).cloned()
        }
    };

    let raw_headers: Vec<(&str, &str)> = headers.iter().filter_map(|(name, value)| value.to_str().ok().map(|value| (name.as_str(), value))).collect();
    let timing_cookie = headers
        .get(axum::http::header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(|raw| raw.to_string());

    let context = RequestContext {
        defense_profile_id: LEGACY_PROFILE_ID.to_string(),
        vhost_id: vhost.id.clone(),
        endpoint_id: resolved_endpoint.as_ref().map(|r| r.endpoint.id.clone()),
        client_ip: client_ip_addr,
        headers: normalize_headers(raw_headers.into_iter()),
        body,
        method: method_str,
        path,
        timing_cookie,
        now_unix: chrono::Utc::now().timestamp(),
        fill_duration_seconds: None,
    };

    let deps = DefenseDeps {
        store: state.config_store.clone(),
        signatures: state.signatures.clone(),
        geoip: state.geoip.clone(),
        ip_reputation: state.ip_reputation.clone(),
        behavioral: state.behavioral.clone(),
    };

    let run = run_attached_profiles(&combined_attachments, profile_lookup, true, &context, &deps, &state.signatures).await;

    let would_block = aggregated_counts_as_block(&run.aggregated.action);
    let request_id = uuid::Uuid::new_v4().to_string();

    let mut response_headers: Vec<(String, String)> = vec![
        ("x-waf-vhost".to_string(), vhost.id.clone()),
        ("x-waf-vhost-match".to_string(), resolved_vhost.match_type.as_str().to_string()),
        ("x-waf-mode".to_string(), format!("{:?}", vhost.mode).to_lowercase()),
        ("x-spam-score".to_string(), run.aggregated.score.to_string()),
        ("x-spam-flags".to_string(), run.aggregated.flags.join(",")),
        ("x-client-ip".to_string(), client_ip_addr.to_string()),
    ];
    if let Some(endpoint) = &resolved_endpoint {
        response_headers.push(("x-waf-endpoint".to_string(), endpoint.endpoint.id.clone()));
        response_headers.push(("x-waf-match-type".to_string(), format!("{:?}", endpoint.specificity).to_lowercase()));
    }
    if let Some(hash) = run.executions.iter().find_map(|execution| scraped_content_hash(&execution.trace)) {
        response_headers.push(("x-form-hash".to_string(), hash));
    }
    if let Some((cookie_name, cookie_value)) = scraped_issued_cookie(&run) {
        response_headers.push(("set-cookie".to_string(), format!("{cookie_name}={cookie_value}; Path=/; HttpOnly; SameSite=Lax")));
    }

    // Webhook de observación, mejor esfuerzo; nunca bloquea la respuesta.
    if would_block {
        state.webhook_notifier.enqueue(WebhookEvent::new(
            WebhookEventType::Blocked,
            vhost.id.clone(),
            client_ip_addr.to_string(),
            run.aggregated.score,
            run.aggregated.flags.clone(),
            chrono::Utc::now(),
        ));
    } else if run.aggregated.score >= effective.thresholds.flag_score {
        state.webhook_notifier.enqueue(WebhookEvent::new(
            WebhookEventType::HighScore,
            vhost.id.clone(),
            client_ip_addr.to_string(),
            run.aggregated.score,
            run.aggregated.flags.clone(),
            chrono::Utc::now(),
        ));
    }
    state.webhook_notifier.flush_if_batch_ready().await;

    // Paso 8: `monitoring` nunca aplica la acción, solo la anuncia.
    if matches!(vhost.mode, WafMode::Monitoring) {
        response_headers.push(("x-waf-would-block".to_string(), would_block.to_string()));
        return build_response(StatusCode::OK, json!({ "decision": "allow", "vhost": vhost.id, "monitoring_would_block": would_block }), response_headers);
    }

    // Paso 9: `blocking`/`strict` aplican la acción agregada.
    if !would_block {
        return build_response(StatusCode::OK, json!({ "decision": "allow", "vhost": vhost.id }), response_headers);
    }

    response_headers.push(("x-blocked".to_string(), "true".to_string()));
    response_headers.push(("x-block-reason".to_string(), block_reason(&run.aggregated.flags).to_string()));

    match run.aggregated.action {
        AggregatedAction::Tarpit { delay_ms } => {
            tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
            build_response(
                StatusCode::FORBIDDEN,
                json!({ "error": "blocked", "reason": run.aggregated.flags, "vhost": vhost.id, "endpoint": resolved_endpoint.map(|r| r.endpoint.id.clone()), "request_id": request_id }),
                response_headers,
            )
        }
        AggregatedAction::Captcha => {
            state.webhook_notifier.enqueue(WebhookEvent::new(
                WebhookEventType::Captcha,
                vhost.id.clone(),
                client_ip_addr.to_string(),
                run.aggregated.score,
                run.aggregated.flags.clone(),
                chrono::Utc::now(),
            ));
            build_response(
                StatusCode::FORBIDDEN,
                json!({ "error": "captcha_required", "vhost": vhost.id, "request_id": request_id }),
                response_headers,
            )
        }
        _ => build_response(
            StatusCode::FORBIDDEN,
            json!({ "error": "blocked", "reason": run.aggregated.flags, "vhost": vhost.id, "endpoint": resolved_endpoint.map(|r| r.endpoint.id.clone()), "request_id": request_id }),
            response_headers,
        ),
    }
}

fn build_response(status: StatusCode, body: serde_json::Value, headers: Vec<(String, String)>) -> Response {
    let mut response = (status, Json(body)).into_response();
    for (name, value) in headers {
        if let (Ok(header_name), Ok(header_value)) = (axum::http::HeaderName::from_bytes(name.as_bytes()), axum::http::HeaderValue::from_str(&value)) {
            response.headers_mut().insert(header_name, header_value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cidr_allowlist_entry_matches_contained_address() {
        let allowlist = vec!["10.0.0.0/8".to_string()];
        assert!(ip_allowlisted("10.1.2.3".parse().unwrap(), &allowlist));
        assert!(!ip_allowlisted("192.168.1.1".parse().unwrap(), &allowlist));
    }

    #[test]
    fn exact_ip_allowlist_entry_matches_only_itself() {
        let allowlist = vec!["203.0.113.7".to_string()];
        assert!(ip_allowlisted("203.0.113.7".parse().unwrap(), &allowlist));
        assert!(!ip_allowlisted("203.0.113.8".parse().unwrap(), &allowlist));
    }

    #[test]
    fn hard_validation_failure_reports_first_missing_required_field() {
        let mut body = FlatBody::new();
        body.push("email", "a@b.com");
        let failure = hard_validation_failure(&["email".to_string(), "name".to_string()], &[], &body);
        assert_eq!(failure, Some("missing_required_field:name".to_string()));
    }

    #[test]
    fn hard_validation_failure_reports_forbidden_field_present() {
        let mut body = FlatBody::new();
        body.push("honeypot", "x");
        let failure = hard_validation_failure(&[], &["honeypot".to_string()], &body);
        assert_eq!(failure, Some("forbidden_field_present:honeypot".to_string()));
    }

    #[test]
    fn blocked_keyword_flag_derives_the_semantic_block_reason() {
        let flags = vec!["kw:payday".to_string()];
        assert_eq!(block_reason(&flags), "blocked_keyword");
    }
}
