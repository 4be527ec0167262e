// [libs/domain/defense-executor/src/detectors.rs]
/*!
 * APARATO: PER-DEFENSE-TYPE DISPATCH (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: TRADUCCIÓN DE UN NODO `defense(type, cfg)` A SU
 * DETECTOR CONCRETO (spec §4.L)
 *
 * El `config` ya fusionado (`cfg ⊕ attached_signatures`, resuelto por
 * `waf-domain-signatures::SignatureRegistry::effective_config` antes de
 * llegar aquí) se deserializa directamente como el parámetro propio de
 * cada detector; diez de los quince tipos delegan en un crate ya
 * existente (spec §4.F–§4.I), y cinco (`ip_allowlist`, `honeypot`,
 * `expected_fields`, `field_anomalies`, `header_consistency`) no tienen
 * una sección propia del documento de origen ni un crate dedicado — se
 * resuelven aquí mismo como detectores autocontenidos.
 */

use crate::context::{DefenseDeps, NodeOutcome, RequestContext};
use chrono::Utc;
use ipnetwork::IpNetwork;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use waf_core_pattern_scanner::{scan, KeywordConfig};
use waf_domain_field_learner::prelude::is_known_field;
use waf_domain_fingerprint::prelude::match_profiles;
use waf_domain_identity_detectors::prelude::{
    evaluate_geo_policy, DisposableEmailDetector, ExternalScoreApiConfig, GeoPolicy, ReputationThresholds,
    WebhookProviderConfig,
};
use waf_domain_models::prelude::{BehavioralConfig, DefenseType, FingerprintNoMatchPolicy, FingerprintProfile};
use waf_domain_timing_token::prelude::{is_end_path, is_start_path, issue_cookie, path_matches_any, validate_end_request, TimingTokenConfig};

fn deserialize_or_degraded<T: for<'de> Deserialize<'de>>(defense_type: DefenseType, config: &Value) -> Result<T, NodeOutcome> {
    serde_json::from_value(config.clone()).map_err(|fault| {
        warn!("⚠️ [DEFENSE_EXECUTOR]: malformed config for {:?}: {}", defense_type, fault);
        NodeOutcome::degraded(format!("defense_executor:malformed_config:{defense_type:?}"))
    })
}

macro_rules! deserialize_or_return {
    ($defense_type:expr, $config:expr) => {
        match deserialize_or_degraded($defense_type, $config) {
            Ok(value) => value,
            Err(outcome) => return outcome,
        }
    };
}

pub async fn execute_defense(
    defense_type: DefenseType,
    config: &Value,
    context: &RequestContext,
    deps: &DefenseDeps,
) -> NodeOutcome {
    match defense_type {
        DefenseType::Geoip => geoip(config, context, deps),
        DefenseType::IpReputation => ip_reputation(config, context, deps).await,
        DefenseType::DisposableEmail => disposable_email(config, context),
        DefenseType::TimingToken => timing_token(config, context),
        DefenseType::Behavioral => behavioral(config, context, deps).await,
        DefenseType::KeywordFilter | DefenseType::PatternScan => pattern_scan(config, context),
        DefenseType::ContentHash => content_hash(config, context),
        DefenseType::Fingerprint => fingerprint(config, context),
        DefenseType::IpAllowlist => ip_allowlist(config, context),
        DefenseType::Honeypot => honeypot(config, context),
        DefenseType::ExpectedFields => expected_fields(config, context),
        DefenseType::FieldAnomalies => field_anomalies(config, context, deps).await,
        DefenseType::HeaderConsistency => header_consistency(config, context),
        DefenseType::RateLimiter => rate_limiter(config, context, deps).await,
    }
}

fn geoip(config: &Value, context: &RequestContext, deps: &DefenseDeps) -> NodeOutcome {
    let policy: GeoPolicy = deserialize_or_return!(DefenseType::Geoip, config);
    let lookup = deps.geoip.lookup(context.client_ip);
    let verdict = evaluate_geo_policy(&lookup, &policy);
    NodeOutcome {
        score: verdict.score,
        triggered: !verdict.flags.is_empty(),
        output: if verdict.blocked { "matched".to_string() } else { "next".to_string() },
        flags: verdict.flags,
        issued_cookie: None,
    }
}

#[derive(Deserialize)]
struct IpReputationNodeConfig {
    thresholds: ReputationThresholds,
    #[serde(default)]
    external_api: Option<ExternalScoreApiConfig>,
    #[serde(default)]
    webhook: Option<WebhookProviderConfig>,
}

async fn ip_reputation(config: &Value, context: &RequestContext, deps: &DefenseDeps) -> NodeOutcome {
    let parsed: IpReputationNodeConfig = deserialize_or_return!(DefenseType::IpReputation, config);
    let verdict = deps
        .ip_reputation
        .evaluate(context.client_ip, &deps.store, parsed.external_api.as_ref(), parsed.webhook.as_ref(), &parsed.thresholds)
        .await;
    NodeOutcome {
        score: verdict.score,
        triggered: !verdict.flags.is_empty(),
        output: if verdict.blocked { "matched".to_string() } else { "next".to_string() },
        flags: verdict.flags,
        issued_cookie: None,
    }
}

#[derive(Deserialize)]
struct DisposableEmailNodeConfig {
    email_field: String,
    #[serde(default)]
    custom_blocked: Vec<String>,
    #[serde(default)]
    custom_allowed: Vec<String>,
    score: i64,
}

fn disposable_email(config: &Value, context: &RequestContext) -> NodeOutcome {
    let parsed: DisposableEmailNodeConfig = deserialize_or_return!(DefenseType::DisposableEmail, config);
    let Some(email_value) = context.body.first(&parsed.email_field) else {
        return NodeOutcome::not_matched();
    };
    let detector = DisposableEmailDetector::new(parsed.custom_blocked, parsed.custom_allowed);
    let verdict = detector.classify(email_value);
    if verdict.is_disposable {
        NodeOutcome::matched(parsed.score, vec!["disposable_email:match".to_string()])
    } else {
        NodeOutcome::not_matched()
    }
}

fn timing_token(config: &Value, context: &RequestContext) -> NodeOutcome {
    let parsed: TimingTokenConfig = deserialize_or_return!(DefenseType::TimingToken, config);

    if is_start_path(&parsed, &context.path) {
        return match issue_cookie(&parsed, &context.path, (context.now_unix * 1000) as u64) {
            Some(cookie) => NodeOutcome { issued_cookie: Some((cookie.name, cookie.value)), ..NodeOutcome::next(0, false, vec![]) },
            None => NodeOutcome::degraded("timing_token:no_active_secret"),
        };
    }

    if is_end_path(&parsed, &context.path) {
        let verdict = validate_end_request(&parsed, context.timing_cookie.as_deref(), (context.now_unix * 1000) as u64);
        return NodeOutcome {
            score: verdict.score,
            triggered: !verdict.flags.is_empty(),
            output: if verdict.blocked { "matched".to_string() } else { "next".to_string() },
            flags: verdict.flags,
            issued_cookie: None,
        };
    }

    NodeOutcome::not_matched()
}

async fn behavioral(config: &Value, context: &RequestContext, deps: &DefenseDeps) -> NodeOutcome {
    let parsed: BehavioralConfig = deserialize_or_return!(DefenseType::Behavioral, config);
    if !parsed.enabled {
        return NodeOutcome::not_matched();
    }

    let mut total_score = 0i64;
    let mut flags = Vec::new();

    for flow in &parsed.flows {
        let methods_match = flow.methods.as_ref().map(|methods| methods.iter().any(|m| m.eq_ignore_ascii_case(&context.method))).unwrap_or(true);
        if !methods_match || !path_matches_any(flow.match_mode, &flow.end_paths, &context.path) {
            continue;
        }

        if let Err(fault) = deps.behavioral.ingest(&flow.name, context.now_unix, context.client_ip, 0.0, context.fill_duration_seconds).await {
            flags.push(format!("behavioral:{}:ingest_degraded", flow.name));
            warn!("⚠️ [DEFENSE_EXECUTOR]: behavioral ingest failed for flow {}: {}", flow.name, fault);
            continue;
        }

        match deps.behavioral.evaluate_flow(&flow.name, context.now_unix, &parsed).await {
            Ok(outcomes) => {
                for outcome in outcomes {
                    total_score += outcome.score_addition;
                    flags.push(outcome.flag);
                }
            }
            Err(fault) => {
                flags.push(format!("behavioral:{}:evaluate_degraded", flow.name));
                warn!("⚠️ [DEFENSE_EXECUTOR]: behavioral evaluation failed for flow {}: {}", flow.name, fault);
            }
        }
    }

    NodeOutcome { score: total_score, triggered: !flags.is_empty(), output: if flags.is_empty() { "not_matched".into() } else { "matched".into() }, flags, issued_cookie: None }
}

fn pattern_scan(config: &Value, context: &RequestContext) -> NodeOutcome {
    let keywords: KeywordConfig = deserialize_or_return!(DefenseType::KeywordFilter, config);
    let lowercased = context.body.combined_scan_text();
    let raw: String = context.body.iter().flat_map(|(_, values)| values.iter().cloned()).collect::<Vec<_>>().join(" ");
    let result = scan(&lowercased, &raw, &keywords);

    let mut flags = result.flagged.iter().map(|keyword| format!("keyword:flagged:{keyword}")).collect::<Vec<_>>();
    flags.extend(result.blocked.iter().map(|keyword| format!("kw:{keyword}")));
    flags.extend(result.pattern_flags);

    NodeOutcome {
        score: result.score,
        triggered: !flags.is_empty(),
        output: if result.blocked.is_empty() { "not_matched".to_string() } else { "matched".to_string() },
        flags,
        issued_cookie: None,
    }
}

#[derive(Deserialize)]
struct ContentHashNodeConfig {
    fields: Vec<String>,
}

fn content_hash(config: &Value, context: &RequestContext) -> NodeOutcome {
    let parsed: ContentHashNodeConfig = deserialize_or_return!(DefenseType::ContentHash, config);
    match waf_core_content_hash::compute_content_hash(&context.body, &parsed.fields) {
        Some(hash) => NodeOutcome::matched(0, vec![format!("content_hash:{hash}")]),
        None => NodeOutcome::not_matched(),
    }
}

#[derive(Deserialize)]
struct FingerprintNodeConfig {
    profiles: Vec<FingerprintProfile>,
    #[serde(default)]
    no_match_policy: FingerprintNoMatchPolicy,
    #[serde(default)]
    no_match_score: i64,
}

impl Default for FingerprintNoMatchPolicy {
    fn default() -> Self {
        FingerprintNoMatchPolicy::UseDefault
    }
}

fn fingerprint(config: &Value, context: &RequestContext) -> NodeOutcome {
    let parsed: FingerprintNodeConfig = deserialize_or_return!(DefenseType::Fingerprint, config);
    let result = match_profiles(&parsed.profiles, &context.headers, parsed.no_match_policy, parsed.no_match_score);
    let mut flags = result.flags;
    flags.push(format!("fingerprint:hash:{}", result.fingerprint_hash));
    NodeOutcome {
        score: result.score,
        triggered: !result.matched_profile_ids.is_empty(),
        output: if result.blocked { "matched".to_string() } else { "next".to_string() },
        flags,
        issued_cookie: None,
    }
}

#[derive(Deserialize)]
struct IpAllowlistNodeConfig {
    allowed_networks: Vec<String>,
}

fn ip_allowlist(config: &Value, context: &RequestContext) -> NodeOutcome {
    let parsed: IpAllowlistNodeConfig = deserialize_or_return!(DefenseType::IpAllowlist, config);
    let is_allowed = parsed.allowed_networks.iter().any(|entry| {
        entry
            .parse::<IpNetwork>()
            .map(|network| network.contains(context.client_ip))
            .unwrap_or_else(|_| entry.parse::<std::net::IpAddr>().map(|ip| ip == context.client_ip).unwrap_or(false))
    });
    if is_allowed {
        NodeOutcome::matched(0, vec!["ip_allowlist:match".to_string()])
    } else {
        NodeOutcome::not_matched()
    }
}

#[derive(Deserialize)]
struct HoneypotNodeConfig {
    field_name: String,
    score: i64,
}

fn honeypot(config: &Value, context: &RequestContext) -> NodeOutcome {
    let parsed: HoneypotNodeConfig = deserialize_or_return!(DefenseType::Honeypot, config);
    let filled = context.body.first(&parsed.field_name).map(|value| !value.is_empty()).unwrap_or(false);
    if filled {
        NodeOutcome::matched(parsed.score, vec![format!("honeypot:{}:filled", parsed.field_name)])
    } else {
        NodeOutcome::not_matched()
    }
}

#[derive(Deserialize)]
struct ExpectedFieldsNodeConfig {
    #[serde(default)]
    required: Vec<String>,
    #[serde(default)]
    forbidden: Vec<String>,
    #[serde(default)]
    score_per_missing: i64,
    #[serde(default)]
    score_per_forbidden: i64,
}

fn expected_fields(config: &Value, context: &RequestContext) -> NodeOutcome {
    let parsed: ExpectedFieldsNodeConfig = deserialize_or_return!(DefenseType::ExpectedFields, config);
    let mut score = 0i64;
    let mut flags = Vec::new();

    for required in &parsed.required {
        if context.body.get(required).is_none() {
            score += parsed.score_per_missing;
            flags.push(format!("expected_fields:missing:{required}"));
        }
    }
    for forbidden in &parsed.forbidden {
        if context.body.get(forbidden).is_some() {
            score += parsed.score_per_forbidden;
            flags.push(format!("expected_fields:forbidden:{forbidden}"));
        }
    }

    NodeOutcome { score, triggered: !flags.is_empty(), output: if flags.is_empty() { "not_matched".into() } else { "matched".into() }, flags, issued_cookie: None }
}

#[derive(Deserialize)]
struct FieldAnomaliesNodeConfig {
    new_field_score: i64,
}

async fn field_anomalies(config: &Value, context: &RequestContext, deps: &DefenseDeps) -> NodeOutcome {
    let parsed: FieldAnomaliesNodeConfig = deserialize_or_return!(DefenseType::FieldAnomalies, config);
    let now = Utc::now();
    let mut score = 0i64;
    let mut flags = Vec::new();

    for field_name in context.body.field_names() {
        match is_known_field(&deps.store, &context.vhost_id, field_name, now).await {
            Ok(true) => {}
            Ok(false) => {
                score += parsed.new_field_score;
                flags.push(format!("field_anomalies:unseen:{field_name}"));
            }
            Err(fault) => {
                flags.push("field_anomalies:store_degraded".to_string());
                warn!("⚠️ [DEFENSE_EXECUTOR]: field anomaly lookup failed for {}: {}", field_name, fault);
                break;
            }
        }
    }

    NodeOutcome { score, triggered: !flags.is_empty(), output: if flags.is_empty() { "not_matched".into() } else { "matched".into() }, flags, issued_cookie: None }
}

#[derive(Deserialize)]
struct HeaderConsistencyRule {
    if_present: String,
    then_required: String,
    score: i64,
}

#[derive(Deserialize)]
struct HeaderConsistencyNodeConfig {
    rules: Vec<HeaderConsistencyRule>,
}

fn header_consistency(config: &Value, context: &RequestContext) -> NodeOutcome {
    let parsed: HeaderConsistencyNodeConfig = deserialize_or_return!(DefenseType::HeaderConsistency, config);
    let mut score = 0i64;
    let mut flags = Vec::new();

    for rule in &parsed.rules {
        let present = context.headers.contains_key(&rule.if_present.to_lowercase());
        let required_present = context.headers.contains_key(&rule.then_required.to_lowercase());
        if present && !required_present {
            score += rule.score;
            flags.push(format!("header_consistency:missing:{}", rule.then_required));
        }
    }

    NodeOutcome { score, triggered: !flags.is_empty(), output: if flags.is_empty() { "not_matched".into() } else { "matched".into() }, flags, issued_cookie: None }
}

#[derive(Deserialize)]
struct RateLimiterNodeConfig {
    max_requests: i64,
    window_seconds: i64,
    score_on_exceed: i64,
    #[serde(default)]
    block_on_exceed: bool,
}

async fn rate_limiter(config: &Value, context: &RequestContext, deps: &DefenseDeps) -> NodeOutcome {
    let parsed: RateLimiterNodeConfig = deserialize_or_return!(DefenseType::RateLimiter, config);
    let window_start = context.now_unix - context.now_unix.rem_euclid(parsed.window_seconds.max(1));
    let key = format!("waf:ratelimit:{}:{}:{}", context.vhost_id, context.client_ip, window_start);

    let count = match deps.store.incr_by(&key, 1).await {
        Ok(count) => count,
        Err(fault) => {
            warn!("⚠️ [DEFENSE_EXECUTOR]: rate limiter store unavailable: {}", fault);
            return NodeOutcome::degraded("rate_limiter:store_degraded");
        }
    };

    if count > parsed.max_requests {
        NodeOutcome {
            score: parsed.score_on_exceed,
            triggered: true,
            output: "matched".to_string(),
            flags: vec![format!("rate_limiter:exceeded:{count}")],
            issued_cookie: None,
        }
    } else {
        NodeOutcome::not_matched()
    }
    .tap_block_flag(parsed.block_on_exceed)
}

trait TapBlockFlag {
    fn tap_block_flag(self, block_on_exceed: bool) -> Self;
}

impl TapBlockFlag for NodeOutcome {
    fn tap_block_flag(mut self, block_on_exceed: bool) -> Self {
        if self.triggered && block_on_exceed {
            self.flags.push("rate_limiter:hard_block".to_string());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use waf_core_body_parser::FlatBody;
    use waf_domain_behavioral::prelude::BehavioralEngine;
    use waf_domain_identity_detectors::prelude::{GeoIpDetector, IpReputationDetector};
    use waf_domain_signatures::prelude::SignatureRegistry;
    use waf_infra_config_store::prelude::InMemoryConfigStore;

    fn sample_context() -> RequestContext {
        RequestContext {
            defense_profile_id: "profile-1".into(),
            vhost_id: "vh-1".into(),
            endpoint_id: None,
            client_ip: "9.9.9.9".parse().unwrap(),
            headers: HashMap::new(),
            body: FlatBody::new(),
            method: "POST".into(),
            path: "/contact".into(),
            timing_cookie: None,
            now_unix: 10_000,
            fill_duration_seconds: None,
        }
    }

    fn sample_deps() -> DefenseDeps {
        let store: Arc<dyn waf_infra_config_store::prelude::ConfigStoreClient> = Arc::new(InMemoryConfigStore::new());
        DefenseDeps {
            store: store.clone(),
            signatures: Arc::new(SignatureRegistry::new()),
            geoip: Arc::new(GeoIpDetector::inert()),
            ip_reputation: Arc::new(IpReputationDetector::new(reqwest::Client::new())),
            behavioral: Arc::new(BehavioralEngine::new(store)),
        }
    }

    #[tokio::test]
    async fn honeypot_field_filled_is_matched() {
        let mut context = sample_context();
        context.body.push("website", "http://spam.example");
        let config = serde_json::json!({ "field_name": "website", "score": 50 });
        let outcome = execute_defense(DefenseType::Honeypot, &config, &context, &sample_deps()).await;
        assert!(outcome.triggered);
        assert_eq!(outcome.score, 50);
    }

    #[tokio::test]
    async fn honeypot_field_empty_is_not_matched() {
        let context = sample_context();
        let config = serde_json::json!({ "field_name": "website", "score": 50 });
        let outcome = execute_defense(DefenseType::Honeypot, &config, &context, &sample_deps()).await;
        assert!(!outcome.triggered);
    }

    #[tokio::test]
    async fn ip_allowlist_matches_cidr_network() {
        let context = sample_context();
        let config = serde_json::json!({ "allowed_networks": ["9.9.9.0/24"] });
        let outcome = execute_defense(DefenseType::IpAllowlist, &config, &context, &sample_deps()).await;
        assert!(outcome.triggered);
        assert_eq!(outcome.output, "matched");
    }

    #[tokio::test]
    async fn expected_fields_flags_each_missing_required_field() {
        let context = sample_context();
        let config = serde_json::json!({ "required": ["email", "name"], "score_per_missing": 5 });
        let outcome = execute_defense(DefenseType::ExpectedFields, &config, &context, &sample_deps()).await;
        assert_eq!(outcome.score, 10);
        assert_eq!(outcome.flags.len(), 2);
    }

    #[tokio::test]
    async fn field_anomalies_flags_every_field_before_any_flush() {
        let mut context = sample_context();
        context.body.push("email", "a@b.com");
        let config = serde_json::json!({ "new_field_score": 3 });
        let outcome = execute_defense(DefenseType::FieldAnomalies, &config, &context, &sample_deps()).await;
        assert_eq!(outcome.score, 3);
    }

    #[tokio::test]
    async fn rate_limiter_exceeding_threshold_is_matched() {
        let context = sample_context();
        let deps = sample_deps();
        let config = serde_json::json!({ "max_requests": 1, "window_seconds": 60, "score_on_exceed": 40, "block_on_exceed": true });
        execute_defense(DefenseType::RateLimiter, &config, &context, &deps).await;
        let second = execute_defense(DefenseType::RateLimiter, &config, &context, &deps).await;
        assert!(second.triggered);
        assert!(second.flags.iter().any(|flag| flag == "rate_limiter:hard_block"));
    }

    #[tokio::test]
    async fn malformed_config_degrades_rather_than_panicking() {
        let context = sample_context();
        let config = serde_json::json!({ "unexpected": true });
        let outcome = execute_defense(DefenseType::Honeypot, &config, &context, &sample_deps()).await;
        assert!(!outcome.triggered);
        assert!(outcome.flags[0].starts_with("defense_executor:malformed_config"));
    }
}
