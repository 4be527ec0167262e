// [libs/domain/identity-detectors/src/ip_reputation.rs]
/*!
 * APARATO: IP REPUTATION DETECTOR (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: COMPOSICIÓN DE TRES PROVEEDORES DE REPUTACIÓN (spec §4.F)
 *
 * Proveedores: lista negra local respaldada por el almacén (siempre
 * disponible si el almacén responde), una API de puntuación externa
 * opcional, y un webhook HTTP opcional. El fallo de un único proveedor
 * produce un resultado parcial; el fallo de todos produce
 * `score=0` más la bandera `provider_unavailable` (spec §7).
 */

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;
use waf_infra_config_store::prelude::ConfigStoreClient;

use crate::verdict::DetectorVerdict;

pub const DEFAULT_POSITIVE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_NEGATIVE_TTL: Duration = Duration::from_secs(60 * 60);

const LOCAL_BLOCKLIST_KEY: &str = "waf:ipreputation:blocklist";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReputationThresholds {
    pub block_score: i64,
    pub flag_score: i64,
    pub flag_score_addition: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalScoreApiConfig {
    pub endpoint: String,
    pub api_key: String,
    pub min_confidence: f64,
    pub max_age_seconds: u64,
    pub score_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookProviderConfig {
    pub endpoint: String,
    pub timeout_ms: u64,
}

/// Respuesta esperada de la API de puntuación externa y del webhook
/// (mismo esquema laxo, spec §9 open question: `{score, blocked?, flags?, reason?}`).
#[derive(Debug, Clone, Deserialize)]
struct ProviderResponseBody {
    score: f64,
    #[serde(default)]
    blocked: Option<bool>,
    #[serde(default)]
    flags: Option<Vec<String>>,
    #[serde(default)]
    #[allow(dead_code)]
    reason: Option<String>,
}

#[derive(Clone, Copy)]
struct CachedVerdict {
    is_bad: bool,
    score: i64,
    cached_at: Instant,
}

pub struct IpReputationDetector {
    http_client: reqwest::Client,
    cache: DashMap<IpAddr, CachedVerdict>,
    positive_ttl: Duration,
    negative_ttl: Duration,
}

impl IpReputationDetector {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            cache: DashMap::new(),
            positive_ttl: DEFAULT_POSITIVE_TTL,
            negative_ttl: DEFAULT_NEGATIVE_TTL,
        }
    }

    fn cache_lookup(&self, ip: IpAddr) -> Option<CachedVerdict> {
        let entry = self.cache.get(&ip)?;
        let ttl = if entry.is_bad { self.positive_ttl } else { self.negative_ttl };
        if entry.cached_at.elapsed() < ttl {
            Some(*entry)
        } else {
            None
        }
    }

    async fn query_external_score_api(&self, ip: IpAddr, config: &ExternalScoreApiConfig) -> Option<f64> {
        let response = self
            .http_client
            .get(&config.endpoint)
            .query(&[("ip", ip.to_string()), ("key", config.api_key.clone())])
            .send()
            .await
            .map_err(|fault| warn!("⚠️ [IP_REPUTATION]: External score API unreachable: {}", fault))
            .ok()?;

        let body: ProviderResponseBody = response
            .json()
            .await
            .map_err(|fault| warn!("⚠️ [IP_REPUTATION]: External score API returned an unparsable body: {}", fault))
            .ok()?;

        Some(body.score * config.score_multiplier)
    }

    async fn query_webhook(&self, ip: IpAddr, config: &WebhookProviderConfig) -> Option<(f64, bool, Vec<String>)> {
        let response = self
            .http_client
            .post(&config.endpoint)
            .timeout(Duration::from_millis(config.timeout_ms))
            .json(&serde_json::json!({ "ip": ip.to_string() }))
            .send()
            .await
            .map_err(|fault| warn!("⚠️ [IP_REPUTATION]: Webhook provider unreachable: {}", fault))
            .ok()?;

        let body: ProviderResponseBody = response
            .json()
            .await
            .map_err(|fault| warn!("⚠️ [IP_REPUTATION]: Webhook provider returned a malformed schema: {}", fault))
            .ok()?;

        Some((body.score, body.blocked.unwrap_or(false), body.flags.unwrap_or_default()))
    }

    /// Evalúa la reputación de `ip` componiendo los tres proveedores.
    pub async fn evaluate(
        &self,
        ip: IpAddr,
        store: &Arc<dyn ConfigStoreClient>,
        external_api: Option<&ExternalScoreApiConfig>,
        webhook: Option<&WebhookProviderConfig>,
        thresholds: &ReputationThresholds,
    ) -> DetectorVerdict {
        if let Some(cached) = self.cache_lookup(ip) {
            return self.verdict_from_score(cached.score, thresholds, vec!["ip_reputation:cached".to_string()]);
        }

        let mut providers_consulted = 0u32;
        let mut providers_succeeded = 0u32;
        let mut accumulated_score = 0i64;
        let mut flags = Vec::new();
        let mut hard_blocked = false;

        providers_consulted += 1;
        match store.set_members(LOCAL_BLOCKLIST_KEY).await {
            Ok(blocklist) => {
                providers_succeeded += 1;
                if blocklist.iter().any(|entry| entry == &ip.to_string()) {
                    hard_blocked = true;
                    flags.push("ip_reputation:local_blocklist".to_string());
                }
            }
            Err(fault) => warn!("⚠️ [IP_REPUTATION]: Local blocklist store query failed: {}", fault),
        }

        if let Some(config) = external_api {
            providers_consulted += 1;
            if let Some(score) = self.query_external_score_api(ip, config).await {
                providers_succeeded += 1;
                accumulated_score += score.round() as i64;
                flags.push("ip_reputation:external_api".to_string());
            }
        }

        if let Some(config) = webhook {
            providers_consulted += 1;
            if let Some((score, blocked, webhook_flags)) = self.query_webhook(ip, config).await {
                providers_succeeded += 1;
                accumulated_score += score.round() as i64;
                hard_blocked = hard_blocked || blocked;
                flags.extend(webhook_flags);
            }
        }

        if providers_succeeded == 0 && providers_consulted > 0 {
            return DetectorVerdict { score: 0, blocked: false, flags: vec!["ip_reputation:provider_unavailable".to_string()] };
        }

        self.cache.insert(
            ip,
            CachedVerdict { is_bad: hard_blocked || accumulated_score >= thresholds.flag_score, score: accumulated_score, cached_at: Instant::now() },
        );

        let mut verdict = self.verdict_from_score(accumulated_score, thresholds, flags);
        verdict.blocked = verdict.blocked || hard_blocked;
        verdict
    }

    fn verdict_from_score(&self, score: i64, thresholds: &ReputationThresholds, mut flags: Vec<String>) -> DetectorVerdict {
        if score >= thresholds.block_score {
            flags.push("ip_reputation:block_threshold".to_string());
            DetectorVerdict { score, blocked: true, flags }
        } else if score >= thresholds.flag_score {
            flags.push("ip_reputation:flag_threshold".to_string());
            DetectorVerdict { score: score + thresholds.flag_score_addition, blocked: false, flags }
        } else {
            DetectorVerdict { score, blocked: false, flags }
        }
    }
}
