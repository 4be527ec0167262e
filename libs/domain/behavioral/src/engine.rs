// [libs/domain/behavioral/src/engine.rs]
/*!
 * APARATO: BEHAVIORAL BASELINE ENGINE (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: ORQUESTACIÓN DE INGESTA + REFRESCO PEREZOSO DE LÍNEA
 * BASE + DETECCIÓN (spec §4.I)
 *
 * El refresco de línea base es perezoso con TTL de 5 minutos por
 * (flujo, métrica): recomputar en cada solicitud sería una lectura de
 * hasta `learning_period_days * 24` documentos por evaluación.
 */

use crate::baseline::compute_baseline;
use crate::detection::{detect_anomaly, AnomalyOutcome};
use crate::errors::BehavioralError;
use crate::ingest::{ingest_observation, load_recent_buckets, truncate_to_hour, FlowObservation};
use crate::ip_tracker::UniqueIpTracker;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use waf_domain_models::prelude::{BehavioralConfig, BehavioralMetric, FlowBaseline};
use waf_infra_config_store::prelude::ConfigStoreClient;

pub const DEFAULT_BASELINE_REFRESH_TTL: Duration = Duration::from_secs(5 * 60);

const METRICS: [BehavioralMetric; 4] =
    [BehavioralMetric::Submissions, BehavioralMetric::UniqueIps, BehavioralMetric::AvgFillDuration, BehavioralMetric::AvgScore];

struct CachedBaseline {
    baseline: Option<FlowBaseline>,
    refreshed_at: Instant,
}

pub struct BehavioralEngine {
    store: Arc<dyn ConfigStoreClient>,
    ip_tracker: UniqueIpTracker,
    baseline_cache: DashMap<(String, BehavioralMetric), CachedBaseline>,
    refresh_ttl: Duration,
}

impl BehavioralEngine {
    pub fn new(store: Arc<dyn ConfigStoreClient>) -> Self {
        Self { store, ip_tracker: UniqueIpTracker::new(), baseline_cache: DashMap::new(), refresh_ttl: DEFAULT_BASELINE_REFRESH_TTL }
    }

    /// Ingiere una observación de flujo para la hora actual, incluyendo el
    /// conteo aproximado de IPs únicas acumulado por el rastreador local.
    pub async fn ingest(
        &self,
        flow: &str,
        now_unix: i64,
        ip: std::net::IpAddr,
        score: f64,
        fill_duration_seconds: Option<f64>,
    ) -> Result<(), BehavioralError> {
        let hour_ts = truncate_to_hour(now_unix);
        let unique_ips_count = self.ip_tracker.observe(flow, hour_ts, ip);
        ingest_observation(
            &self.store,
            FlowObservation { flow: flow.to_string(), hour_ts, unique_ips_count, score, fill_duration_seconds },
        )
        .await
    }

    async fn baseline_for(
        &self,
        flow: &str,
        metric: BehavioralMetric,
        now_unix: i64,
        config: &BehavioralConfig,
    ) -> Result<Option<FlowBaseline>, BehavioralError> {
        let cache_key = (flow.to_string(), metric);
        if let Some(cached) = self.baseline_cache.get(&cache_key) {
            if cached.refreshed_at.elapsed() < self.refresh_ttl {
                return Ok(cached.baseline);
            }
        }

        let hour_ts = truncate_to_hour(now_unix);
        let window_hours = config.learning_period_days.saturating_mul(24);
        let buckets = load_recent_buckets(&self.store, flow, hour_ts, window_hours).await?;
        let baseline = compute_baseline(&buckets, metric, config.min_samples);

        self.baseline_cache.insert(cache_key, CachedBaseline { baseline, refreshed_at: Instant::now() });
        Ok(baseline)
    }

    /// Evalúa todas las métricas conductuales del flujo `flow` contra sus
    /// líneas base y retorna las anomalías detectadas (spec §4.I).
    /// Requiere el bucket de la hora actual ya ingerido — el valor
    /// "actual" evaluado es el de la hora en curso.
    pub async fn evaluate_flow(
        &self,
        flow: &str,
        now_unix: i64,
        config: &BehavioralConfig,
    ) -> Result<Vec<AnomalyOutcome>, BehavioralError> {
        if !config.enabled {
            return Ok(Vec::new());
        }

        let hour_ts = truncate_to_hour(now_unix);
        let current_buckets = load_recent_buckets(&self.store, flow, hour_ts, 1).await?;
        let Some(current_bucket) = current_buckets.into_iter().next() else {
            return Ok(Vec::new());
        };

        let mut outcomes = Vec::new();
        for metric in METRICS {
            let Some(baseline) = self.baseline_for(flow, metric, now_unix, config).await? else {
                continue;
            };

            let current_value = match metric {
                BehavioralMetric::Submissions => current_bucket.submissions as f64,
                BehavioralMetric::UniqueIps => current_bucket.unique_ips_count as f64,
                BehavioralMetric::AvgFillDuration => {
                    if current_bucket.sample_count == 0 {
                        0.0
                    } else {
                        current_bucket.fill_duration_sum / current_bucket.sample_count as f64
                    }
                }
                BehavioralMetric::AvgScore => {
                    if current_bucket.sample_count == 0 {
                        0.0
                    } else {
                        current_bucket.sum_scores / current_bucket.sample_count as f64
                    }
                }
            };

            if let Some(outcome) =
                detect_anomaly(flow, current_value, &baseline, config.std_dev_threshold, config.policy, config.score_addition)
            {
                outcomes.push(outcome);
            }
        }

        Ok(outcomes)
    }
}
