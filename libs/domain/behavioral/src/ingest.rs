// [libs/domain/behavioral/src/ingest.rs]
/*!
 * APARATO: HOURLY BUCKET INGESTION (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: ACUMULACIÓN ATÓMICA DE CONTADORES POR HORA (spec §4.I)
 *
 * `submissions` usa `incr_by` (atómico en el contrato del almacén).
 * Las sumas de punto flotante (`sum_scores`, `fill_duration_sum`,
 * `fill_duration_sqsum`) se acumulan con lectura-modificación-escritura
 * sobre un campo de hash; spec §5 documenta esta clase de refresco como
 * "idempotente y racy — last writer wins", así que una carrera entre
 * dos escrituras concurrentes pierde como mucho una muestra, nunca
 * corrompe el documento.
 */

use crate::errors::BehavioralError;
use std::sync::Arc;
use waf_domain_models::prelude::HourlyBucket;
use waf_infra_config_store::prelude::ConfigStoreClient;

const HOUR_SECONDS: i64 = 3600;

pub fn truncate_to_hour(unix_ts: i64) -> i64 {
    unix_ts - unix_ts.rem_euclid(HOUR_SECONDS)
}

fn bucket_key(flow: &str, hour_ts: i64) -> String {
    format!("waf:behavioral:bucket:{flow}:{hour_ts}")
}

pub fn submissions_counter_key(flow: &str, hour_ts: i64) -> String {
    format!("waf:behavioral:submissions:{flow}:{hour_ts}")
}

/// Observación de una única solicitud que cruza el inicio o fin de un flujo.
pub struct FlowObservation {
    pub flow: String,
    pub hour_ts: i64,
    pub unique_ips_count: u64,
    pub score: f64,
    pub fill_duration_seconds: Option<f64>,
}

async fn load_bucket(store: &Arc<dyn ConfigStoreClient>, flow: &str, hour_ts: i64) -> Result<HourlyBucket, BehavioralError> {
    match store.get(&bucket_key(flow, hour_ts)).await? {
        Some(value) => serde_json::from_value(value).map_err(|fault| BehavioralError::MalformedBucket(fault.to_string())),
        None => Ok(HourlyBucket::default()),
    }
}

/// Acumula una observación en el bucket horario del flujo. El conteo de
/// envíos atómico (`submissions_counter_key`) es la fuente de verdad
/// para `submissions`; el resto del documento se reescribe aquí en un
/// ciclo best-effort leer-modificar-escribir.
pub async fn ingest_observation(store: &Arc<dyn ConfigStoreClient>, observation: FlowObservation) -> Result<(), BehavioralError> {
    let submissions = store.incr_by(&submissions_counter_key(&observation.flow, observation.hour_ts), 1).await?;

    let mut bucket = load_bucket(store, &observation.flow, observation.hour_ts).await?;
    bucket.submissions = submissions.max(0) as u64;
    bucket.unique_ips_count = observation.unique_ips_count;
    bucket.sum_scores += observation.score;
    bucket.sample_count += 1;
    if let Some(duration) = observation.fill_duration_seconds {
        bucket.fill_duration_sum += duration;
        bucket.fill_duration_sqsum += duration * duration;
    }

    let encoded = serde_json::to_value(&bucket).map_err(|fault| BehavioralError::MalformedBucket(fault.to_string()))?;
    store.set(&bucket_key(&observation.flow, observation.hour_ts), encoded).await?;
    Ok(())
}

/// Lee los buckets de las últimas `window_hours` horas (incluyendo
/// `current_hour_ts`), más recientes primero. Horas sin datos se omiten
/// del resultado en lugar de rellenarse con ceros — `min_samples` en
/// `baseline.rs` cuenta solo sobre buckets presentes.
pub async fn load_recent_buckets(
    store: &Arc<dyn ConfigStoreClient>,
    flow: &str,
    current_hour_ts: i64,
    window_hours: u32,
) -> Result<Vec<HourlyBucket>, BehavioralError> {
    let mut buckets = Vec::new();
    for offset in 0..window_hours as i64 {
        let hour_ts = current_hour_ts - offset * HOUR_SECONDS;
        if let Some(value) = store.get(&bucket_key(flow, hour_ts)).await? {
            let bucket: HourlyBucket =
                serde_json::from_value(value).map_err(|fault| BehavioralError::MalformedBucket(fault.to_string()))?;
            buckets.push(bucket);
        }
    }
    Ok(buckets)
}
