// [libs/domain/models/src/flow.rs]
/*!
 * APARATO: BEHAVIORAL FLOW MODEL (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN MODEL (ESTRATO L2)
 * (spec §3, Entity Flow; §4.I)
 */

use crate::common::PathMatchMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub name: String,
    pub start_paths: Vec<String>,
    pub end_paths: Vec<String>,
    pub match_mode: PathMatchMode,
    pub methods: Option<Vec<String>>,
}

/// Sentinela cuando el conteo aproximado de IPs únicas excede la capacidad
/// de seguimiento exacto (spec §4.I: HyperLogLog o conjunto acotado).
pub const UNIQUE_IPS_OVERFLOW_SENTINEL: u64 = u64::MAX;

/// Estadísticas acumuladas de una hora (timestamp truncado a la hora, en
/// segundos Unix) para un flujo dado.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyBucket {
    pub submissions: u64,
    pub unique_ips_count: u64,
    pub sum_scores: f64,
    pub fill_duration_sum: f64,
    pub fill_duration_sqsum: f64,
    pub sample_count: u64,
}

/// Serie de buckets horarios de un flujo, indexada por timestamp de hora.
pub type FlowBucketSeries = BTreeMap<i64, HourlyBucket>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehavioralMetric {
    Submissions,
    UniqueIps,
    AvgFillDuration,
    AvgScore,
}

/// Instantánea de referencia derivada de la ventana final de buckets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowBaseline {
    pub metric: BehavioralMetric,
    pub mean: f64,
    pub std_dev: f64,
    pub sample_count: u32,
}

/// Política aplicada cuando una métrica se desvía ≥ `std_dev_threshold`
/// de su línea base (spec §4.I).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehavioralPolicy {
    /// Añade `score_addition` al score de la solicitud y registra un flag.
    #[default]
    Flag,
    /// Solo registra la anomalía; nunca contribuye al score ni bloquea.
    Score,
}
