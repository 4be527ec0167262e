// [libs/domain/behavioral/src/baseline.rs]
/*!
 * APARATO: ROLLING BASELINE COMPUTATION (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: MEDIA/DESVIACIÓN MÓVIL POR MÉTRICA SOBRE LA VENTANA
 * DE APRENDIZAJE (spec §4.I)
 *
 * Hasta que existan al menos `min_samples` buckets presentes en la
 * ventana, la línea base se considera no satisfecha y la detección de
 * anomalías queda inerte (spec §4.I: "Until satisfied, anomaly
 * detection is inert").
 */

use waf_domain_models::prelude::{BehavioralMetric, FlowBaseline, HourlyBucket};

fn metric_value(bucket: &HourlyBucket, metric: BehavioralMetric) -> f64 {
    match metric {
        BehavioralMetric::Submissions => bucket.submissions as f64,
        BehavioralMetric::UniqueIps => bucket.unique_ips_count as f64,
        BehavioralMetric::AvgFillDuration => {
            if bucket.sample_count == 0 {
                0.0
            } else {
                bucket.fill_duration_sum / bucket.sample_count as f64
            }
        }
        BehavioralMetric::AvgScore => {
            if bucket.sample_count == 0 {
                0.0
            } else {
                bucket.sum_scores / bucket.sample_count as f64
            }
        }
    }
}

/// Calcula la línea base (media, desviación estándar muestral) de
/// `metric` sobre `buckets`. Retorna `None` si `buckets.len() < min_samples`.
pub fn compute_baseline(buckets: &[HourlyBucket], metric: BehavioralMetric, min_samples: u32) -> Option<FlowBaseline> {
    if buckets.len() < min_samples as usize || buckets.is_empty() {
        return None;
    }

    let values: Vec<f64> = buckets.iter().map(|bucket| metric_value(bucket, metric)).collect();
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;

    let variance = if values.len() < 2 {
        0.0
    } else {
        values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / (count - 1.0)
    };

    Some(FlowBaseline { metric, mean, std_dev: variance.sqrt(), sample_count: buckets.len() as u32 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(submissions: u64) -> HourlyBucket {
        HourlyBucket { submissions, ..HourlyBucket::default() }
    }

    #[test]
    fn fewer_than_min_samples_yields_no_baseline() {
        let buckets = vec![bucket(10), bucket(12)];
        assert!(compute_baseline(&buckets, BehavioralMetric::Submissions, 3).is_none());
    }

    #[test]
    fn mean_and_std_dev_are_computed_over_present_buckets() {
        let buckets = vec![bucket(10), bucket(20), bucket(30)];
        let baseline = compute_baseline(&buckets, BehavioralMetric::Submissions, 3).unwrap();
        assert_eq!(baseline.mean, 20.0);
        assert!((baseline.std_dev - 10.0).abs() < 1e-9);
    }

    #[test]
    fn single_bucket_has_zero_std_dev() {
        let buckets = vec![bucket(10)];
        let baseline = compute_baseline(&buckets, BehavioralMetric::Submissions, 1).unwrap();
        assert_eq!(baseline.std_dev, 0.0);
    }

    #[test]
    fn avg_fill_duration_divides_by_sample_count() {
        let mut bucket = HourlyBucket::default();
        bucket.fill_duration_sum = 20.0;
        bucket.sample_count = 4;
        let baseline = compute_baseline(&[bucket], BehavioralMetric::AvgFillDuration, 1).unwrap();
        assert_eq!(baseline.mean, 5.0);
    }
}
