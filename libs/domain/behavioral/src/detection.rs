// [libs/domain/behavioral/src/detection.rs]
/*!
 * APARATO: Z-SCORE ANOMALY DETECTION (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: COMPARACIÓN DEL VALOR ACTUAL CONTRA LA LÍNEA BASE (spec §4.I)
 *
 * El motor nunca bloquea directamente (spec §4.I): `Flag` solo añade
 * puntuación y una bandera; `Score` únicamente registra. Ambos casos se
 * expresan en el mismo `AnomalyOutcome`, y es el ejecutor de perfiles
 * (`waf-domain-defense-executor`) quien decide qué hacer con la bandera.
 */

use waf_domain_models::prelude::{BehavioralPolicy, FlowBaseline};

#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyOutcome {
    pub z_score: f64,
    pub score_addition: i64,
    pub flag: String,
}

/// Evalúa `current_value` contra `baseline`. Retorna `None` si `σ = 0`
/// (ninguna variación contra la que comparar) o si `|z| < threshold`.
pub fn detect_anomaly(
    flow: &str,
    current_value: f64,
    baseline: &FlowBaseline,
    std_dev_threshold: f64,
    policy: BehavioralPolicy,
    score_addition: i64,
) -> Option<AnomalyOutcome> {
    if baseline.std_dev == 0.0 {
        return None;
    }

    let z_score = (current_value - baseline.mean) / baseline.std_dev;
    if z_score.abs() < std_dev_threshold {
        return None;
    }

    let applied_score = match policy {
        BehavioralPolicy::Flag => score_addition,
        BehavioralPolicy::Score => 0,
    };

    Some(AnomalyOutcome {
        z_score,
        score_addition: applied_score,
        flag: format!("behavioral:{flow}:{:?}:{z_score:.2}", baseline.metric).to_lowercase(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use waf_domain_models::prelude::BehavioralMetric;

    fn baseline(mean: f64, std_dev: f64) -> FlowBaseline {
        FlowBaseline { metric: BehavioralMetric::Submissions, mean, std_dev, sample_count: 24 }
    }

    #[test]
    fn value_within_threshold_is_not_anomalous() {
        let outcome = detect_anomaly("signup", 21.0, &baseline(20.0, 5.0), 3.0, BehavioralPolicy::Flag, 10);
        assert!(outcome.is_none());
    }

    #[test]
    fn value_beyond_threshold_is_anomalous_and_adds_score_under_flag_policy() {
        let outcome = detect_anomaly("signup", 100.0, &baseline(20.0, 5.0), 3.0, BehavioralPolicy::Flag, 10).unwrap();
        assert_eq!(outcome.score_addition, 10);
        assert!(outcome.flag.starts_with("behavioral:signup:"));
    }

    #[test]
    fn score_policy_never_contributes_score() {
        let outcome = detect_anomaly("signup", 100.0, &baseline(20.0, 5.0), 3.0, BehavioralPolicy::Score, 10).unwrap();
        assert_eq!(outcome.score_addition, 0);
    }

    #[test]
    fn zero_std_dev_never_flags() {
        let outcome = detect_anomaly("signup", 1000.0, &baseline(20.0, 0.0), 3.0, BehavioralPolicy::Flag, 10);
        assert!(outcome.is_none());
    }
}
