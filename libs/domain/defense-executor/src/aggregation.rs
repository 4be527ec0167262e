// [libs/domain/defense-executor/src/aggregation.rs]
/*!
 * APARATO: MULTI-PROFILE AGGREGATION (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: COMBINAR LAS EJECUCIONES DE VARIOS PERFILES ADJUNTOS
 * EN UNA ÚNICA DECISIÓN (spec §4.L, §9 "MAJORITY at exactly 50%")
 *
 * `captcha`/`tarpit` cuentan como bloqueo para la agregación de decisión;
 * la acción final expuesta al llamador sigue el orden de severidad
 * block > tarpit > captcha > flag(allow con score) > monitor > allow.
 */

use crate::executor::{ProfileExecution, ResolvedAction};
use waf_domain_models::prelude::{DecisionAggregation, ScoreAggregation};

#[derive(Debug, Clone, PartialEq)]
pub enum AggregatedAction {
    Allow,
    Block,
    Captcha,
    Tarpit { delay_ms: u64 },
    Monitor,
}

#[derive(Debug, Clone)]
pub struct AggregatedOutcome {
    pub action: AggregatedAction,
    pub score: i64,
    pub flags: Vec<String>,
}

fn counts_as_block(action: &ResolvedAction) -> bool {
    matches!(action, ResolvedAction::Block | ResolvedAction::Tarpit { .. } | ResolvedAction::Captcha)
}

fn decide_block(executions: &[ProfileExecution], strategy: DecisionAggregation) -> bool {
    if executions.is_empty() {
        return false;
    }
    match strategy {
        DecisionAggregation::Or => executions.iter().any(|execution| counts_as_block(&execution.action)),
        DecisionAggregation::And => executions.iter().all(|execution| counts_as_block(&execution.action)),
        DecisionAggregation::Majority => {
            let blocking = executions.iter().filter(|execution| counts_as_block(&execution.action)).count();
            // 50% exactly never blocks (spec §9 open question, resolved here).
            (blocking * 2) > executions.len()
        }
    }
}

/// Severidad entre acciones individuales no-bloqueantes para elegir cuál
/// "gana" cuando ninguna estrategia de decisión produce un bloqueo
/// agregado pero varias acciones distintas coexisten (spec §4.L: "el más
/// severo entre resultados no-`allow` gana").
fn severity_rank(action: &ResolvedAction) -> u8 {
    match action {
        ResolvedAction::Block => 5,
        ResolvedAction::Tarpit { .. } => 4,
        ResolvedAction::Captcha => 3,
        ResolvedAction::Monitor => 1,
        ResolvedAction::Allow => 0,
    }
}

fn most_severe_non_allow(executions: &[ProfileExecution]) -> AggregatedAction {
    executions
        .iter()
        .max_by_key(|execution| severity_rank(&execution.action))
        .map(|execution| match &execution.action {
            ResolvedAction::Allow => AggregatedAction::Allow,
            ResolvedAction::Block => AggregatedAction::Block,
            ResolvedAction::Captcha => AggregatedAction::Captcha,
            ResolvedAction::Tarpit { delay_ms } => AggregatedAction::Tarpit { delay_ms: *delay_ms },
            ResolvedAction::Monitor => AggregatedAction::Monitor,
        })
        .unwrap_or(AggregatedAction::Allow)
}

fn aggregate_score(executions: &[ProfileExecution], strategy: ScoreAggregation, weights: &[f64]) -> i64 {
    if executions.is_empty() {
        return 0;
    }
    match strategy {
        ScoreAggregation::Sum => executions.iter().map(|execution| execution.score).sum(),
        ScoreAggregation::Max => executions.iter().map(|execution| execution.score).max().unwrap_or(0),
        ScoreAggregation::WeightedAvg => {
            let total_weight: f64 = weights.iter().sum();
            if total_weight <= 0.0 {
                return executions.iter().map(|execution| execution.score).sum::<i64>() / executions.len() as i64;
            }
            let weighted: f64 = executions.iter().zip(weights.iter()).map(|(execution, weight)| execution.score as f64 * weight).sum();
            (weighted / total_weight).round() as i64
        }
    }
}

/// Agrega las ejecuciones de todos los perfiles adjuntos a un vhost según
/// sus estrategias de decisión y score (spec §4.L). `weights` debe tener
/// la misma longitud y orden que `executions`.
pub fn aggregate_executions(
    executions: &[ProfileExecution],
    weights: &[f64],
    decision_strategy: DecisionAggregation,
    score_strategy: ScoreAggregation,
) -> AggregatedOutcome {
    let score = aggregate_score(executions, score_strategy, weights);
    let flags = executions.iter().flat_map(|execution| execution.flags.clone()).collect();

    let action = if decide_block(executions, decision_strategy) {
        match most_severe_non_allow(executions) {
            AggregatedAction::Allow => AggregatedAction::Block,
            other => other,
        }
    } else {
        most_severe_non_allow(executions)
    };

    AggregatedOutcome { action, score, flags }
}
