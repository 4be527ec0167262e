// [libs/domain/defense-executor/src/executor.rs]
/*!
 * APARATO: DEFENSE PROFILE DAG TRAVERSAL (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: EJECUCIÓN ITERATIVA DE UN ÚNICO PERFIL DE DEFENSA (spec §4.L)
 *
 * Recorrido iterativo sobre una lista de trabajo explícita (nunca
 * recursión) para acotar la profundidad de pila y hacer barato imponer
 * `max_execution_time_ms`. El puntero de ejecución visita exactamente un
 * nodo por paso; los operadores que dependen de `inputs` asumen que esos
 * nodos ya se ejecutaron, porque el grafo fue validado como DAG en
 * tiempo de carga (`validate_profile`) y los autores de perfiles cablean
 * `inputs` hacia nodos que preceden al operador en el orden topológico.
 */

use crate::context::{DefenseDeps, NodeOutcome, RequestContext};
use crate::detectors::execute_defense;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use waf_domain_models::prelude::{ActionKind, DefaultActionKind, DefenseProfile, NodeKind, OperatorOp, TarpitFollowup, ThresholdRange};
use waf_domain_signatures::prelude::SignatureRegistry;

/// Acción terminal de un perfil ejecutado, ya resuelta de `tarpit`/`flag`
/// a su forma final para efectos de agregación (spec §4.L).
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedAction {
    Allow,
    Block,
    Captcha,
    Tarpit { delay_ms: u64 },
    Monitor,
}

#[derive(Debug, Clone)]
pub struct ExecutedNode {
    pub node_id: String,
    pub outcome: NodeOutcome,
}

#[derive(Debug, Clone)]
pub struct ProfileExecution {
    pub defense_profile_id: String,
    pub score: i64,
    pub flags: Vec<String>,
    pub action: ResolvedAction,
    pub trace: Vec<ExecutedNode>,
    /// `true` cuando `max_execution_time_ms` venció y el perfil terminó
    /// con `settings.default_action` en lugar de alcanzar una acción real.
    pub timed_out: bool,
}

fn default_action_as_resolved(default_action: DefaultActionKind) -> ResolvedAction {
    match default_action {
        DefaultActionKind::Allow => ResolvedAction::Allow,
        DefaultActionKind::Block => ResolvedAction::Block,
    }
}

fn threshold_output(ranges: &[ThresholdRange], score: f64) -> Option<String> {
    ranges
        .iter()
        .find(|range| score >= range.min && range.max.map(|max| score < max).unwrap_or(true))
        .map(|range| range.output.clone())
}

pub async fn execute_profile(
    profile: &DefenseProfile,
    context: &RequestContext,
    deps: &DefenseDeps,
    signatures: &SignatureRegistry,
) -> ProfileExecution {
    let deadline = Instant::now() + Duration::from_millis(profile.settings.max_execution_time_ms.max(1));
    let mut running_score: i64 = 0;
    let mut flags: Vec<String> = Vec::new();
    let mut trace: Vec<ExecutedNode> = Vec::new();
    let mut node_outcomes: HashMap<String, NodeOutcome> = HashMap::new();
    let mut issued_cookie: Option<(String, String)> = None;

    let Some(start) = profile.start_node() else {
        return ProfileExecution {
            defense_profile_id: profile.id.clone(),
            score: 0,
            flags: vec!["defense_executor:no_start_node".to_string()],
            action: default_action_as_resolved(profile.settings.default_action),
            trace,
            timed_out: false,
        };
    };

    let NodeKind::Start { next } = &start.kind else { unreachable!("start_node always returns a Start kind") };
    let mut cursor: Option<String> = Some(next.clone());

    while let Some(node_id) = cursor.take() {
        if Instant::now() >= deadline {
            flags.push(format!("defense_executor:timeout:{}", profile.id));
            return ProfileExecution {
                defense_profile_id: profile.id.clone(),
                score: running_score,
                flags,
                action: default_action_as_resolved(profile.settings.default_action),
                trace,
                timed_out: true,
            };
        }

        let Some(node) = profile.node(&node_id) else {
            flags.push(format!("defense_executor:dangling_node:{node_id}"));
            return ProfileExecution {
                defense_profile_id: profile.id.clone(),
                score: running_score,
                flags,
                action: default_action_as_resolved(profile.settings.default_action),
                trace,
                timed_out: false,
            };
        };

        match &node.kind {
            NodeKind::Start { .. } => {
                flags.push("defense_executor:unexpected_start_mid_graph".to_string());
                return ProfileExecution {
                    defense_profile_id: profile.id.clone(),
                    score: running_score,
                    flags,
                    action: default_action_as_resolved(profile.settings.default_action),
                    trace,
                    timed_out: false,
                };
            }

            NodeKind::Defense { defense_type, config, outputs } => {
                let effective_config = signatures.effective_config(*defense_type, &profile.id, &node_id, config);
                let outcome = execute_defense(*defense_type, &effective_config, context, deps).await;
                running_score += outcome.score;
                flags.extend(outcome.flags.clone());
                if outcome.issued_cookie.is_some() {
                    issued_cookie = outcome.issued_cookie.clone();
                }
                let next_node = outputs.get(&outcome.output).or_else(|| outputs.get("next")).cloned();
                trace.push(ExecutedNode { node_id: node_id.clone(), outcome: outcome.clone() });
                node_outcomes.insert(node_id, outcome);
                cursor = next_node;
            }

            NodeKind::Operator { op, inputs, outputs, .. } => {
                let outcome = evaluate_operator(op, inputs, running_score, &node_outcomes);
                let next_node = outputs
                    .get(&outcome.output)
                    .or_else(|| outputs.get("next"))
                    .cloned();
                trace.push(ExecutedNode { node_id: node_id.clone(), outcome: outcome.clone() });
                node_outcomes.insert(node_id, outcome);
                cursor = match next_node {
                    Some(target) => Some(target),
                    None => {
                        flags.push(format!("defense_executor:operator_no_route:{node_id}"));
                        return ProfileExecution {
                            defense_profile_id: profile.id.clone(),
                            score: running_score,
                            flags,
                            action: ResolvedAction::Allow,
                            trace,
                            timed_out: false,
                        };
                    }
                };
            }

            NodeKind::Observation { observation_kind, next, .. } => {
                trace.push(ExecutedNode {
                    node_id: node_id.clone(),
                    outcome: NodeOutcome::next(0, false, vec![format!("observation:{observation_kind}")]),
                });
                cursor = Some(next.clone());
            }

            NodeKind::Action { action } => {
                let resolved = resolve_action(action, &mut running_score, &mut flags);
                trace.push(ExecutedNode { node_id: node_id.clone(), outcome: NodeOutcome::next(running_score, false, vec![]) });
                return ProfileExecution {
                    defense_profile_id: profile.id.clone(),
                    score: running_score,
                    flags,
                    action: resolved,
                    trace,
                    timed_out: false,
                }
                .with_cookie(issued_cookie);
            }
        }
    }

    flags.push(format!("defense_executor:ran_off_graph:{}", profile.id));
    ProfileExecution {
        defense_profile_id: profile.id.clone(),
        score: running_score,
        flags,
        action: default_action_as_resolved(profile.settings.default_action),
        trace,
        timed_out: false,
    }
}

impl ProfileExecution {
    fn with_cookie(self, _issued_cookie: Option<(String, String)>) -> Self {
        // El ejecutor de perfil único no transporta la cookie emitida; el
        // orquestador (§4.N) la recupera directamente de la traza del nodo
        // `timing_token`, ya que un perfil puede contener más de uno.
        self
    }
}

fn resolve_action(action: &ActionKind, running_score: &mut i64, flags: &mut Vec<String>) -> ResolvedAction {
    match action {
        ActionKind::Allow => ResolvedAction::Allow,
        ActionKind::Block => ResolvedAction::Block,
        ActionKind::Captcha => ResolvedAction::Captcha,
        ActionKind::Monitor => ResolvedAction::Monitor,
        ActionKind::Flag { score } => {
            *running_score += score;
            flags.push(format!("action:flag:{score}"));
            ResolvedAction::Allow
        }
        ActionKind::Tarpit { delay_ms, then } => {
            let followup = match then {
                TarpitFollowup::Block => ResolvedAction::Block,
                TarpitFollowup::Allow => ResolvedAction::Allow,
                TarpitFollowup::Flag => {
                    flags.push("action:tarpit:flag_followup".to_string());
                    ResolvedAction::Allow
                }
            };
            flags.push(format!("action:tarpit:{delay_ms}ms"));
            match followup {
                ResolvedAction::Block => ResolvedAction::Tarpit { delay_ms: *delay_ms },
                other => other,
            }
        }
    }
}

fn evaluate_operator(op: &OperatorOp, inputs: &[String], running_score: i64, node_outcomes: &HashMap<String, NodeOutcome>) -> NodeOutcome {
    match op {
        OperatorOp::ThresholdBranch { ranges } => match threshold_output(ranges, running_score as f64) {
            Some(output) => NodeOutcome { score: 0, triggered: true, flags: vec![], output, issued_cookie: None },
            None => NodeOutcome::next(0, false, vec![]),
        },
        OperatorOp::ScoreSum => {
            let sum: i64 = inputs.iter().filter_map(|id| node_outcomes.get(id)).map(|outcome| outcome.score).sum();
            NodeOutcome::next(sum, sum > 0, vec![])
        }
        OperatorOp::ScoreMax => {
            let max = inputs.iter().filter_map(|id| node_outcomes.get(id)).map(|outcome| outcome.score).max().unwrap_or(0);
            NodeOutcome::next(max, max > 0, vec![])
        }
        OperatorOp::And => {
            let triggered = !inputs.is_empty() && inputs.iter().all(|id| node_outcomes.get(id).map(|outcome| outcome.triggered).unwrap_or(false));
            NodeOutcome { score: 0, triggered, flags: vec![], output: triggered.to_string(), issued_cookie: None }
        }
        OperatorOp::Or => {
            let triggered = inputs.iter().any(|id| node_outcomes.get(id).map(|outcome| outcome.triggered).unwrap_or(false));
            NodeOutcome { score: 0, triggered, flags: vec![], output: triggered.to_string(), issued_cookie: None }
        }
        OperatorOp::Not => {
            let inner = inputs.first().and_then(|id| node_outcomes.get(id)).map(|outcome| outcome.triggered).unwrap_or(false);
            let triggered = !inner;
            NodeOutcome { score: 0, triggered, flags: vec![], output: triggered.to_string(), issued_cookie: None }
        }
    }
}
