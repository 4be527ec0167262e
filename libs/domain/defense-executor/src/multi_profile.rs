// [libs/domain/defense-executor/src/multi_profile.rs]
/*!
 * APARATO: MULTI-PROFILE ORCHESTRATION (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: EJECUTAR LOS PERFILES ADJUNTOS A UN VHOST EN ORDEN DE
 * PRIORIDAD, CON CORTE TEMPRANO OPCIONAL, Y DELEGAR LA AGREGACIÓN FINAL
 * (spec §4.L)
 *
 * El modo de perfil único heredado se modela como "un vhost con
 * exactamente un adjunto cuyo id es `legacy`"; este ejecutor no tiene
 * caso especial para ese id (spec §9).
 */

use crate::aggregation::{aggregate_executions, AggregatedOutcome};
use crate::context::{DefenseDeps, RequestContext};
use crate::executor::{execute_profile, ProfileExecution};
use waf_domain_models::prelude::{DecisionAggregation, DefenseProfile, ScoreAggregation, VhostDefenseAttachments};
use waf_domain_signatures::prelude::SignatureRegistry;

fn counts_as_block(execution: &crate::executor::ProfileExecution) -> bool {
    matches!(
        execution.action,
        crate::executor::ResolvedAction::Block | crate::executor::ResolvedAction::Tarpit { .. } | crate::executor::ResolvedAction::Captcha
    )
}

pub struct MultiProfileRun {
    pub executions: Vec<ProfileExecution>,
    pub aggregated: AggregatedOutcome,
}

/// Ejecuta, en orden de prioridad ascendente de adjunto, cada perfil de
/// defensa resuelto por `profile_lookup`. Cuando `short_circuit` está
/// activo se detiene en el primer perfil cuya acción cuenta como bloqueo,
/// sin evaluar los perfiles restantes (spec §4.L).
pub async fn run_attached_profiles(
    attachments: &VhostDefenseAttachments,
    profile_lookup: impl Fn(&str) -> Option<DefenseProfile>,
    short_circuit: bool,
    context: &RequestContext,
    deps: &DefenseDeps,
    signatures: &SignatureRegistry,
) -> MultiProfileRun {
    let mut ordered = attachments.attachments.clone();
    ordered.sort_by_key(|attachment| attachment.priority);

    let mut executions = Vec::with_capacity(ordered.len());
    let mut weights = Vec::with_capacity(ordered.len());

    for attachment in &ordered {
        let Some(profile) = profile_lookup(&attachment.defense_profile_id) else {
            continue;
        };
        let execution = execute_profile(&profile, context, deps, signatures).await;
        let stop = short_circuit && counts_as_block(&execution);
        weights.push(attachment.weight);
        executions.push(execution);
        if stop {
            break;
        }
    }

    let decision_strategy = attachments.decision_aggregation.unwrap_or(DecisionAggregation::Or);
    let score_strategy = attachments.score_aggregation.unwrap_or(ScoreAggregation::Sum);
    let aggregated = aggregate_executions(&executions, &weights, decision_strategy, score_strategy);

    MultiProfileRun { executions, aggregated }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DefenseDeps;
    use std::collections::HashMap;
    use std::net::IpAddr;
    use std::sync::Arc;
    use waf_core_body_parser::FlatBody;
    use waf_domain_behavioral::prelude::BehavioralEngine;
    use waf_domain_identity_detectors::prelude::{GeoIpDetector, IpReputationDetector};
    use waf_domain_models::prelude::{ActionKind, DefenseNode, DefenseProfileAttachment, DefenseProfileSettings, NodeKind};
    use waf_infra_config_store::prelude::InMemoryConfigStore;

    fn context() -> RequestContext {
        RequestContext {
            defense_profile_id: "multi".into(),
            vhost_id: "vh-1".into(),
            endpoint_id: None,
            client_ip: "1.2.3.4".parse::<IpAddr>().unwrap(),
            headers: HashMap::new(),
            body: FlatBody::new(),
            method: "POST".into(),
            path: "/contact".into(),
            timing_cookie: None,
            now_unix: 1_000,
            fill_duration_seconds: None,
        }
    }

    fn deps() -> DefenseDeps {
        let store: Arc<dyn waf_infra_config_store::prelude::ConfigStoreClient> = Arc::new(InMemoryConfigStore::new());
        DefenseDeps {
            store: store.clone(),
            signatures: Arc::new(SignatureRegistry::new()),
            geoip: Arc::new(GeoIpDetector::inert()),
            ip_reputation: Arc::new(IpReputationDetector::new(reqwest::Client::new())),
            behavioral: Arc::new(BehavioralEngine::new(store)),
        }
    }

    fn allow_profile(id: &str) -> DefenseProfile {
        DefenseProfile {
            id: id.to_string(),
            nodes: vec![
                DefenseNode { id: "start".into(), kind: NodeKind::Start { next: "allow".into() } },
                DefenseNode { id: "allow".into(), kind: NodeKind::Action { action: ActionKind::Allow } },
            ],
            settings: DefenseProfileSettings::default(),
        }
    }

    fn block_profile(id: &str) -> DefenseProfile {
        DefenseProfile {
            id: id.to_string(),
            nodes: vec![
                DefenseNode { id: "start".into(), kind: NodeKind::Start { next: "block".into() } },
                DefenseNode { id: "block".into(), kind: NodeKind::Action { action: ActionKind::Block } },
            ],
            settings: DefenseProfileSettings::default(),
        }
    }

    #[tokio::test]
    async fn short_circuit_stops_before_the_second_profile() {
        let attachments = VhostDefenseAttachments {
            attachments: vec![
                DefenseProfileAttachment { defense_profile_id: "a".into(), priority: 0, weight: 1.0 },
                DefenseProfileAttachment { defense_profile_id: "b".into(), priority: 1, weight: 1.0 },
            ],
            decision_aggregation: Some(DecisionAggregation::Or),
            score_aggregation: Some(ScoreAggregation::Sum),
        };

        let run = run_attached_profiles(
            &attachments,
            |id| if id == "a" { Some(block_profile("a")) } else { Some(allow_profile("b")) },
            true,
            &context(),
            &deps(),
            &SignatureRegistry::new(),
        )
        .await;

        assert_eq!(run.executions.len(), 1);
        assert_eq!(run.aggregated.action, crate::aggregation::AggregatedAction::Block);
    }

    #[tokio::test]
    async fn without_short_circuit_every_attached_profile_runs() {
        let attachments = VhostDefenseAttachments {
            attachments: vec![
                DefenseProfileAttachment { defense_profile_id: "a".into(), priority: 0, weight: 1.0 },
                DefenseProfileAttachment { defense_profile_id: "b".into(), priority: 1, weight: 1.0 },
            ],
            decision_aggregation: Some(DecisionAggregation::And),
            score_aggregation: Some(ScoreAggregation::Sum),
        };

        let run = run_attached_profiles(
            &attachments,
            |id| if id == "a" { Some(block_profile("a")) } else { Some(allow_profile("b")) },
            false,
            &context(),
            &deps(),
            &SignatureRegistry::new(),
        )
        .await;

        assert_eq!(run.executions.len(), 2);
        assert_eq!(run.aggregated.action, crate::aggregation::AggregatedAction::Allow);
    }
}
