// [apps/edge-gateway/src/legacy_profile.rs]
/*!
 * APARATO: SYNTHETIC LEGACY DEFENSE PROFILE (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: APPLICATION CORE (ESTRATO L1)
 * RESPONSABILIDAD: TRADUCIR `EffectiveConfig` + CAMPOS DE VHOST EN UN
 * `DefenseProfile` EJECUTABLE POR `waf-domain-defense-executor` (spec §4.N, §9)
 *
 * El modo de perfil único heredado no tiene ejecución propia: se modela
 * como un vhost con exactamente un adjunto cuyo id es `legacy`
 * (`waf-domain-defense-executor::multi_profile`, comentario de cabecera).
 * Este módulo construye ese perfil en memoria, nunca persistido, a
 * partir de la jerarquía de herencia ya resuelta por
 * `waf-domain-resolver::build_effective_config` y de los campos propios
 * del vhost (temporización, comportamiento, fingerprint) que no tienen
 * contraparte a nivel de endpoint.
 */

use std::collections::HashMap;
use waf_domain_fingerprint::prelude::RequestHeaders;
use waf_domain_models::prelude::{
    ActionKind, DefaultActionKind, DefenseNode, DefenseProfile, DefenseProfileSettings, DefenseType,
    FingerprintProfile, NodeKind, OperatorOp, PathMatchMode, ThresholdRange, Vhost,
};
use waf_domain_resolver::prelude::EffectiveConfig;
use waf_domain_timing_token::prelude::TimingTokenConfig;

pub const LEGACY_PROFILE_ID: &str = "legacy";

/// Generosamente más alto que el default de 50ms de `DefenseProfileSettings`:
/// el perfil legacy puede encadenar hasta seis detectores en un único paso.
const LEGACY_PROFILE_MAX_EXECUTION_MS: u64 = 200;

/// Puntuaciones por campo ausente/prohibido del nodo `expected_fields`
/// sintetizado. `EffectiveConfig` solo transporta las listas de nombres
/// (spec §4.K); estas puntuaciones no tienen representación en la
/// jerarquía de herencia, así que se fijan aquí (ver DESIGN.md, Open
/// Question "expected fields scoring").
const EXPECTED_FIELD_MISSING_SCORE: i64 = 15;
const EXPECTED_FIELD_FORBIDDEN_SCORE: i64 = 25;

fn timing_token_config(vhost: &Vhost, secrets: &[String]) -> TimingTokenConfig {
    let timing = &vhost.timing;
    TimingTokenConfig {
        cookie_base_name: timing.cookie_base_name.clone(),
        vhost_id: vhost.id.clone(),
        secrets: secrets.to_vec(),
        ttl_seconds: timing.ttl_seconds,
        start_paths: timing.start_paths.clone(),
        end_paths: timing.end_paths.clone(),
        path_match_mode: PathMatchMode::Prefix,
        min_time_block_seconds: timing.min_time_block_seconds,
        min_time_flag_seconds: timing.min_time_flag_seconds,
        score_no_cookie: timing.score_no_cookie,
        score_too_fast: timing.score_too_fast,
        score_suspicious: timing.score_suspicious,
        block_on_too_fast: timing.block_on_too_fast,
    }
}

/// Construye el perfil de defensa sintético `legacy` para un vhost ya
/// resuelto. `timing_secrets` llega vacío cuando el vhost no tiene
/// temporización habilitada o el proceso aún no tiene un secreto activo
/// rotado (en ese caso el nodo `timing_token` se omite de la cadena, no
/// se sintetiza con una lista vacía que degradaría cada solicitud).
pub fn build_legacy_profile(
    effective: &EffectiveConfig,
    vhost: &Vhost,
    timing_secrets: &[String],
    fingerprint_profiles: &[FingerprintProfile],
) -> DefenseProfile {
    let mut chain: Vec<String> = Vec::new();
    if vhost.timing.enabled && !timing_secrets.is_empty() {
        chain.push("timing".to_string());
    }
    chain.push("keyword".to_string());
    chain.push("content_hash".to_string());
    chain.push("expected_fields".to_string());
    if vhost.behavioral.enabled {
        chain.push("behavioral".to_string());
    }
    if vhost.fingerprint_attachment.enabled && !fingerprint_profiles.is_empty() {
        chain.push("fingerprint".to_string());
    }
    chain.push("branch".to_string());

    let mut nodes = Vec::with_capacity(chain.len() + 4);
    nodes.push(DefenseNode { id: "start".to_string(), kind: NodeKind::Start { next: chain[0].clone() } });

    for (index, node_id) in chain.iter().enumerate() {
        if node_id == "branch" {
            continue;
        }
        let next_id = chain.get(index + 1).cloned().unwrap_or_else(|| "allow".to_string());
        let mut outputs = HashMap::new();
        outputs.insert("next".to_string(), next_id);

        let kind = match node_id.as_str() {
            "timing" => {
                outputs.insert("matched".to_string(), "block".to_string());
                NodeKind::Defense {
                    defense_type: DefenseType::TimingToken,
                    config: serde_json::to_value(timing_token_config(vhost, timing_secrets))
                        .expect("TimingTokenConfig always serializes"),
                    outputs,
                }
            }
            "keyword" => {
                outputs.insert("matched".to_string(), "block".to_string());
                NodeKind::Defense {
                    defense_type: DefenseType::KeywordFilter,
                    config: serde_json::to_value(&effective.keyword_config).expect("KeywordConfig always serializes"),
                    outputs,
                }
            }
            "content_hash" => NodeKind::Defense {
                defense_type: DefenseType::ContentHash,
                config: serde_json::json!({ "fields": effective.content_hash_fields }),
                outputs,
            },
            "expected_fields" => NodeKind::Defense {
                defense_type: DefenseType::ExpectedFields,
                config: serde_json::json!({
                    "required": effective.required_fields,
                    "forbidden": effective.forbidden_fields,
                    "score_per_missing": EXPECTED_FIELD_MISSING_SCORE,
                    "score_per_forbidden": EXPECTED_FIELD_FORBIDDEN_SCORE,
                }),
                outputs,
            },
            "behavioral" => NodeKind::Defense {
                defense_type: DefenseType::Behavioral,
                config: serde_json::to_value(&vhost.behavioral).expect("BehavioralConfig always serializes"),
                outputs,
            },
            "fingerprint" => {
                outputs.insert("matched".to_string(), "block".to_string());
                NodeKind::Defense {
                    defense_type: DefenseType::Fingerprint,
                    config: serde_json::json!({
                        "profiles": fingerprint_profiles,
                        "no_match_policy": vhost.fingerprint_attachment.no_match_policy,
                        "no_match_score": vhost.fingerprint_attachment.no_match_score,
                    }),
                    outputs,
                }
            }
            other => unreachable!("legacy profile chain never contains node id {other}"),
        };
        nodes.push(DefenseNode { id: node_id.clone(), kind });
    }

    let mut branch_outputs = HashMap::new();
    branch_outputs.insert("allow_low".to_string(), "allow".to_string());
    branch_outputs.insert("flag_mid".to_string(), "flag".to_string());
    branch_outputs.insert("block_high".to_string(), "block".to_string());
    nodes.push(DefenseNode {
        id: "branch".to_string(),
        kind: NodeKind::Operator {
            op: OperatorOp::ThresholdBranch {
                ranges: vec![
                    ThresholdRange { min: 0.0, max: Some(effective.thresholds.flag_score as f64), output: "allow_low".into() },
                    ThresholdRange {
                        min: effective.thresholds.flag_score as f64,
                        max: Some(effective.thresholds.block_score as f64),
                        output: "flag_mid".into(),
                    },
                    ThresholdRange { min: effective.thresholds.block_score as f64, max: None, output: "block_high".into() },
                ],
            },
            config: serde_json::json!({}),
            inputs: vec![],
            outputs: branch_outputs,
        },
    });

    nodes.push(DefenseNode { id: "allow".to_string(), kind: NodeKind::Action { action: ActionKind::Allow } });
    nodes.push(DefenseNode { id: "flag".to_string(), kind: NodeKind::Action { action: ActionKind::Flag { score: 0 } } });
    nodes.push(DefenseNode { id: "block".to_string(), kind: NodeKind::Action { action: ActionKind::Block } });

    DefenseProfile {
        id: LEGACY_PROFILE_ID.to_string(),
        nodes,
        settings: DefenseProfileSettings { default_action: DefaultActionKind::Allow, max_execution_time_ms: LEGACY_PROFILE_MAX_EXECUTION_MS },
    }
}

/// Construye el mapa de cabeceras normalizado a minúsculas que requieren
/// `waf-domain-fingerprint` y el nodo `timing_token` para inspección de
/// `User-Agent`/cookies.
pub fn normalize_headers<'a>(headers: impl Iterator<Item = (&'a str, &'a str)>) -> RequestHeaders {
    headers.map(|(name, value)| (name.to_ascii_lowercase(), value.to_string())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use waf_domain_models::prelude::{
        BehavioralConfig, FingerprintAttachment, FingerprintNoMatchPolicy, FingerprintProfileSelection, KeywordOverrides,
        Thresholds, TimingConfig, VhostDefenseAttachments, WafMode,
    };

    fn bare_vhost() -> Vhost {
        Vhost {
            id: "vh-1".into(),
            display_name: "Test".into(),
            enabled: true,
            hostname_patterns: vec![],
            priority: 0,
            routing_target: "upstream".into(),
            mode: WafMode::Blocking,
            thresholds: Thresholds::default(),
            keyword_overrides: KeywordOverrides::default(),
            timing: TimingConfig::default(),
            behavioral: BehavioralConfig::default(),
            fingerprint_attachment: FingerprintAttachment {
                enabled: false,
                selection: FingerprintProfileSelection::All,
                no_match_policy: FingerprintNoMatchPolicy::UseDefault,
                no_match_score: 0,
            },
            defense_attachments: VhostDefenseAttachments::default(),
        }
    }

    #[test]
    fn without_optional_features_chain_is_the_four_core_detectors() {
        let effective = EffectiveConfig { vhost_id: "vh-1".into(), ..Default::default() };
        let profile = build_legacy_profile(&effective, &bare_vhost(), &[], &[]);
        let ids: Vec<&str> = profile.nodes.iter().map(|node| node.id.as_str()).collect();
        assert!(ids.contains(&"keyword"));
        assert!(ids.contains(&"content_hash"));
        assert!(ids.contains(&"expected_fields"));
        assert!(ids.contains(&"branch"));
        assert!(!ids.contains(&"timing"));
        assert!(!ids.contains(&"fingerprint"));
        assert!(!ids.contains(&"behavioral"));
    }

    #[test]
    fn timing_secret_present_inserts_timing_node_first() {
        let mut vhost = bare_vhost();
        vhost.timing.enabled = true;
        let effective = EffectiveConfig { vhost_id: "vh-1".into(), ..Default::default() };
        let profile = build_legacy_profile(&effective, &vhost, &["s3cr3t".to_string()], &[]);
        match &profile.start_node().unwrap().kind {
            NodeKind::Start { next } => assert_eq!(next, "timing"),
            _ => panic!("expected start node"),
        }
    }
}
