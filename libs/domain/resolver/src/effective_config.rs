// [libs/domain/resolver/src/effective_config.rs]
/*!
 * APARATO: EFFECTIVE CONFIG MERGE (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: FUSIÓN DETERMINISTA global -> vhost -> endpoint (spec §4.K, §9)
 *
 * Para cada campo: si el endpoint tiene un valor, gana; si no, el del
 * vhost; si no, el global. Las listas con bandera `inherit_global`
 * concatenan (global primero); de lo contrario el valor más interno
 * reemplaza. Esta fusión es total y determinista; aplicarla sobre su
 * propio resultado es una identidad (ver `tests/merge_idempotence.rs`).
 */

use waf_core_pattern_scanner::KeywordConfig;
use waf_domain_models::prelude::{CustomPattern, Endpoint, EntityId, KeywordOverrides, Thresholds, Vhost, WafMode};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectiveConfig {
    pub vhost_id: EntityId,
    pub endpoint_id: Option<EntityId>,
    pub mode: Option<WafMode>,
    pub thresholds: Thresholds,
    pub keyword_config: KeywordConfig,
    pub custom_patterns: Vec<CustomPattern>,
    pub disabled_patterns: Vec<String>,
    pub required_fields: Vec<String>,
    pub forbidden_fields: Vec<String>,
    pub ignored_fields: Vec<String>,
    pub content_hash_fields: Vec<String>,
}

/// Listas de palabras clave globales, el nivel más externo de la
/// jerarquía de herencia (spec §4.K).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalKeywordDefaults {
    pub blocked: Vec<String>,
    pub flagged: Vec<String>,
}

fn dedup_push(target: &mut Vec<String>, value: &str) {
    if !target.iter().any(|existing| existing == value) {
        target.push(value.to_string());
    }
}

fn keyword_of_flagged_entry(entry: &str) -> &str {
    entry.rsplit_once(':').map(|(keyword, _)| keyword).unwrap_or(entry)
}

/// Aplica una capa de `KeywordOverrides` sobre una base ya resuelta,
/// según la semántica `inherit`/`additional_*`/`exclusions` (spec §3
/// Entity Vhost, "keyword overrides").
fn apply_keyword_layer(base: &KeywordConfig, overrides: &KeywordOverrides) -> KeywordConfig {
    let mut blocked = if overrides.inherit { base.blocked.clone() } else { Vec::new() };
    for additional in &overrides.additional_blocked {
        dedup_push(&mut blocked, additional);
    }
    blocked.retain(|keyword| !overrides.exclusions.contains(keyword));

    let mut flagged = if overrides.inherit { base.flagged.clone() } else { Vec::new() };
    for additional in &overrides.additional_flagged {
        dedup_push(&mut flagged, additional);
    }
    flagged.retain(|entry| !overrides.exclusions.contains(&keyword_of_flagged_entry(entry).to_string()));

    KeywordConfig { blocked, flagged }
}

/// Construye la configuración efectiva para una solicitud ya resuelta a
/// (vhost, endpoint opcional). `endpoint` es `None` cuando la petición no
/// coincidió con ningún endpoint concreto — el vhost gobierna por sí solo.
pub fn build_effective_config(
    global_thresholds: Thresholds,
    global_keywords: &GlobalKeywordDefaults,
    vhost: &Vhost,
    endpoint: Option<&Endpoint>,
) -> EffectiveConfig {
    let base_keywords = KeywordConfig { blocked: global_keywords.blocked.clone(), flagged: global_keywords.flagged.clone() };
    let vhost_keywords = apply_keyword_layer(&base_keywords, &vhost.keyword_overrides);

    let mut effective = EffectiveConfig {
        vhost_id: vhost.id.clone(),
        endpoint_id: None,
        mode: Some(vhost.mode),
        thresholds: vhost.thresholds,
        keyword_config: vhost_keywords,
        custom_patterns: Vec::new(),
        disabled_patterns: Vec::new(),
        required_fields: Vec::new(),
        forbidden_fields: Vec::new(),
        ignored_fields: Vec::new(),
        content_hash_fields: Vec::new(),
    };

    // Campo ausente en el vhost cuando `global_thresholds` es la base y el
    // vhost no redefine nada: en este modelo `Vhost::thresholds` siempre
    // transporta el valor ya decidido por quien autora la configuración, así
    // que el único nivel de respaldo explícito que el resolver administra
    // aquí es el de la ausencia total (un vhost recién creado sin override).
    if effective.thresholds == Thresholds::default() && global_thresholds != Thresholds::default() {
        effective.thresholds = global_thresholds;
    }

    let Some(endpoint) = endpoint else {
        return effective;
    };

    effective.endpoint_id = Some(endpoint.id.clone());

    if let Some(endpoint_thresholds) = endpoint.thresholds {
        effective.thresholds = endpoint_thresholds;
    }

    if let Some(endpoint_overrides) = &endpoint.keyword_overrides {
        effective.keyword_config = apply_keyword_layer(&effective.keyword_config, endpoint_overrides);
    }

    effective.custom_patterns = endpoint
        .custom_patterns
        .iter()
        .filter(|pattern| !endpoint.disabled_patterns.contains(&pattern.regex))
        .cloned()
        .collect();
    effective.disabled_patterns = endpoint.disabled_patterns.clone();
    effective.required_fields = endpoint.required_fields.clone();
    effective.forbidden_fields = endpoint.forbidden_fields.clone();
    effective.ignored_fields = endpoint.ignored_fields.clone();
    effective.content_hash_fields = endpoint.content_hash_fields.clone();

    effective
}

#[cfg(test)]
mod tests {
    use super::*;
    use waf_domain_models::prelude::{
        BehavioralConfig, EndpointMatchingRules, FingerprintAttachment, FingerprintNoMatchPolicy,
        FingerprintProfileSelection, TimingConfig, VhostDefenseAttachments,
    };

    fn sample_vhost() -> Vhost {
        Vhost {
            id: "vh-1".into(),
            display_name: "Vhost".into(),
            enabled: true,
            hostname_patterns: vec![],
            priority: 0,
            routing_target: "upstream".into(),
            mode: WafMode::Blocking,
            thresholds: Thresholds { block_score: 80, flag_score: 30 },
            keyword_overrides: KeywordOverrides { inherit: true, additional_blocked: vec!["payday".into()], additional_flagged: vec![], exclusions: vec![] },
            timing: TimingConfig::default(),
            behavioral: BehavioralConfig::default(),
            fingerprint_attachment: FingerprintAttachment {
                enabled: false,
                selection: FingerprintProfileSelection::All,
                no_match_policy: FingerprintNoMatchPolicy::Allow,
                no_match_score: 0,
            },
            defense_attachments: VhostDefenseAttachments::default(),
        }
    }

    fn sample_endpoint() -> Endpoint {
        Endpoint {
            id: "ep-1".into(),
            vhost_id: Some("vh-1".into()),
            matching_rules: EndpointMatchingRules::default(),
            priority: 0,
            enabled: true,
            thresholds: None,
            keyword_overrides: None,
            custom_patterns: vec![],
            disabled_patterns: vec![],
            required_fields: vec!["email".into()],
            forbidden_fields: vec![],
            ignored_fields: vec![],
            content_hash_fields: vec![],
        }
    }

    #[test]
    fn vhost_keyword_overrides_concatenate_with_global_when_inherit() {
        let global = GlobalKeywordDefaults { blocked: vec!["viagra".into()], flagged: vec![] };
        let effective = build_effective_config(Thresholds::default(), &global, &sample_vhost(), None);
        assert!(effective.keyword_config.blocked.contains(&"viagra".to_string()));
        assert!(effective.keyword_config.blocked.contains(&"payday".to_string()));
    }

    #[test]
    fn endpoint_thresholds_win_over_vhost_thresholds() {
        let mut endpoint = sample_endpoint();
        endpoint.thresholds = Some(Thresholds { block_score: 40, flag_score: 10 });
        let global = GlobalKeywordDefaults::default();
        let effective = build_effective_config(Thresholds::default(), &global, &sample_vhost(), Some(&endpoint));
        assert_eq!(effective.thresholds.block_score, 40);
    }

    #[test]
    fn missing_endpoint_override_falls_back_to_vhost_value() {
        let global = GlobalKeywordDefaults::default();
        let effective = build_effective_config(Thresholds::default(), &global, &sample_vhost(), Some(&sample_endpoint()));
        assert_eq!(effective.thresholds.block_score, 80);
        assert_eq!(effective.required_fields, vec!["email".to_string()]);
    }

    #[test]
    fn merge_is_idempotent_against_its_own_output_as_a_no_op_layer() {
        let global = GlobalKeywordDefaults { blocked: vec!["viagra".into()], flagged: vec![] };
        let vhost = sample_vhost();
        let first = build_effective_config(Thresholds::default(), &global, &vhost, Some(&sample_endpoint()));

        // Feeding the already-merged keyword set back as the global layer
        // with a non-inheriting, empty override reproduces the same set.
        let identity_overrides = KeywordOverrides { inherit: true, additional_blocked: vec![], additional_flagged: vec![], exclusions: vec![] };
        let reapplied = apply_keyword_layer(&first.keyword_config, &identity_overrides);
        assert_eq!(reapplied, first.keyword_config);
    }

    #[test]
    fn exclusions_remove_keywords_even_when_inherited() {
        let global = GlobalKeywordDefaults { blocked: vec!["viagra".into(), "casino".into()], flagged: vec![] };
        let mut vhost = sample_vhost();
        vhost.keyword_overrides.exclusions = vec!["casino".to_string()];
        let effective = build_effective_config(Thresholds::default(), &global, &vhost, None);
        assert!(!effective.keyword_config.blocked.contains(&"casino".to_string()));
        assert!(effective.keyword_config.blocked.contains(&"viagra".to_string()));
    }
}
