// [libs/domain/models/src/vhost.rs]
/*!
 * APARATO: VHOST MODEL (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN MODEL (ESTRATO L2)
 *
 * Invariante (spec §3): los patrones de hostname son globalmente únicos
 * entre vhosts habilitados; ante colisión gana la menor `priority`,
 * empates se resuelven por `id`. Este crate modela la entidad; la
 * resolución de colisiones vive en `waf-domain-resolver`.
 */

use crate::common::{EntityId, HostnamePattern, KeywordOverrides, Thresholds, WafMode};
use crate::flow::Flow;
use serde::{Deserialize, Serialize};

pub const DEFAULT_VHOST_ID: &str = "_default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAggregation {
    /// Bloquea si cualquier perfil adjunto decide bloquear.
    Or,
    /// Bloquea solo si todos los perfiles adjuntos deciden bloquear.
    And,
    /// Bloquea si más de la mitad de los perfiles adjuntos deciden bloquear.
    Majority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreAggregation {
    Sum,
    Max,
    WeightedAvg,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    pub enabled: bool,
    pub cookie_base_name: String,
    pub secret_rotation_id: String,
    pub ttl_seconds: u64,
    pub min_time_block_seconds: f64,
    pub min_time_flag_seconds: f64,
    pub score_no_cookie: i64,
    pub score_too_fast: i64,
    pub score_suspicious: i64,
    pub block_on_too_fast: bool,
    pub start_paths: Vec<String>,
    pub end_paths: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehavioralConfig {
    pub enabled: bool,
    pub flows: Vec<Flow>,
    pub learning_period_days: u32,
    pub min_samples: u32,
    pub std_dev_threshold: f64,
    pub policy: crate::flow::BehavioralPolicy,
    pub score_addition: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "profile_ids")]
pub enum FingerprintProfileSelection {
    Ordered(Vec<EntityId>),
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintNoMatchPolicy {
    UseDefault,
    Flag,
    Allow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintAttachment {
    pub enabled: bool,
    pub selection: FingerprintProfileSelection,
    pub no_match_policy: FingerprintNoMatchPolicy,
    pub no_match_score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseProfileAttachment {
    pub defense_profile_id: EntityId,
    pub priority: i32,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VhostDefenseAttachments {
    pub attachments: Vec<DefenseProfileAttachment>,
    pub decision_aggregation: Option<DecisionAggregation>,
    pub score_aggregation: Option<ScoreAggregation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vhost {
    pub id: EntityId,
    pub display_name: String,
    pub enabled: bool,
    pub hostname_patterns: Vec<HostnamePattern>,
    /// Rompe empates de colisión de patrón de hostname entre vhosts
    /// habilitados: la menor prioridad gana (spec §3, Entity Vhost).
    pub priority: i32,
    pub routing_target: String,
    pub mode: WafMode,
    pub thresholds: Thresholds,
    pub keyword_overrides: KeywordOverrides,
    pub timing: TimingConfig,
    pub behavioral: BehavioralConfig,
    pub fingerprint_attachment: FingerprintAttachment,
    pub defense_attachments: VhostDefenseAttachments,
}

impl Vhost {
    pub fn is_fallback_default(&self) -> bool {
        self.id == DEFAULT_VHOST_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vhost_id_is_recognized_as_fallback() {
        let vhost = Vhost {
            id: DEFAULT_VHOST_ID.to_string(),
            display_name: "Default".into(),
            enabled: true,
            hostname_patterns: vec![],
            priority: 0,
            routing_target: "upstream-default".into(),
            mode: WafMode::Monitoring,
            thresholds: Thresholds::default(),
            keyword_overrides: KeywordOverrides::default(),
            timing: TimingConfig::default(),
            behavioral: BehavioralConfig::default(),
            fingerprint_attachment: FingerprintAttachment {
                enabled: false,
                selection: FingerprintProfileSelection::All,
                no_match_policy: FingerprintNoMatchPolicy::Allow,
                no_match_score: 0,
            },
            defense_attachments: VhostDefenseAttachments::default(),
        };
        assert!(vhost.is_fallback_default());
    }
}
