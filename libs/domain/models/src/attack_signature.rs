// [libs/domain/models/src/attack_signature.rs]
/*!
 * APARATO: ATTACK SIGNATURE MODEL (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN MODEL (ESTRATO L2)
 *
 * Una firma nombra, por tipo de defensa, un parche de configuración
 * aditivo. La fusión `node_config ⊕ attached_signatures_patches` vive en
 * `waf-domain-signatures`; este crate modela únicamente la forma de los
 * datos (spec §3/§4.E).
 */

use crate::defense_profile::DefenseType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope")]
pub enum SignatureAttachmentScope {
    Global,
    Profile { defense_profile_id: String },
    DefenseNode { defense_profile_id: String, node_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureAttachment {
    pub scope: SignatureAttachmentScope,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackSignature {
    pub id: String,
    pub priority: i32,
    pub enabled: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    /// Parche de configuración aditivo por tipo de defensa.
    pub config_patches: HashMap<DefenseType, serde_json::Value>,
    pub attachments: Vec<SignatureAttachment>,
}

impl AttackSignature {
    pub fn is_active_at(&self, reference_time: DateTime<Utc>) -> bool {
        self.enabled && self.expires_at.map(|expiry| expiry > reference_time).unwrap_or(true)
    }
}

/// Estadísticas acumuladas por par (firma, tipo de defensa), actualizadas
/// atómicamente en cada coincidencia (spec §4.E).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignatureDefenseStats {
    pub total_matches: u64,
    pub last_match_at: Option<DateTime<Utc>>,
    /// Histograma por subtipo de coincidencia (p.ej. nombre de bandera).
    pub histogram: HashMap<String, u64>,
}

impl SignatureDefenseStats {
    pub fn record_match(&mut self, histogram_key: &str, observed_at: DateTime<Utc>) {
        self.total_matches += 1;
        self.last_match_at = Some(observed_at);
        *self.histogram.entry(histogram_key.to_string()).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn expired_signature_is_not_active() {
        let now = Utc::now();
        let signature = AttackSignature {
            id: "sig-1".into(),
            priority: 0,
            enabled: true,
            expires_at: Some(now - Duration::seconds(1)),
            tags: vec![],
            config_patches: HashMap::new(),
            attachments: vec![],
        };
        assert!(!signature.is_active_at(now));
    }

    #[test]
    fn disabled_signature_is_never_active_even_without_expiry() {
        let now = Utc::now();
        let signature = AttackSignature {
            id: "sig-2".into(),
            priority: 0,
            enabled: false,
            expires_at: None,
            tags: vec![],
            config_patches: HashMap::new(),
            attachments: vec![],
        };
        assert!(!signature.is_active_at(now));
    }

    #[test]
    fn stats_histogram_accumulates_per_key() {
        let mut stats = SignatureDefenseStats::default();
        stats.record_match("blocked_keyword", Utc::now());
        stats.record_match("blocked_keyword", Utc::now());
        assert_eq!(stats.total_matches, 2);
        assert_eq!(stats.histogram.get("blocked_keyword"), Some(&2));
    }
}
