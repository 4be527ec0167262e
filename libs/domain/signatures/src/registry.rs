// [libs/domain/signatures/src/registry.rs]
/*!
 * APARATO: ATTACK SIGNATURE REGISTRY (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: SELECCIÓN Y ACUMULACIÓN DE PARCHES DE FIRMAS ACTIVAS (spec §4.E)
 */

use crate::merge::merge_config;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::Value;
use waf_domain_models::prelude::{AttackSignature, DefenseType, SignatureAttachmentScope};

#[derive(Default)]
pub struct SignatureRegistry {
    signatures: DashMap<String, AttackSignature>,
}

impl SignatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, signature: AttackSignature) {
        self.signatures.insert(signature.id.clone(), signature);
    }

    pub fn remove(&self, signature_id: &str) {
        self.signatures.remove(signature_id);
    }

    pub fn get(&self, signature_id: &str) -> Option<AttackSignature> {
        self.signatures.get(signature_id).map(|entry| entry.clone())
    }

    pub fn list(&self) -> Vec<AttackSignature> {
        self.signatures.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Firmas activas (habilitadas, no expiradas) cuyo alcance aplica al
    /// sitio de ejecución dado, ordenadas por prioridad ascendente y luego
    /// por id para desempate determinista.
    fn applicable_signatures(
        &self,
        defense_profile_id: &str,
        node_id: &str,
    ) -> Vec<AttackSignature> {
        let now = Utc::now();
        let mut matches: Vec<AttackSignature> = self
            .signatures
            .iter()
            .filter(|entry| entry.value().is_active_at(now))
            .filter(|entry| {
                entry.value().attachments.iter().any(|attachment| {
                    attachment.enabled
                        && match &attachment.scope {
                            SignatureAttachmentScope::Global => true,
                            SignatureAttachmentScope::Profile { defense_profile_id: scoped_profile } => {
                                scoped_profile == defense_profile_id
                            }
                            SignatureAttachmentScope::DefenseNode { defense_profile_id: scoped_profile, node_id: scoped_node } => {
                                scoped_profile == defense_profile_id && scoped_node == node_id
                            }
                        }
                })
            })
            .map(|entry| entry.value().clone())
            .collect();

        matches.sort_by(|left, right| left.priority.cmp(&right.priority).then_with(|| left.id.cmp(&right.id)));
        matches
    }

    /// Configuración efectiva de un nodo de defensa: `node_config ⊕
    /// parches de todas las firmas activas que aplican a este sitio`, en
    /// orden de prioridad ascendente.
    pub fn effective_config(
        &self,
        defense_type: DefenseType,
        defense_profile_id: &str,
        node_id: &str,
        node_config: &Value,
    ) -> Value {
        let mut effective = node_config.clone();
        for signature in self.applicable_signatures(defense_profile_id, node_id) {
            if let Some(patch) = signature.config_patches.get(&defense_type) {
                effective = merge_config(&effective, patch);
            }
        }
        effective
    }

    /// Ids de las firmas que efectivamente contribuyeron un parche a este
    /// sitio, en el mismo orden usado por [`effective_config`] — útil para
    /// atribuir estadísticas tras una coincidencia.
    pub fn contributing_signature_ids(
        &self,
        defense_type: DefenseType,
        defense_profile_id: &str,
        node_id: &str,
    ) -> Vec<String> {
        self.applicable_signatures(defense_profile_id, node_id)
            .into_iter()
            .filter(|signature| signature.config_patches.contains_key(&defense_type))
            .map(|signature| signature.id)
            .collect()
    }
}
