// [libs/domain/models/src/endpoint.rs]
/*!
 * APARATO: ENDPOINT MODEL (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN MODEL (ESTRATO L2)
 *
 * Invariante (spec §3): un par ruta/método resuelve a lo sumo un
 * endpoint; los empates se rompen por (menor número de `priority`,
 * luego el tipo de coincidencia más específico: exact > prefix > regex).
 */

use crate::common::{EntityId, KeywordOverrides, Thresholds};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointMatchingRules {
    /// `"*"` coincide con cualquier método.
    pub methods: Vec<String>,
    pub exact_paths: Vec<String>,
    pub path_prefixes: Vec<String>,
    pub path_regex: Vec<String>,
    /// `"*"` coincide con cualquier tipo de contenido.
    pub accepted_content_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPattern {
    pub regex: String,
    pub score: i64,
    pub flag_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchSpecificity {
    Exact = 2,
    Prefix = 1,
    Regex = 0,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: EntityId,
    /// `None` indica un endpoint global, evaluado cuando ningún endpoint
    /// específico del vhost coincide (spec §4.K).
    pub vhost_id: Option<EntityId>,
    pub matching_rules: EndpointMatchingRules,
    pub priority: i32,
    pub enabled: bool,
    pub thresholds: Option<Thresholds>,
    pub keyword_overrides: Option<KeywordOverrides>,
    pub custom_patterns: Vec<CustomPattern>,
    pub disabled_patterns: Vec<String>,
    pub required_fields: Vec<String>,
    pub forbidden_fields: Vec<String>,
    /// Campos excluidos tanto del cálculo de huella de contenido como del
    /// aprendizaje de campos.
    pub ignored_fields: Vec<String>,
    pub content_hash_fields: Vec<String>,
}

impl Endpoint {
    pub fn accepts_method(&self, method: &str) -> bool {
        self.matching_rules.methods.iter().any(|candidate| candidate == "*" || candidate.eq_ignore_ascii_case(method))
    }

    pub fn accepts_content_type(&self, content_type: &str) -> bool {
        if self.matching_rules.accepted_content_types.is_empty() {
            return true;
        }
        self.matching_rules
            .accepted_content_types
            .iter()
            .any(|candidate| candidate == "*" || candidate.eq_ignore_ascii_case(content_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_endpoint() -> Endpoint {
        Endpoint {
            id: "ep-1".into(),
            vhost_id: Some("vh-1".into()),
            matching_rules: EndpointMatchingRules {
                methods: vec!["POST".into()],
                exact_paths: vec!["/login".into()],
                path_prefixes: vec![],
                path_regex: vec![],
                accepted_content_types: vec!["application/json".into()],
            },
            priority: 10,
            enabled: true,
            thresholds: None,
            keyword_overrides: None,
            custom_patterns: vec![],
            disabled_patterns: vec![],
            required_fields: vec![],
            forbidden_fields: vec![],
            ignored_fields: vec![],
            content_hash_fields: vec![],
        }
    }

    #[test]
    fn wildcard_method_accepts_anything() {
        let mut endpoint = sample_endpoint();
        endpoint.matching_rules.methods = vec!["*".into()];
        assert!(endpoint.accepts_method("DELETE"));
    }

    #[test]
    fn empty_accepted_content_types_accepts_anything() {
        let mut endpoint = sample_endpoint();
        endpoint.matching_rules.accepted_content_types.clear();
        assert!(endpoint.accepts_content_type("text/plain"));
    }

    #[test]
    fn explicit_content_type_list_is_case_insensitive() {
        let endpoint = sample_endpoint();
        assert!(endpoint.accepts_content_type("Application/JSON"));
        assert!(!endpoint.accepts_content_type("multipart/form-data"));
    }
}
