// [libs/domain/resolver/src/endpoint_matching.rs]
/*!
 * APARATO: ENDPOINT MATCHER (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: RESOLUCIÓN DE RUTA/MÉTODO -> ENDPOINT (spec §4.K)
 *
 * Se intenta primero entre los endpoints del vhost resuelto; si ninguno
 * coincide, se reintenta entre los endpoints globales (`vhost_id: None`).
 * Empates: menor número de `priority`, luego el tipo de coincidencia más
 * específico (exact > prefix > regex), spec §3 Entity Endpoint.
 */

use regex::Regex;
use std::cmp::Ordering;
use waf_domain_models::prelude::{Endpoint, MatchSpecificity};

#[derive(Debug, Clone, Copy)]
pub struct ResolvedEndpoint<'a> {
    pub endpoint: &'a Endpoint,
    pub specificity: MatchSpecificity,
}

fn path_specificity(endpoint: &Endpoint, path: &str) -> Option<MatchSpecificity> {
    if endpoint.matching_rules.exact_paths.iter().any(|candidate| candidate == path) {
        return Some(MatchSpecificity::Exact);
    }
    if endpoint.matching_rules.path_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str())) {
        return Some(MatchSpecificity::Prefix);
    }
    if endpoint
        .matching_rules
        .path_regex
        .iter()
        .any(|pattern| Regex::new(pattern).map(|compiled| compiled.is_match(path)).unwrap_or(false))
    {
        return Some(MatchSpecificity::Regex);
    }
    None
}

fn candidate_order(a: &(&Endpoint, MatchSpecificity), b: &(&Endpoint, MatchSpecificity)) -> Ordering {
    a.0.priority.cmp(&b.0.priority).then_with(|| b.1.cmp(&a.1))
}

fn best_candidate<'a>(
    candidates: impl Iterator<Item = &'a Endpoint>,
    method: &str,
    content_type: &str,
    path: &str,
) -> Option<ResolvedEndpoint<'a>> {
    candidates
        .filter(|endpoint| endpoint.enabled && endpoint.accepts_method(method) && endpoint.accepts_content_type(content_type))
        .filter_map(|endpoint| path_specificity(endpoint, path).map(|specificity| (endpoint, specificity)))
        .min_by(candidate_order)
        .map(|(endpoint, specificity)| ResolvedEndpoint { endpoint, specificity })
}

/// Resuelve a lo sumo un endpoint para la tupla (vhost, método, tipo de
/// contenido, ruta). `None` significa: ningún endpoint configurado
/// cubre esta solicitud; el llamador aplica solo la configuración del
/// vhost.
pub fn resolve_endpoint<'a>(
    vhost_id: &str,
    method: &str,
    content_type: &str,
    path: &str,
    endpoints: &'a [Endpoint],
) -> Option<ResolvedEndpoint<'a>> {
    let scoped = endpoints.iter().filter(|endpoint| endpoint.vhost_id.as_deref() == Some(vhost_id));
    if let Some(found) = best_candidate(scoped, method, content_type, path) {
        return Some(found);
    }

    let global = endpoints.iter().filter(|endpoint| endpoint.vhost_id.is_none());
    best_candidate(global, method, content_type, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use waf_domain_models::prelude::EndpointMatchingRules;

    fn endpoint(id: &str, vhost_id: Option<&str>, priority: i32, rules: EndpointMatchingRules) -> Endpoint {
        Endpoint {
            id: id.to_string(),
            vhost_id: vhost_id.map(str::to_string),
            matching_rules: rules,
            priority,
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

    fn rules(exact: &[&str], prefix: &[&str], regex: &[&str]) -> EndpointMatchingRules {
        EndpointMatchingRules {
            methods: vec!["*".into()],
            exact_paths: exact.iter().map(|s| s.to_string()).collect(),
            path_prefixes: prefix.iter().map(|s| s.to_string()).collect(),
            path_regex: regex.iter().map(|s| s.to_string()).collect(),
            accepted_content_types: vec!["*".into()],
        }
    }

    #[test]
    fn vhost_scoped_endpoint_wins_over_global() {
        let endpoints = vec![
            endpoint("global", None, 0, rules(&["/login"], &[], &[])),
            endpoint("scoped", Some("vh-1"), 0, rules(&["/login"], &[], &[])),
        ];
        let resolved = resolve_endpoint("vh-1", "POST", "application/json", "/login", &endpoints).unwrap();
        assert_eq!(resolved.endpoint.id, "scoped");
    }

    #[test]
    fn falls_back_to_global_when_no_vhost_scoped_endpoint_matches() {
        let endpoints = vec![endpoint("global", None, 0, rules(&["/login"], &[], &[]))];
        let resolved = resolve_endpoint("vh-1", "POST", "application/json", "/login", &endpoints).unwrap();
        assert_eq!(resolved.endpoint.id, "global");
    }

    #[test]
    fn exact_path_wins_over_prefix_at_equal_priority() {
        let endpoints = vec![
            endpoint("prefix", Some("vh-1"), 5, rules(&[], &["/api"], &[])),
            endpoint("exact", Some("vh-1"), 5, rules(&["/api/login"], &[], &[])),
        ];
        let resolved = resolve_endpoint("vh-1", "POST", "application/json", "/api/login", &endpoints).unwrap();
        assert_eq!(resolved.endpoint.id, "exact");
    }

    #[test]
    fn lower_priority_number_wins_even_over_less_specific_match() {
        let endpoints = vec![
            endpoint("exact-low-priority-number", Some("vh-1"), 1, rules(&["/api/login"], &[], &[])),
            endpoint("prefix-high-priority-number", Some("vh-1"), 10, rules(&[], &["/api"], &[])),
        ];
        let resolved = resolve_endpoint("vh-1", "POST", "application/json", "/api/login", &endpoints).unwrap();
        assert_eq!(resolved.endpoint.id, "exact-low-priority-number");

        let endpoints_reversed = vec![
            endpoint("exact-high-priority-number", Some("vh-1"), 10, rules(&["/api/login"], &[], &[])),
            endpoint("prefix-low-priority-number", Some("vh-1"), 1, rules(&[], &["/api"], &[])),
        ];
        let resolved = resolve_endpoint("vh-1", "POST", "application/json", "/api/login", &endpoints_reversed).unwrap();
        assert_eq!(resolved.endpoint.id, "prefix-low-priority-number");
    }

    #[test]
    fn method_mismatch_excludes_an_otherwise_matching_endpoint() {
        let mut only_get = rules(&["/login"], &[], &[]);
        only_get.methods = vec!["GET".into()];
        let endpoints = vec![endpoint("get-only", Some("vh-1"), 0, only_get)];
        assert!(resolve_endpoint("vh-1", "POST", "application/json", "/login", &endpoints).is_none());
    }

    #[test]
    fn disabled_endpoint_is_never_matched() {
        let mut disabled = endpoint("disabled", Some("vh-1"), 0, rules(&["/login"], &[], &[]));
        disabled.enabled = false;
        assert!(resolve_endpoint("vh-1", "POST", "application/json", "/login", &[disabled]).is_none());
    }
}
