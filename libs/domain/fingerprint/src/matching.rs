// [libs/domain/fingerprint/src/matching.rs]
/*!
 * APARATO: HEADER CONDITION MATCHER (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: EVALUACIÓN DE CONDICIONES DE CABECERA (spec §3, §4.H)
 */

use crate::headers::{header_value, RequestHeaders};
use regex::Regex;
use waf_domain_models::prelude::{HeaderCondition, HeaderConditionKind, MatchMode};

fn evaluate_condition(headers: &RequestHeaders, condition: &HeaderCondition) -> bool {
    let value = header_value(headers, &condition.header_name);

    match condition.condition {
        HeaderConditionKind::Present => value.is_some(),
        HeaderConditionKind::Absent => value.is_none(),
        HeaderConditionKind::Matches => match (value, &condition.pattern) {
            (Some(actual), Some(pattern)) => {
                Regex::new(pattern).map(|compiled| compiled.is_match(actual)).unwrap_or(false)
            }
            _ => false,
        },
        HeaderConditionKind::NotMatches => match (value, &condition.pattern) {
            (Some(actual), Some(pattern)) => {
                Regex::new(pattern).map(|compiled| !compiled.is_match(actual)).unwrap_or(true)
            }
            (None, _) => true,
            (Some(_), None) => true,
        },
    }
}

pub fn matching_rules_satisfied(headers: &RequestHeaders, rules: &[HeaderCondition], mode: MatchMode) -> bool {
    if rules.is_empty() {
        return true;
    }

    match mode {
        MatchMode::All => rules.iter().all(|rule| evaluate_condition(headers, rule)),
        MatchMode::Any => rules.iter().any(|rule| evaluate_condition(headers, rule)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn headers_with(pairs: &[(&str, &str)]) -> RequestHeaders {
        pairs.iter().map(|(k, v)| (k.to_ascii_lowercase(), v.to_string())).collect::<HashMap<_, _>>()
    }

    #[test]
    fn present_condition_requires_header_to_exist() {
        let headers = headers_with(&[("x-requested-with", "xmlhttprequest")]);
        let rule = HeaderCondition { header_name: "x-requested-with".into(), condition: HeaderConditionKind::Present, pattern: None };
        assert!(matching_rules_satisfied(&headers, &[rule], MatchMode::All));
    }

    #[test]
    fn absent_condition_requires_header_to_be_missing() {
        let headers = headers_with(&[]);
        let rule = HeaderCondition { header_name: "x-forwarded-for".into(), condition: HeaderConditionKind::Absent, pattern: None };
        assert!(matching_rules_satisfied(&headers, &[rule], MatchMode::All));
    }

    #[test]
    fn matches_condition_evaluates_pattern_against_value() {
        let headers = headers_with(&[("user-agent", "curl/8.0")]);
        let rule = HeaderCondition { header_name: "user-agent".into(), condition: HeaderConditionKind::Matches, pattern: Some("^curl/".into()) };
        assert!(matching_rules_satisfied(&headers, &[rule], MatchMode::All));
    }

    #[test]
    fn any_mode_passes_when_a_single_rule_matches() {
        let headers = headers_with(&[("user-agent", "curl/8.0")]);
        let rules = vec![
            HeaderCondition { header_name: "x-missing".into(), condition: HeaderConditionKind::Present, pattern: None },
            HeaderCondition { header_name: "user-agent".into(), condition: HeaderConditionKind::Matches, pattern: Some("curl".into()) },
        ];
        assert!(matching_rules_satisfied(&headers, &rules, MatchMode::Any));
    }

    #[test]
    fn all_mode_fails_when_any_rule_fails() {
        let headers = headers_with(&[("user-agent", "curl/8.0")]);
        let rules = vec![
            HeaderCondition { header_name: "user-agent".into(), condition: HeaderConditionKind::Matches, pattern: Some("curl".into()) },
            HeaderCondition { header_name: "x-missing".into(), condition: HeaderConditionKind::Present, pattern: None },
        ];
        assert!(!matching_rules_satisfied(&headers, &rules, MatchMode::All));
    }
}
