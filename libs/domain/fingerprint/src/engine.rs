// [libs/domain/fingerprint/src/engine.rs]
/*!
 * APARATO: FINGERPRINT-PROFILE MATCHER ENGINE (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: ORQUESTACIÓN DE COINCIDENCIA DE PERFILES (spec §4.H)
 */

use crate::hash::{compose_fingerprint_hash, default_recipe};
use crate::headers::RequestHeaders;
use crate::matching::matching_rules_satisfied;
use waf_domain_models::prelude::{FingerprintAction, FingerprintNoMatchPolicy, FingerprintProfile};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FingerprintMatchResult {
    pub fingerprint_hash: String,
    pub score: i64,
    pub blocked: bool,
    pub flags: Vec<String>,
    pub matched_profile_ids: Vec<String>,
}

/// Evalúa los perfiles habilitados en orden ascendente de prioridad y
/// agrega sus acciones según spec §4.H. `profiles` no necesita llegar
/// pre-ordenado; esta función ordena una copia de los índices.
pub fn match_profiles(
    profiles: &[FingerprintProfile],
    headers: &RequestHeaders,
    no_match_policy: FingerprintNoMatchPolicy,
    no_match_score: i64,
) -> FingerprintMatchResult {
    let mut ordered: Vec<&FingerprintProfile> = profiles.iter().filter(|profile| profile.enabled).collect();
    ordered.sort_by_key(|profile| profile.priority);

    let mut result = FingerprintMatchResult::default();
    let mut fingerprint_composed = false;

    for profile in ordered {
        if !matching_rules_satisfied(headers, &profile.matching_rules, profile.mode) {
            continue;
        }

        if !fingerprint_composed {
            result.fingerprint_hash = compose_fingerprint_hash(headers, &profile.recipe);
            fingerprint_composed = true;
        }

        result.matched_profile_ids.push(profile.id.clone());

        match &profile.action {
            FingerprintAction::Block => {
                result.blocked = true;
                result.flags.push(format!("fingerprint:{}:block", profile.id));
                return result;
            }
            FingerprintAction::Flag { score } => {
                result.score += score;
                result.flags.push(format!("fingerprint:{}:flag", profile.id));
            }
            FingerprintAction::Allow | FingerprintAction::Ignore => {}
        }
    }

    if !fingerprint_composed {
        match no_match_policy {
            FingerprintNoMatchPolicy::UseDefault => {
                result.fingerprint_hash = compose_fingerprint_hash(headers, &default_recipe());
            }
            FingerprintNoMatchPolicy::Flag => {
                result.fingerprint_hash = compose_fingerprint_hash(headers, &default_recipe());
                result.score += no_match_score;
                result.flags.push("fingerprint:no_match".to_string());
            }
            FingerprintNoMatchPolicy::Allow => {
                result.fingerprint_hash = compose_fingerprint_hash(headers, &default_recipe());
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use waf_domain_models::prelude::{FingerprintRecipe, HeaderCondition, HeaderConditionKind, MatchMode};

    fn profile(id: &str, priority: i32, action: FingerprintAction) -> FingerprintProfile {
        FingerprintProfile {
            id: id.to_string(),
            priority,
            enabled: true,
            matching_rules: vec![HeaderCondition {
                header_name: "user-agent".into(),
                condition: HeaderConditionKind::Present,
                pattern: None,
            }],
            mode: MatchMode::All,
            recipe: FingerprintRecipe { header_names: vec!["user-agent".into()], normalize: true, max_length_per_value: 64 },
            action,
            rate_limit_override: None,
        }
    }

    fn headers_with_ua() -> RequestHeaders {
        [("user-agent".to_string(), "curl/8.0".to_string())].into_iter().collect::<HashMap<_, _>>()
    }

    #[test]
    fn block_action_short_circuits_remaining_profiles() {
        let profiles = vec![
            profile("blocker", 1, FingerprintAction::Block),
            profile("flagger", 2, FingerprintAction::Flag { score: 15 }),
        ];
        let result = match_profiles(&profiles, &headers_with_ua(), FingerprintNoMatchPolicy::Allow, 0);
        assert!(result.blocked);
        assert_eq!(result.score, 0);
        assert_eq!(result.matched_profile_ids, vec!["blocker".to_string()]);
    }

    #[test]
    fn flag_scores_from_multiple_matching_profiles_sum() {
        let profiles = vec![
            profile("flag-a", 1, FingerprintAction::Flag { score: 10 }),
            profile("flag-b", 2, FingerprintAction::Flag { score: 5 }),
        ];
        let result = match_profiles(&profiles, &headers_with_ua(), FingerprintNoMatchPolicy::Allow, 0);
        assert!(!result.blocked);
        assert_eq!(result.score, 15);
    }

    #[test]
    fn fingerprint_hash_is_composed_from_first_matching_profile_only() {
        let mut first = profile("first", 1, FingerprintAction::Allow);
        first.recipe = FingerprintRecipe { header_names: vec!["user-agent".into()], normalize: false, max_length_per_value: 4 };
        let mut second = profile("second", 2, FingerprintAction::Allow);
        second.recipe = FingerprintRecipe { header_names: vec!["user-agent".into()], normalize: false, max_length_per_value: 64 };

        let result = match_profiles(&[first, second], &headers_with_ua(), FingerprintNoMatchPolicy::Allow, 0);

        let expected = compose_fingerprint_hash(
            &headers_with_ua(),
            &FingerprintRecipe { header_names: vec!["user-agent".into()], normalize: false, max_length_per_value: 4 },
        );
        assert_eq!(result.fingerprint_hash, expected);
    }

    #[test]
    fn no_profile_matches_applies_no_match_policy_flag() {
        let mut unreachable = profile("unreachable", 1, FingerprintAction::Block);
        unreachable.matching_rules = vec![HeaderCondition {
            header_name: "x-never-present".into(),
            condition: HeaderConditionKind::Present,
            pattern: None,
        }];
        let result = match_profiles(&[unreachable], &headers_with_ua(), FingerprintNoMatchPolicy::Flag, 7);
        assert!(!result.blocked);
        assert_eq!(result.score, 7);
        assert!(result.matched_profile_ids.is_empty());
        assert!(!result.fingerprint_hash.is_empty());
    }

    #[test]
    fn no_profile_matches_with_allow_policy_is_inert() {
        let mut unreachable = profile("unreachable", 1, FingerprintAction::Block);
        unreachable.matching_rules = vec![HeaderCondition {
            header_name: "x-never-present".into(),
            condition: HeaderConditionKind::Present,
            pattern: None,
        }];
        let result = match_profiles(&[unreachable], &headers_with_ua(), FingerprintNoMatchPolicy::Allow, 7);
        assert_eq!(result.score, 0);
        assert!(!result.blocked);
    }
}
