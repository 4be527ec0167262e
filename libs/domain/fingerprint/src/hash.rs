// [libs/domain/fingerprint/src/hash.rs]
/*!
 * APARATO: FINGERPRINT HASH COMPOSER (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: HASH ESTABLE DE CLIENTE A PARTIR DE CABECERAS (spec §4.H, #7)
 */

use crate::headers::{header_value, RequestHeaders};
use sha2::{Digest, Sha256};
use waf_domain_models::prelude::FingerprintRecipe;

/// Receta por defecto usada cuando `no_match_policy = use_default` (spec §9,
/// Open Question): no hay una receta por defecto fijada por la fuente
/// original, así que esta es una decisión de implementación documentada.
pub fn default_recipe() -> FingerprintRecipe {
    FingerprintRecipe {
        header_names: vec!["user-agent".to_string(), "accept-language".to_string(), "accept-encoding".to_string()],
        normalize: true,
        max_length_per_value: 256,
    }
}

pub fn compose_fingerprint_hash(headers: &RequestHeaders, recipe: &FingerprintRecipe) -> String {
    let mut hasher = Sha256::new();

    for (index, header_name) in recipe.header_names.iter().enumerate() {
        if index > 0 {
            hasher.update([0u8]);
        }

        let raw_value = header_value(headers, header_name).unwrap_or("");
        let truncated: String = raw_value.chars().take(recipe.max_length_per_value).collect();

        if recipe.normalize {
            let normalized = truncated.to_ascii_lowercase();
            let collapsed = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
            hasher.update(collapsed.as_bytes());
        } else {
            hasher.update(truncated.as_bytes());
        }
    }

    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn identical_headers_yield_identical_hash() {
        let recipe = default_recipe();
        let headers: RequestHeaders = [("user-agent".to_string(), "Mozilla/5.0".to_string())].into_iter().collect::<HashMap<_, _>>();
        assert_eq!(compose_fingerprint_hash(&headers, &recipe), compose_fingerprint_hash(&headers, &recipe));
    }

    #[test]
    fn normalization_makes_case_and_whitespace_variants_collide() {
        let recipe = FingerprintRecipe { header_names: vec!["user-agent".into()], normalize: true, max_length_per_value: 256 };
        let a: RequestHeaders = [("user-agent".to_string(), "Mozilla  5.0".to_string())].into_iter().collect::<HashMap<_, _>>();
        let b: RequestHeaders = [("user-agent".to_string(), "mozilla 5.0".to_string())].into_iter().collect::<HashMap<_, _>>();
        assert_eq!(compose_fingerprint_hash(&a, &recipe), compose_fingerprint_hash(&b, &recipe));
    }

    #[test]
    fn missing_header_does_not_panic_and_contributes_empty_value() {
        let recipe = FingerprintRecipe { header_names: vec!["x-does-not-exist".into()], normalize: false, max_length_per_value: 32 };
        let headers: RequestHeaders = HashMap::new();
        let hash = compose_fingerprint_hash(&headers, &recipe);
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn values_longer_than_max_length_are_truncated_before_hashing() {
        let recipe_short = FingerprintRecipe { header_names: vec!["user-agent".into()], normalize: false, max_length_per_value: 4 };
        let headers_a: RequestHeaders = [("user-agent".to_string(), "abcdXXXX".to_string())].into_iter().collect::<HashMap<_, _>>();
        let headers_b: RequestHeaders = [("user-agent".to_string(), "abcdYYYY".to_string())].into_iter().collect::<HashMap<_, _>>();
        assert_eq!(compose_fingerprint_hash(&headers_a, &recipe_short), compose_fingerprint_hash(&headers_b, &recipe_short));
    }
}
