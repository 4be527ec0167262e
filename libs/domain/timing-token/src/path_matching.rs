// [libs/domain/timing-token/src/path_matching.rs]
/*!
 * APARATO: PATH MATCHING HELPER (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 */

use regex::Regex;
use waf_domain_models::prelude::PathMatchMode;

pub fn path_matches_any(mode: PathMatchMode, patterns: &[String], path: &str) -> bool {
    match mode {
        PathMatchMode::Exact => patterns.iter().any(|candidate| candidate == path),
        PathMatchMode::Prefix => patterns.iter().any(|candidate| path.starts_with(candidate.as_str())),
        PathMatchMode::Regex => patterns.iter().any(|candidate| {
            Regex::new(candidate).map(|compiled| compiled.is_match(path)).unwrap_or(false)
        }),
    }
}
