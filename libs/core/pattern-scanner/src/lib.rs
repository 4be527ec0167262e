// [libs/core/pattern-scanner/src/lib.rs]
/*!
 * =================================================================
 * APARATO: PATTERN/KEYWORD SCANNER CRATE ROOT (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: CORE UTILITY (ESTRATO L2)
 * RESPONSABILIDAD: ESCANEO COMBINADO DE PALABRAS CLAVE Y REGLAS REGEX
 *
 * VISION HIPER-HOLÍSTICA:
 * El texto combinado de escaneo ya llega en minúsculas desde
 * `waf-core-body-parser` (`FlatBody::combined_scan_text`); este crate
 * no vuelve a normalizar casing salvo donde el propio patrón regex lo
 * requiera para coincidencias que dependan de mayúsculas (ver
 * `excessive_caps`, que opera sobre el texto crudo suministrado aparte).
 * =================================================================
 */

pub mod builtin_rules;
pub mod keyword;

use builtin_rules::{
    BUILTIN_RULES, MANY_URLS_FLAG_PREFIX, MANY_URLS_SCORE_PER_EXTRA, MANY_URLS_THRESHOLD,
    OCCURRENCE_CAP, SHORT_WITH_URL_FLAG, SHORT_WITH_URL_MAX_LENGTH, SHORT_WITH_URL_SCORE, URL_FLAG,
};
pub use keyword::KeywordConfig;
use keyword::{contains_keyword, parse_flagged_entry};

/// Resultado de un escaneo combinado de palabras clave y patrones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanResult {
    pub score: i64,
    pub blocked: Vec<String>,
    pub flagged: Vec<String>,
    /// Cada entrada tiene la forma `"name:count"` (spec §4.D).
    pub pattern_flags: Vec<String>,
}

/// Ejecuta el escaneo de palabras clave y reglas regex sobre el texto
/// combinado ya normalizado a minúsculas, y sobre el texto crudo (para
/// las reglas sensibles a mayúsculas, como `excessive_caps`).
///
/// `raw_scan_text` debe ser la misma concatenación que `lowercased_scan_text`
/// pero antes de aplicar minúsculas, para que `excessive_caps` conserve
/// significado.
pub fn scan(
    lowercased_scan_text: &str,
    raw_scan_text: &str,
    keywords: &KeywordConfig,
) -> ScanResult {
    let mut result = ScanResult::default();

    for blocked_keyword in &keywords.blocked {
        if contains_keyword(lowercased_scan_text, blocked_keyword) {
            result.blocked.push(blocked_keyword.clone());
        }
    }

    for flagged_entry in &keywords.flagged {
        let parsed = parse_flagged_entry(flagged_entry);
        if contains_keyword(lowercased_scan_text, &parsed.keyword) {
            result.flagged.push(parsed.keyword.clone());
            result.score += parsed.score;
        }
    }

    let mut url_occurrence_count = 0usize;

    for rule in BUILTIN_RULES.iter() {
        let haystack = if rule.flag_name == "excessive_caps" { raw_scan_text } else { lowercased_scan_text };
        let occurrence_count = rule.pattern.find_iter(haystack).count();
        if occurrence_count == 0 {
            continue;
        }

        if rule.flag_name == URL_FLAG {
            url_occurrence_count = occurrence_count;
        }

        let capped_count = occurrence_count.min(OCCURRENCE_CAP);
        result.score += rule.weight * capped_count as i64;
        result.pattern_flags.push(format!("{}:{}", rule.flag_name, capped_count));
    }

    if url_occurrence_count > MANY_URLS_THRESHOLD {
        let extra_urls = (url_occurrence_count - MANY_URLS_THRESHOLD) as i64;
        result.score += extra_urls * MANY_URLS_SCORE_PER_EXTRA;
        result.pattern_flags.push(format!("{MANY_URLS_FLAG_PREFIX}:{url_occurrence_count}"));
    }

    if lowercased_scan_text.len() < SHORT_WITH_URL_MAX_LENGTH && url_occurrence_count > 0 {
        result.score += SHORT_WITH_URL_SCORE;
        result.pattern_flags.push(SHORT_WITH_URL_FLAG.to_string());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_keyword_is_reported_without_contributing_to_flagged() {
        let keywords = KeywordConfig { blocked: vec!["spam".into()], flagged: vec![] };
        let result = scan("this is spam content", "this is spam content", &keywords);
        assert_eq!(result.blocked, vec!["spam".to_string()]);
        assert!(result.flagged.is_empty());
    }

    #[test]
    fn flagged_keyword_contributes_its_configured_score() {
        let keywords = KeywordConfig { blocked: vec![], flagged: vec!["casino:40".into()] };
        let result = scan("win big at the casino today", "win big at the casino today", &keywords);
        assert_eq!(result.score, 40);
    }

    #[test]
    fn script_tag_is_detected_and_scored() {
        let keywords = KeywordConfig::default();
        let text = "hello <script>alert(1)</script>";
        let result = scan(text, text, &keywords);
        assert!(result.pattern_flags.contains(&"xss_script:1".to_string()));
        assert_eq!(result.score, 30);
    }

    #[test]
    fn occurrence_count_is_capped_before_scoring() {
        let keywords = KeywordConfig::default();
        let text = "javascript: ".repeat(10);
        let result = scan(&text, &text, &keywords);
        assert!(result.pattern_flags.contains(&"javascript_uri:5".to_string()));
        assert_eq!(result.score, 25 * 5);
    }

    #[test]
    fn many_urls_adds_composite_score_above_threshold() {
        let keywords = KeywordConfig::default();
        let text = "http://a.com http://b.com http://c.com http://d.com http://e.com, visit these sites for amazing deals today only";
        let result = scan(text, text, &keywords);
        assert!(result.pattern_flags.iter().any(|flag| flag.starts_with("many_urls:")));
    }

    #[test]
    fn short_with_url_triggers_on_brief_text_containing_a_url() {
        let keywords = KeywordConfig::default();
        let text = "check http://a.com";
        let result = scan(text, text, &keywords);
        assert!(result.pattern_flags.contains(&"short_with_url".to_string()));
    }

    #[test]
    fn excessive_caps_requires_raw_casing() {
        let keywords = KeywordConfig::default();
        let raw = "PLEASE READ THIS IMPORTANT MESSAGE";
        let lowercased = raw.to_lowercase();
        let result = scan(&lowercased, raw, &keywords);
        assert!(result.pattern_flags.iter().any(|flag| flag.starts_with("excessive_caps:")));
    }
}
