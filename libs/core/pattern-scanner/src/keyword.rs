// [libs/core/pattern-scanner/src/keyword.rs]
/*!
 * APARATO: KEYWORD MATCHER (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: CORE UTILITY (ESTRATO L2)
 * RESPONSABILIDAD: PERTENENCIA DE PALABRAS CLAVE CON SEMÁNTICA DE LÍMITE DE PALABRA
 */

use serde::{Deserialize, Serialize};

/// Puntuación por defecto de una palabra clave marcada (flagged) sin
/// sufijo `:score` explícito (spec §4.D).
pub const DEFAULT_FLAGGED_SCORE: i64 = 10;

/// Configuración de palabras clave bloqueadas/marcadas.
///
/// Las entradas marcadas aceptan la sintaxis `keyword:score`; la
/// ausencia de sufijo asume [`DEFAULT_FLAGGED_SCORE`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordConfig {
    pub blocked: Vec<String>,
    pub flagged: Vec<String>,
}

pub struct FlaggedKeyword {
    pub keyword: String,
    pub score: i64,
}

pub fn parse_flagged_entry(entry: &str) -> FlaggedKeyword {
    match entry.rsplit_once(':') {
        Some((keyword, score_text)) => match score_text.trim().parse::<i64>() {
            Ok(score) => FlaggedKeyword { keyword: keyword.to_string(), score },
            Err(_) => FlaggedKeyword { keyword: entry.to_string(), score: DEFAULT_FLAGGED_SCORE },
        },
        None => FlaggedKeyword { keyword: entry.to_string(), score: DEFAULT_FLAGGED_SCORE },
    }
}

/// `true` si `keyword` aparece en `lowercased_haystack` respetando límites
/// de palabra (las coincidencias parciales dentro de otra palabra no cuentan).
pub fn contains_keyword(lowercased_haystack: &str, keyword: &str) -> bool {
    let needle = keyword.to_lowercase();
    if needle.is_empty() {
        return false;
    }

    let mut search_from = 0usize;
    while let Some(relative_offset) = lowercased_haystack[search_from..].find(needle.as_str()) {
        let match_start = search_from + relative_offset;
        let match_end = match_start + needle.len();

        let left_is_boundary = lowercased_haystack[..match_start]
            .chars()
            .next_back()
            .map(|ch| !ch.is_alphanumeric())
            .unwrap_or(true);
        let right_is_boundary = lowercased_haystack[match_end..]
            .chars()
            .next()
            .map(|ch| !ch.is_alphanumeric())
            .unwrap_or(true);

        if left_is_boundary && right_is_boundary {
            return true;
        }

        search_from = match_start + 1;
        if search_from >= lowercased_haystack.len() {
            break;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_boundary_excludes_partial_matches() {
        assert!(!contains_keyword("classic literature", "ass"));
        assert!(contains_keyword("you are an ass today", "ass"));
    }

    #[test]
    fn flagged_entry_parses_explicit_score() {
        let parsed = parse_flagged_entry("viagra:50");
        assert_eq!(parsed.keyword, "viagra");
        assert_eq!(parsed.score, 50);
    }

    #[test]
    fn flagged_entry_without_score_uses_default() {
        let parsed = parse_flagged_entry("casino");
        assert_eq!(parsed.keyword, "casino");
        assert_eq!(parsed.score, DEFAULT_FLAGGED_SCORE);
    }
}
