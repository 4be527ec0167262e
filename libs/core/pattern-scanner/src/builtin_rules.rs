// [libs/core/pattern-scanner/src/builtin_rules.rs]
/*!
 * APARATO: BUILT-IN PATTERN RULE TABLE (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: CORE UTILITY (ESTRATO L2)
 * RESPONSABILIDAD: CATÁLOGO FIJO DE REGLAS REGEX DE DETECCIÓN DE SPAM/ATAQUE
 *
 * Cada regla se identifica por un nombre de bandera estable (`flag_name`)
 * y un peso relativo; el conteo de ocurrencias se limita a
 * [`OCCURRENCE_CAP`] antes de contribuir a la puntuación (spec §4.D).
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Tope de ocurrencias de una misma regla que contribuyen a la puntuación.
pub const OCCURRENCE_CAP: usize = 5;

/// Peso fijo de la regla compuesta `short_with_url` (spec §4.D no fija un
/// valor explícito; ver DESIGN.md para la justificación de este número).
pub const SHORT_WITH_URL_SCORE: i64 = 20;

/// Umbral de longitud del texto combinado (en bytes) para `short_with_url`.
pub const SHORT_WITH_URL_MAX_LENGTH: usize = 100;

/// Umbral de conteo de URLs para activar la regla compuesta `many_urls:N`.
pub const MANY_URLS_THRESHOLD: usize = 3;

/// Peso por URL adicional por encima del umbral de `many_urls:N`.
pub const MANY_URLS_SCORE_PER_EXTRA: i64 = 10;

pub struct BuiltinRule {
    pub flag_name: &'static str,
    pub pattern: &'static Lazy<Regex>,
    pub weight: i64,
}

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)https?://[^\s]+").expect("static regex"));
static BBCODE_URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[url(=[^\]]*)?\]").expect("static regex"));
static HTML_ANCHOR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<a\s+[^>]*href\s*="#).expect("static regex"));
static EMAIL_IN_CONTENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("static regex")
});
static EXCESSIVE_CAPS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z]{10,}").expect("static regex"));
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?\d[\d\-.\s]{7,}\d").expect("static regex"));
static ETH_WALLET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b0x[a-fA-F0-9]{40}\b").expect("static regex"));
static BTC_WALLET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:bc1[a-z0-9]{25,59}|[13][a-km-zA-HJ-NP-Z1-9]{25,34})\b").expect("static regex"));
static REPEATED_CHAR_RUN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(.)\1{4,}").expect("static regex"));
static XSS_SCRIPT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<script").expect("static regex"));
static JAVASCRIPT_URI_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)javascript:").expect("static regex"));
static INLINE_EVENT_HANDLER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bon\w+\s*=").expect("static regex"));

/// Nombre de bandera reservado para la regla compuesta `many_urls:N`.
pub const MANY_URLS_FLAG_PREFIX: &str = "many_urls";
/// Nombre de bandera reservado para la regla compuesta `short_with_url`.
pub const SHORT_WITH_URL_FLAG: &str = "short_with_url";
/// Nombre de bandera de la regla base de detección de URL (reutilizado por las compuestas).
pub const URL_FLAG: &str = "url";

pub static BUILTIN_RULES: Lazy<Vec<BuiltinRule>> = Lazy::new(|| {
    vec![
        BuiltinRule { flag_name: URL_FLAG, pattern: &URL_PATTERN, weight: 10 },
        BuiltinRule { flag_name: "bbcode_url", pattern: &BBCODE_URL_PATTERN, weight: 10 },
        BuiltinRule { flag_name: "html_anchor", pattern: &HTML_ANCHOR_PATTERN, weight: 10 },
        BuiltinRule { flag_name: "email_in_content", pattern: &EMAIL_IN_CONTENT_PATTERN, weight: 5 },
        BuiltinRule { flag_name: "excessive_caps", pattern: &EXCESSIVE_CAPS_PATTERN, weight: 10 },
        BuiltinRule { flag_name: "phone", pattern: &PHONE_PATTERN, weight: 5 },
        BuiltinRule { flag_name: "eth_wallet", pattern: &ETH_WALLET_PATTERN, weight: 15 },
        BuiltinRule { flag_name: "btc_wallet", pattern: &BTC_WALLET_PATTERN, weight: 20 },
        BuiltinRule { flag_name: "repeated_char_run", pattern: &REPEATED_CHAR_RUN_PATTERN, weight: 5 },
        BuiltinRule { flag_name: "xss_script", pattern: &XSS_SCRIPT_PATTERN, weight: 30 },
        BuiltinRule { flag_name: "javascript_uri", pattern: &JAVASCRIPT_URI_PATTERN, weight: 25 },
        BuiltinRule { flag_name: "inline_event_handler", pattern: &INLINE_EVENT_HANDLER_PATTERN, weight: 20 },
    ]
});
