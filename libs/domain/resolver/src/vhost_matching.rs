// [libs/domain/resolver/src/vhost_matching.rs]
/*!
 * APARATO: VHOST HOSTNAME MATCHER (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: RESOLUCIÓN DE HOST -> VHOST CON PRECEDENCIA (spec §4.K)
 *
 * Orden de intento: coincidencia exacta, luego sufijo comodín
 * (`*.example.com` coincide con `foo.example.com` pero no con
 * `example.com`), luego patrones regex, finalmente `_default`. Ante
 * colisión dentro de un mismo nivel, gana la menor `priority`, empates
 * por `id` (spec §3, invariante de unicidad de patrón de hostname).
 */

use regex::Regex;
use waf_domain_models::prelude::{HostnamePattern, Vhost};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VhostMatchType {
    Exact,
    WildcardSuffix,
    Regex,
    Default,
}

impl VhostMatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VhostMatchType::Exact => "exact",
            VhostMatchType::WildcardSuffix => "wildcard_suffix",
            VhostMatchType::Regex => "regex",
            VhostMatchType::Default => "default",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedVhost<'a> {
    pub vhost: &'a Vhost,
    pub match_type: VhostMatchType,
}

fn wildcard_suffix_matches(suffix: &str, host: &str) -> bool {
    let suffix = suffix.trim_start_matches("*.").to_ascii_lowercase();
    host != suffix && host.ends_with(&format!(".{suffix}"))
}

fn regex_matches(pattern: &str, host: &str) -> bool {
    Regex::new(pattern).map(|compiled| compiled.is_match(host)).unwrap_or(false)
}

fn tier_candidates<'a>(
    vhosts: &[&'a Vhost],
    host: &str,
    matches: impl Fn(&HostnamePattern, &str) -> bool,
) -> Vec<&'a Vhost> {
    vhosts
        .iter()
        .copied()
        .filter(|vhost| vhost.hostname_patterns.iter().any(|pattern| matches(pattern, host)))
        .collect()
}

fn pick_lowest_priority<'a>(mut candidates: Vec<&'a Vhost>) -> Option<&'a Vhost> {
    candidates.sort_by(|left, right| left.priority.cmp(&right.priority).then_with(|| left.id.cmp(&right.id)));
    candidates.into_iter().next()
}

/// Resuelve el vhost responsable de `host`. Retorna `None` solo cuando
/// ningún vhost habilitado coincide y tampoco existe `_default`
/// (condición de configuración rota; el llamador decide cómo degradar).
pub fn resolve_vhost<'a>(host: &str, vhosts: &'a [Vhost]) -> Option<ResolvedVhost<'a>> {
    let host_lower = host.to_ascii_lowercase();
    let enabled: Vec<&Vhost> = vhosts.iter().filter(|vhost| vhost.enabled).collect();

    let exact = tier_candidates(&enabled, &host_lower, |pattern, host| match pattern {
        HostnamePattern::Exact(value) => value.eq_ignore_ascii_case(host),
        _ => false,
    });
    if let Some(vhost) = pick_lowest_priority(exact) {
        return Some(ResolvedVhost { vhost, match_type: VhostMatchType::Exact });
    }

    let wildcard = tier_candidates(&enabled, &host_lower, |pattern, host| match pattern {
        HostnamePattern::WildcardSuffix(suffix) => wildcard_suffix_matches(suffix, host),
        _ => false,
    });
    if let Some(vhost) = pick_lowest_priority(wildcard) {
        return Some(ResolvedVhost { vhost, match_type: VhostMatchType::WildcardSuffix });
    }

    let regex_matched = tier_candidates(&enabled, &host_lower, |pattern, host| match pattern {
        HostnamePattern::Regex(expr) => regex_matches(expr, host),
        _ => false,
    });
    if let Some(vhost) = pick_lowest_priority(regex_matched) {
        return Some(ResolvedVhost { vhost, match_type: VhostMatchType::Regex });
    }

    enabled
        .into_iter()
        .find(|vhost| vhost.is_fallback_default())
        .map(|vhost| ResolvedVhost { vhost, match_type: VhostMatchType::Default })
}
