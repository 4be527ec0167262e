// [libs/domain/timing-token/src/engine.rs]
/*!
 * APARATO: TIMING-TOKEN ENGINE (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: EMISIÓN/VALIDACIÓN DE COOKIES DE TEMPORIZACIÓN (spec §4.G)
 */

use crate::cookie::{cookie_name, sign_cookie, verify_cookie, TimingCookiePayload};
use crate::path_matching::path_matches_any;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use waf_domain_models::prelude::PathMatchMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingTokenConfig {
    pub cookie_base_name: String,
    pub vhost_id: String,
    /// Secretos aceptados para verificación, el primero es el activo para
    /// firmar; los siguientes son generaciones previas (rotación, spec §4.G).
    pub secrets: Vec<String>,
    pub ttl_seconds: u64,
    pub start_paths: Vec<String>,
    pub end_paths: Vec<String>,
    pub path_match_mode: PathMatchMode,
    pub min_time_block_seconds: f64,
    pub min_time_flag_seconds: f64,
    pub score_no_cookie: i64,
    pub score_too_fast: i64,
    pub score_suspicious: i64,
    pub block_on_too_fast: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingVerdict {
    pub score: i64,
    pub blocked: bool,
    pub flags: Vec<String>,
}

pub struct IssuedCookie {
    pub name: String,
    pub value: String,
}

pub fn is_start_path(config: &TimingTokenConfig, path: &str) -> bool {
    path_matches_any(config.path_match_mode, &config.start_paths, path)
}

pub fn is_end_path(config: &TimingTokenConfig, path: &str) -> bool {
    path_matches_any(config.path_match_mode, &config.end_paths, path)
}

/// Emite una cookie firmada para una solicitud "start" que coincide.
pub fn issue_cookie(config: &TimingTokenConfig, path: &str, now_ms: u64) -> Option<IssuedCookie> {
    let active_secret = config.secrets.first()?;

    let mut nonce_bytes = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = hex::encode(nonce_bytes);

    let payload = TimingCookiePayload {
        start_ts_ms: now_ms,
        vhost_id: config.vhost_id.clone(),
        path: path.to_string(),
        nonce,
    };
    let value = sign_cookie(&payload, active_secret.as_bytes());

    Some(IssuedCookie { name: cookie_name(&config.cookie_base_name, &config.vhost_id), value })
}

/// Valida una solicitud "end": ausencia/invalidez de cookie, tiempo
/// transcurrido demasiado corto, o sospechoso, producen las
/// contribuciones de puntuación descritas en spec §4.G.
pub fn validate_end_request(config: &TimingTokenConfig, cookie_value: Option<&str>, now_ms: u64) -> TimingVerdict {
    let secrets: Vec<Vec<u8>> = config.secrets.iter().map(|secret| secret.as_bytes().to_vec()).collect();

    let Some(payload) = cookie_value.and_then(|value| verify_cookie(value, &secrets)) else {
        return TimingVerdict { score: config.score_no_cookie, blocked: false, flags: vec!["timing:no_cookie".to_string()] };
    };

    let elapsed_seconds = now_ms.saturating_sub(payload.start_ts_ms) as f64 / 1000.0;

    if elapsed_seconds < config.min_time_block_seconds {
        return TimingVerdict {
            score: config.score_too_fast,
            blocked: config.block_on_too_fast,
            flags: vec![format!("timing:too_fast:{elapsed_seconds:.3}")],
        };
    }

    if elapsed_seconds < config.min_time_flag_seconds {
        return TimingVerdict {
            score: config.score_suspicious,
            blocked: false,
            flags: vec![format!("timing:suspicious:{elapsed_seconds:.3}")],
        };
    }

    TimingVerdict::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> TimingTokenConfig {
        TimingTokenConfig {
            cookie_base_name: "waf_timing".into(),
            vhost_id: "vh-1".into(),
            secrets: vec!["secret-v1".into()],
            ttl_seconds: 600,
            start_paths: vec!["/checkout/start".into()],
            end_paths: vec!["/checkout/submit".into()],
            path_match_mode: PathMatchMode::Exact,
            min_time_block_seconds: 2.0,
            min_time_flag_seconds: 5.0,
            score_no_cookie: 30,
            score_too_fast: 50,
            score_suspicious: 10,
            block_on_too_fast: true,
        }
    }

    #[test]
    fn missing_cookie_adds_no_cookie_score() {
        let config = sample_config();
        let verdict = validate_end_request(&config, None, 10_000);
        assert_eq!(verdict.score, 30);
        assert!(!verdict.blocked);
    }

    #[test]
    fn elapsed_below_block_threshold_blocks_when_policy_says_so() {
        let config = sample_config();
        let issued = issue_cookie(&config, "/checkout/start", 1_000).unwrap();
        let verdict = validate_end_request(&config, Some(&issued.value), 1_500);
        assert!(verdict.blocked);
        assert_eq!(verdict.score, 50);
    }

    #[test]
    fn elapsed_between_block_and_flag_threshold_is_only_suspicious() {
        let config = sample_config();
        let issued = issue_cookie(&config, "/checkout/start", 1_000).unwrap();
        let verdict = validate_end_request(&config, Some(&issued.value), 1_000 + 3_500);
        assert!(!verdict.blocked);
        assert_eq!(verdict.score, 10);
    }

    #[test]
    fn elapsed_beyond_flag_threshold_is_clean() {
        let config = sample_config();
        let issued = issue_cookie(&config, "/checkout/start", 1_000).unwrap();
        let verdict = validate_end_request(&config, Some(&issued.value), 1_000 + 6_000);
        assert_eq!(verdict, TimingVerdict::default());
    }

    #[test]
    fn mac_mismatch_is_treated_as_no_cookie() {
        let config = sample_config();
        let verdict = validate_end_request(&config, Some("garbage.ff"), 10_000);
        assert_eq!(verdict.score, config.score_no_cookie);
    }
}
