// [libs/domain/timing-token/src/cookie.rs]
/*!
 * APARATO: TIMING COOKIE CODEC (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: EMPAQUETADO/FIRMA DE LA COOKIE DE TEMPORIZACIÓN (spec §4.G)
 *
 * Formato de valor de cookie: `base64url(payload_json).hex(hmac_sha256)`.
 * Un fallo de autenticación (MAC incoherente) se trata como ausencia de
 * cookie, nunca como un error distinto (spec §4.G).
 */

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingCookiePayload {
    pub start_ts_ms: u64,
    pub vhost_id: String,
    pub path: String,
    pub nonce: String,
}

pub fn cookie_name(base_name: &str, vhost_id: &str) -> String {
    format!("{base_name}_{vhost_id}")
}

pub fn sign_cookie(payload: &TimingCookiePayload, secret: &[u8]) -> String {
    let payload_json = serde_json::to_vec(payload).expect("timing cookie payload always serializes");
    let encoded_payload = URL_SAFE_NO_PAD.encode(&payload_json);

    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(encoded_payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    format!("{encoded_payload}.{signature}")
}

/// Verifica y decodifica una cookie. Cualquier fallo — codificación
/// inválida, JSON malformado, o MAC incoherente — retorna `None`, que el
/// motor trata exactamente como "sin cookie".
pub fn verify_cookie(cookie_value: &str, secrets: &[Vec<u8>]) -> Option<TimingCookiePayload> {
    let (encoded_payload, signature_hex) = cookie_value.split_once('.')?;
    let expected_signature = hex::decode(signature_hex).ok()?;

    let mac_matches_any_secret = secrets.iter().any(|secret| {
        let Ok(mut mac) = HmacSha256::new_from_slice(secret) else { return false };
        mac.update(encoded_payload.as_bytes());
        mac.verify_slice(&expected_signature).is_ok()
    });

    if !mac_matches_any_secret {
        return None;
    }

    let payload_json = URL_SAFE_NO_PAD.decode(encoded_payload).ok()?;
    serde_json::from_slice(&payload_json).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_cookie_round_trips_under_the_same_secret() {
        let payload = TimingCookiePayload {
            start_ts_ms: 1_000,
            vhost_id: "vh-1".into(),
            path: "/checkout/start".into(),
            nonce: "abc123".into(),
        };
        let cookie_value = sign_cookie(&payload, b"secret-v1");
        let decoded = verify_cookie(&cookie_value, &[b"secret-v1".to_vec()]);
        assert_eq!(decoded, Some(payload));
    }

    #[test]
    fn tampered_payload_fails_verification() {
        let payload = TimingCookiePayload {
            start_ts_ms: 1_000,
            vhost_id: "vh-1".into(),
            path: "/checkout/start".into(),
            nonce: "abc123".into(),
        };
        let mut cookie_value = sign_cookie(&payload, b"secret-v1");
        cookie_value.push('x');
        assert!(verify_cookie(&cookie_value, &[b"secret-v1".to_vec()]).is_none());
    }

    #[test]
    fn rotated_secret_list_accepts_previous_generation() {
        let payload = TimingCookiePayload {
            start_ts_ms: 1_000,
            vhost_id: "vh-1".into(),
            path: "/checkout/start".into(),
            nonce: "abc123".into(),
        };
        let cookie_value = sign_cookie(&payload, b"secret-old");
        let decoded = verify_cookie(&cookie_value, &[b"secret-new".to_vec(), b"secret-old".to_vec()]);
        assert_eq!(decoded, Some(payload));
    }

    #[test]
    fn malformed_cookie_value_is_treated_as_missing() {
        assert!(verify_cookie("not-a-valid-cookie", &[b"secret".to_vec()]).is_none());
    }
}
