// [libs/domain/timing-token/src/lib.rs]
/*!
 * =================================================================
 * APARATO: TIMING-TOKEN CRATE ROOT (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: DETECCIÓN DE ENVÍO DE FORMULARIOS DEMASIADO RÁPIDO (spec §4.G)
 * =================================================================
 */

pub mod cookie;
pub mod engine;
pub mod path_matching;

pub mod prelude {
    pub use crate::cookie::{cookie_name, sign_cookie, verify_cookie, TimingCookiePayload};
    pub use crate::engine::{
        is_end_path, is_start_path, issue_cookie, validate_end_request, IssuedCookie, TimingTokenConfig,
        TimingVerdict,
    };
    pub use crate::path_matching::path_matches_any;
}
