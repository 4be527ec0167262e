// [libs/domain/identity-detectors/src/lib.rs]
/*!
 * =================================================================
 * APARATO: IDENTITY DETECTORS CRATE ROOT (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: CORREO DESECHABLE, GEOIP/ASN Y REPUTACIÓN DE IP (spec §4.F)
 * =================================================================
 */

pub mod disposable_email;
pub mod errors;
pub mod geoip;
pub mod geoip_policy;
pub mod ip_reputation;
pub mod verdict;

pub mod prelude {
    pub use crate::disposable_email::{DisposableEmailDetector, DisposableSource, DisposableVerdict};
    pub use crate::errors::IdentityDetectorError;
    pub use crate::geoip::{GeoIpDetector, GeoLookup};
    pub use crate::geoip_policy::{evaluate_geo_policy, GeoPolicy};
    pub use crate::ip_reputation::{
        ExternalScoreApiConfig, IpReputationDetector, ReputationThresholds, WebhookProviderConfig,
    };
    pub use crate::verdict::DetectorVerdict;
}
