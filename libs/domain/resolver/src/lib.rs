// [libs/domain/resolver/src/lib.rs]
/*!
 * =================================================================
 * APARATO: VHOST/ENDPOINT RESOLVER CRATE ROOT (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: RESOLUCIÓN host/path/method -> (vhost, endpoint) Y
 * FUSIÓN DE CONFIGURACIÓN EFECTIVA (spec §4.K)
 *
 * VISION HIPER-HOLÍSTICA:
 * El resultado de este crate (invariante #1, spec §8) es siempre o bien
 * un par (vhost, endpoint) concreto o `(_default, null)`; ninguna
 * solicitud queda sin enrutar.
 * =================================================================
 */

pub mod effective_config;
pub mod endpoint_matching;
pub mod host_cache;
pub mod vhost_matching;

pub mod prelude {
    pub use crate::effective_config::{build_effective_config, EffectiveConfig, GlobalKeywordDefaults};
    pub use crate::endpoint_matching::{resolve_endpoint, ResolvedEndpoint};
    pub use crate::host_cache::{CachedVhostResolution, HostResolutionCache, DEFAULT_HOST_CACHE_TTL};
    pub use crate::vhost_matching::{resolve_vhost, ResolvedVhost, VhostMatchType};
}
