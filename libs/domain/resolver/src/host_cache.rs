// [libs/domain/resolver/src/host_cache.rs]
/*!
 * APARATO: VHOST RESOLUTION CACHE (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: CACHE POR HOST CON TTL DE 60s (spec §4.K)
 *
 * Guarda únicamente el id del vhost resuelto y el tipo de coincidencia;
 * el objeto `Vhost` completo vive en la cache de configuración
 * (`waf-infra-config-store`), nunca duplicado aquí. `invalidate_all` se
 * llama cuando llega una notificación de cambio de configuración de
 * vhost (spec §4.K: "invalidado en cambios de configuración de vhost").
 */

use crate::vhost_matching::VhostMatchType;
use dashmap::DashMap;
use std::time::{Duration, Instant};

pub const DEFAULT_HOST_CACHE_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct HostCacheEntry {
    vhost_id: String,
    match_type: VhostMatchType,
    cached_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedVhostResolution {
    pub vhost_id: String,
    pub match_type: VhostMatchType,
}

pub struct HostResolutionCache {
    entries: DashMap<String, HostCacheEntry>,
    ttl: Duration,
}

impl Default for HostResolutionCache {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_HOST_CACHE_TTL)
    }
}

impl HostResolutionCache {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { entries: DashMap::new(), ttl }
    }

    pub fn get(&self, host: &str) -> Option<CachedVhostResolution> {
        let entry = self.entries.get(host)?;
        if entry.cached_at.elapsed() >= self.ttl {
            return None;
        }
        Some(CachedVhostResolution { vhost_id: entry.vhost_id.clone(), match_type: entry.match_type })
    }

    pub fn insert(&self, host: &str, vhost_id: &str, match_type: VhostMatchType) {
        self.entries.insert(
            host.to_string(),
            HostCacheEntry { vhost_id: vhost_id.to_string(), match_type, cached_at: Instant::now() },
        );
    }

    /// Purga toda la cache de resolución, invocado ante cualquier cambio
    /// en la configuración de vhosts (spec §4.K).
    pub fn invalidate_all(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entry_is_served_from_cache() {
        let cache = HostResolutionCache::with_ttl(Duration::from_secs(60));
        cache.insert("shop.example.com", "vh-1", VhostMatchType::Exact);
        let hit = cache.get("shop.example.com").unwrap();
        assert_eq!(hit.vhost_id, "vh-1");
    }

    #[test]
    fn expired_entry_is_not_served() {
        let cache = HostResolutionCache::with_ttl(Duration::from_millis(5));
        cache.insert("shop.example.com", "vh-1", VhostMatchType::Exact);
        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.get("shop.example.com").is_none());
    }

    #[test]
    fn invalidate_all_clears_every_entry() {
        let cache = HostResolutionCache::default();
        cache.insert("a.example.com", "vh-1", VhostMatchType::Exact);
        cache.insert("b.example.com", "vh-2", VhostMatchType::Exact);
        cache.invalidate_all();
        assert!(cache.get("a.example.com").is_none());
        assert!(cache.get("b.example.com").is_none());
    }
}
