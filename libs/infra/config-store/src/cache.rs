// [libs/infra/config-store/src/cache.rs]
/*!
 * =================================================================
 * APARATO: TTL CACHE LAYER (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: AMORTIGUACIÓN DE LECTURAS SOBRE EL ALMACÉN COMPARTIDO
 *
 * VISION HIPER-HOLÍSTICA:
 * Cada lectura retorna una tupla (valor, fresco); un valor "no fresco"
 * sigue siendo utilizable por el estrato superior como última copia
 * conocida cuando el almacén subyacente está caído (spec §4.A, §7).
 * La invalidación llega por el canal `waf:invalidate:<key>` publicado
 * por cualquier escritor; esta capa se suscribe una sola vez por
 * instancia y purga la entrada local al primer mensaje recibido.
 * =================================================================
 */

use crate::client::ConfigStoreClient;
use crate::errors::StoreError;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// TTL por defecto de una entrada de cache, en ausencia de configuración explícita.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

const INVALIDATION_CHANNEL: &str = "waf:invalidate:config";

struct CacheEntry {
    value: Option<Value>,
    cached_at: Instant,
}

/// Envoltura de cache TTL sobre cualquier [`ConfigStoreClient`].
///
/// Publica invalidaciones con [`CachedConfigStore::invalidate`] y las
/// escucha automáticamente vía una tarea en segundo plano suscrita al
/// canal `waf:invalidate:config`.
pub struct CachedConfigStore {
    inner: Arc<dyn ConfigStoreClient>,
    entries: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
    _invalidation_listener: JoinHandle<()>,
}

impl CachedConfigStore {
    /// Construye la capa de cache con el TTL por defecto ([`DEFAULT_TTL`]).
    pub fn new(inner: Arc<dyn ConfigStoreClient>) -> Self {
        Self::with_ttl(inner, DEFAULT_TTL)
    }

    /// Construye la capa de cache con un TTL explícito.
    pub fn with_ttl(inner: Arc<dyn ConfigStoreClient>, ttl: Duration) -> Self {
        let entries: Arc<DashMap<String, CacheEntry>> = Arc::new(DashMap::new());
        let mut invalidation_feed = inner.subscribe(INVALIDATION_CHANNEL);
        let listener_entries = Arc::clone(&entries);

        let listener = tokio::spawn(async move {
            loop {
                match invalidation_feed.recv().await {
                    Ok(invalidated_key) => {
                        debug!("🧹 [CACHE]: Invalidation signal received for [{}]", invalidated_key);
                        listener_entries.remove(&invalidated_key);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(
                            "⚠️ [CACHE]: Invalidation listener lagged, {} signal(s) dropped — purging entire cache",
                            skipped
                        );
                        listener_entries.clear();
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Self { inner, entries, ttl, _invalidation_listener: listener }
    }

    /// Lee una clave, sirviendo la copia local si todavía está vigente.
    ///
    /// Retorna `(valor, fresco)`: `fresco = false` indica que el valor
    /// proviene de una copia expirada servida porque el almacén subyacente
    /// no respondió (ver [`StoreError::StoreUnavailable`]).
    pub async fn get(&self, key: &str) -> Result<(Option<Value>, bool), StoreError> {
        if let Some(entry) = self.entries.get(key) {
            if entry.cached_at.elapsed() < self.ttl {
                return Ok((entry.value.clone(), true));
            }
        }

        match self.inner.get(key).await {
            Ok(value) => {
                self.entries.insert(
                    key.to_string(),
                    CacheEntry { value: value.clone(), cached_at: Instant::now() },
                );
                Ok((value, true))
            }
            Err(fault) => {
                if let Some(stale) = self.entries.get(key) {
                    warn!(
                        "⚠️ [CACHE]: Store unreachable ({}), serving stale copy of [{}]",
                        fault, key
                    );
                    Ok((stale.value.clone(), false))
                } else {
                    Err(fault)
                }
            }
        }
    }

    /// Escribe a través al almacén subyacente y refresca la copia local.
    pub async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.inner.set(key, value.clone()).await?;
        self.entries.insert(key.to_string(), CacheEntry { value: Some(value), cached_at: Instant::now() });
        self.inner.publish(INVALIDATION_CHANNEL, key).await
    }

    /// Purga manualmente una entrada local y notifica a otros procesos suscritos.
    pub async fn invalidate(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        self.inner.publish(INVALIDATION_CHANNEL, key).await
    }

    /// Acceso directo al cliente subyacente, para operaciones sin cache
    /// (conjuntos, hashes, sorted-sets, contadores — ver spec §4.A).
    pub fn store(&self) -> &Arc<dyn ConfigStoreClient> {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryConfigStore;
    use std::time::Duration;

    #[tokio::test]
    async fn fresh_read_after_set_is_marked_fresh() {
        let inner = Arc::new(InMemoryConfigStore::new());
        let cache = CachedConfigStore::new(inner);
        cache.set("waf:vhosts:default", serde_json::json!({"id": "default"})).await.unwrap();
        let (value, fresh) = cache.get("waf:vhosts:default").await.unwrap();
        assert!(fresh);
        assert_eq!(value, Some(serde_json::json!({"id": "default"})));
    }

    #[tokio::test]
    async fn expired_entry_is_refetched_from_store() {
        let inner = Arc::new(InMemoryConfigStore::new());
        let cache = CachedConfigStore::with_ttl(Arc::clone(&inner) as Arc<dyn ConfigStoreClient>, Duration::from_millis(10));
        cache.set("waf:endpoints:root", serde_json::json!({"path": "/"})).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        inner.set("waf:endpoints:root", serde_json::json!({"path": "/v2"})).await.unwrap();
        let (value, fresh) = cache.get("waf:endpoints:root").await.unwrap();
        assert!(fresh);
        assert_eq!(value, Some(serde_json::json!({"path": "/v2"})));
    }

    #[tokio::test]
    async fn invalidate_forces_next_read_through_store() {
        let inner = Arc::new(InMemoryConfigStore::new());
        let cache = CachedConfigStore::new(Arc::clone(&inner) as Arc<dyn ConfigStoreClient>);
        cache.set("waf:profiles:strict", serde_json::json!({"version": 1})).await.unwrap();
        inner.set("waf:profiles:strict", serde_json::json!({"version": 2})).await.unwrap();
        cache.invalidate("waf:profiles:strict").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let (value, fresh) = cache.get("waf:profiles:strict").await.unwrap();
        assert!(fresh);
        assert_eq!(value, Some(serde_json::json!({"version": 2})));
    }
}
