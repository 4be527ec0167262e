// [libs/infra/config-store/tests/ttl_cache_invalidation.rs]
//! Certificación de contrato: la capa TTL (`CachedConfigStore`) sirve valores
//! frescos dentro de ventana, reconsulta tras expirar, y se purga ante un
//! `publish` de invalidación explícito (spec §4.A).

use std::sync::Arc;
use std::time::Duration;
use waf_infra_config_store::prelude::*;

#[tokio::test]
async fn cache_serves_fresh_value_within_ttl_without_hitting_store() {
    let inner = Arc::new(InMemoryConfigStore::new());
    let cache = CachedConfigStore::with_ttl(Arc::clone(&inner) as Arc<dyn ConfigStoreClient>, Duration::from_secs(5));

    cache.set("waf:profiles:default", serde_json::json!({"nodes": []})).await.unwrap();
    inner.set("waf:profiles:default", serde_json::json!({"nodes": ["poisoned"]})).await.unwrap();

    let (value, fresh) = cache.get("waf:profiles:default").await.unwrap();
    assert!(fresh);
    assert_eq!(value, Some(serde_json::json!({"nodes": []})));
}

#[tokio::test]
async fn cache_reconsults_store_after_ttl_elapses() {
    let inner = Arc::new(InMemoryConfigStore::new());
    let cache = CachedConfigStore::with_ttl(Arc::clone(&inner) as Arc<dyn ConfigStoreClient>, Duration::from_millis(15));

    cache.set("waf:endpoints:login", serde_json::json!({"priority": 1})).await.unwrap();
    inner.set("waf:endpoints:login", serde_json::json!({"priority": 2})).await.unwrap();

    tokio::time::sleep(Duration::from_millis(40)).await;

    let (value, fresh) = cache.get("waf:endpoints:login").await.unwrap();
    assert!(fresh);
    assert_eq!(value, Some(serde_json::json!({"priority": 2})));
}

#[tokio::test]
async fn explicit_invalidate_forces_a_reread_even_within_ttl_window() {
    let inner = Arc::new(InMemoryConfigStore::new());
    let cache = CachedConfigStore::with_ttl(Arc::clone(&inner) as Arc<dyn ConfigStoreClient>, Duration::from_secs(60));

    cache.set("waf:fingerprints:bot_suspects", serde_json::json!({"version": 1})).await.unwrap();
    inner.set("waf:fingerprints:bot_suspects", serde_json::json!({"version": 2})).await.unwrap();
    cache.invalidate("waf:fingerprints:bot_suspects").await.unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;

    let (value, fresh) = cache.get("waf:fingerprints:bot_suspects").await.unwrap();
    assert!(fresh);
    assert_eq!(value, Some(serde_json::json!({"version": 2})));
}

#[tokio::test]
async fn cache_miss_on_unknown_key_falls_through_to_store() {
    let inner = Arc::new(InMemoryConfigStore::new());
    let cache = CachedConfigStore::new(Arc::clone(&inner) as Arc<dyn ConfigStoreClient>);

    let (value, fresh) = cache.get("waf:vhosts:never_written").await.unwrap();
    assert!(fresh);
    assert_eq!(value, None);
}
