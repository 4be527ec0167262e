// [libs/infra/config-store/tests/memory_store_round_trip.rs]
//! Certificación de contrato: `InMemoryConfigStore` satisface `ConfigStoreClient`
//! exactamente igual que lo haría una implementación respaldada por libSQL.

use waf_infra_config_store::prelude::*;

#[tokio::test]
async fn set_members_reflect_add_and_remove() {
    let store = InMemoryConfigStore::new();
    store.set_add("waf:vhosts:wildcards", "*.example.com").await.unwrap();
    store.set_add("waf:vhosts:wildcards", "*.staging.example.com").await.unwrap();
    store.set_add("waf:vhosts:wildcards", "*.example.com").await.unwrap();

    let mut members = store.set_members("waf:vhosts:wildcards").await.unwrap();
    members.sort();
    assert_eq!(members, vec!["*.example.com", "*.staging.example.com"]);

    store.set_remove("waf:vhosts:wildcards", "*.staging.example.com").await.unwrap();
    let members = store.set_members("waf:vhosts:wildcards").await.unwrap();
    assert_eq!(members, vec!["*.example.com"]);
}

#[tokio::test]
async fn hash_fields_are_independently_addressable() {
    let store = InMemoryConfigStore::new();
    store.hash_set("waf:signatures:sql_injection", "block", serde_json::json!(12)).await.unwrap();
    store.hash_set("waf:signatures:sql_injection", "flag", serde_json::json!(4)).await.unwrap();

    assert_eq!(
        store.hash_get("waf:signatures:sql_injection", "block").await.unwrap(),
        Some(serde_json::json!(12))
    );
    assert_eq!(
        store.hash_get("waf:signatures:sql_injection", "flag").await.unwrap(),
        Some(serde_json::json!(4))
    );
    assert_eq!(store.hash_get("waf:signatures:sql_injection", "missing").await.unwrap(), None);
}

#[tokio::test]
async fn list_range_supports_negative_indices_like_redis() {
    let store = InMemoryConfigStore::new();
    for value in 0..5 {
        store.list_push("waf:webhook:queue", serde_json::json!(value)).await.unwrap();
    }

    let last_two = store.list_range("waf:webhook:queue", -2, -1).await.unwrap();
    assert_eq!(last_two, vec![serde_json::json!(3), serde_json::json!(4)]);

    let all = store.list_range("waf:webhook:queue", 0, -1).await.unwrap();
    assert_eq!(all.len(), 5);
}

#[tokio::test]
async fn missing_key_returns_none_not_error() {
    let store = InMemoryConfigStore::new();
    assert_eq!(store.get("waf:vhosts:nonexistent").await.unwrap(), None);
}
