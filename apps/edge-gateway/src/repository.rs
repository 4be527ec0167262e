// [apps/edge-gateway/src/repository.rs]
/*!
 * APARATO: REPOSITORIO DE ENTIDADES DE CONFIGURACIÓN (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: APPLICATION CORE (ESTRATO L1)
 * RESPONSABILIDAD: TRADUCIR EL CONTRATO OPACO DE `ConfigStoreClient` EN
 * COLECCIONES TIPADAS DE ENTIDADES (spec §6 "Persisted state layout")
 *
 * `ConfigStoreClient` no expone un escaneo nativo por prefijo de clave;
 * cada familia de entidades mantiene entonces un conjunto índice
 * (`{ns}:<entidad>:_index`) con los ids vigentes, más un documento JSON
 * por id (`{ns}:<entidad>:{id}`). Las lecturas de documento individual
 * pasan por la capa de cache TTL; las lecturas de índice y las
 * escrituras van siempre al almacén subyacente sin pasar por cache,
 * seguidas de una invalidación explícita de la clave del documento.
 */

use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use waf_infra_config_store::prelude::{CachedConfigStore, ConfigStoreClient, StoreError};

/// Familias de entidades persistidas, cada una con su propio índice y
/// prefijo de documento (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Vhost,
    Endpoint,
    DefenseProfile,
    AttackSignature,
    FingerprintProfile,
}

impl EntityKind {
    fn segment(self) -> &'static str {
        match self {
            EntityKind::Vhost => "vhosts",
            EntityKind::Endpoint => "endpoints",
            EntityKind::DefenseProfile => "profiles",
            EntityKind::AttackSignature => "signatures",
            EntityKind::FingerprintProfile => "fp:profiles",
        }
    }
}

pub fn index_key(namespace: &str, kind: EntityKind) -> String {
    format!("{namespace}:{}:_index", kind.segment())
}

pub fn doc_key(namespace: &str, kind: EntityKind, id: &str) -> String {
    format!("{namespace}:{}:{id}", kind.segment())
}

pub fn global_config_key(namespace: &str) -> String {
    format!("{namespace}:global:config")
}

pub fn webhooks_config_key(namespace: &str) -> String {
    format!("{namespace}:webhooks:config")
}

pub fn timing_secret_key(namespace: &str) -> String {
    format!("{namespace}:timing:secret")
}

/// Lista los ids vigentes de una familia de entidades.
pub async fn list_ids(store: &Arc<dyn ConfigStoreClient>, namespace: &str, kind: EntityKind) -> Result<Vec<String>, StoreError> {
    store.set_members(&index_key(namespace, kind)).await
}

/// Carga un documento individual a través de la cache TTL.
pub async fn load_one<T: DeserializeOwned>(
    cache: &CachedConfigStore,
    namespace: &str,
    kind: EntityKind,
    id: &str,
) -> Result<Option<T>, StoreError> {
    let (raw, _fresh) = cache.get(&doc_key(namespace, kind, id)).await?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

/// Carga todas las entidades vigentes de una familia, en el orden
/// retornado por el índice. Documentos que ya no deserializan con el
/// esquema actual se omiten silenciosamente (ver `SPEC_FULL.md`,
/// tolerancia a esquema desactualizado).
pub async fn load_all<T: DeserializeOwned>(
    store: &Arc<dyn ConfigStoreClient>,
    cache: &CachedConfigStore,
    namespace: &str,
    kind: EntityKind,
) -> Result<Vec<T>, StoreError> {
    let ids = list_ids(store, namespace, kind).await?;
    let mut entities = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(entity) = load_one(cache, namespace, kind, &id).await? {
            entities.push(entity);
        }
    }
    Ok(entities)
}

/// Escribe un documento a través del almacén crudo (nunca a través de la
/// cache, cuyo único punto de escritura es su propio `set` — ver
/// `DESIGN.md`), añade el id al índice de la familia, y purga la copia
/// cacheada para que la próxima lectura vea el valor nuevo de inmediato.
pub async fn save_one<T: Serialize>(
    store: &Arc<dyn ConfigStoreClient>,
    cache: &CachedConfigStore,
    namespace: &str,
    kind: EntityKind,
    id: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_value(value).map_err(|fault| StoreError::MalformedDocument(fault.to_string()))?;
    store.set(&doc_key(namespace, kind, id), json).await?;
    store.set_add(&index_key(namespace, kind), id).await?;
    cache.invalidate(&doc_key(namespace, kind, id)).await
}

/// Retira un id de la familia. El contrato del almacén no ofrece un
/// borrado nativo de claves escalares: la convención aquí es sobrescribir
/// el documento con `null` y retirar el id del índice, de modo que
/// `load_one`/`load_all` ya no lo vean (spec §6, sin operación de
/// "delete" nativa en `ConfigStoreClient`).
pub async fn delete_one(
    store: &Arc<dyn ConfigStoreClient>,
    cache: &CachedConfigStore,
    namespace: &str,
    kind: EntityKind,
    id: &str,
) -> Result<(), StoreError> {
    store.set(&doc_key(namespace, kind, id), serde_json::Value::Null).await?;
    store.set_remove(&index_key(namespace, kind), id).await?;
    cache.invalidate(&doc_key(namespace, kind, id)).await
}
