// INICIO DEL ARCHIVO [libs/infra/config-store/src/client.rs]
/*!
 * =================================================================
 * APARATO: CONFIG STORE CLIENT CONTRACT (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: ABSTRACCIÓN SOBERANA DEL ALMACÉN COMPARTIDO
 *
 * VISION HIPER-HOLÍSTICA:
 * El núcleo nunca asume el formato de cable del almacén; persiste
 * documentos JSON opacos e interpreta los "scores" de un sorted-set
 * únicamente como prioridades numéricas. Dos implementaciones viven
 * detrás de este contrato: una en memoria (pruebas/desarrollo, ver
 * `memory.rs`) y una respaldada por libSQL (ver `libsql_store.rs`).
 * =================================================================
 */

use crate::errors::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

/// Entrada de un sorted-set con su prioridad numérica asociada.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMember {
    pub member: String,
    pub score: f64,
}

/// Contrato soberano que toda implementación del almacén debe satisfacer.
///
/// Ninguna operación retorna algo distinto de `StoreError::StoreUnavailable`
/// ante fallos de enlace: los estratos superiores están autorizados a
/// sustituir valores por defecto ante este error (spec §4.A, §7).
#[async_trait]
pub trait ConfigStoreClient: Send + Sync {
    /// Lee un documento JSON opaco por clave.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Escribe un documento JSON opaco por clave (reemplazo total).
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Añade un miembro a un conjunto no ordenado.
    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError>;

    /// Remueve un miembro de un conjunto no ordenado.
    async fn set_remove(&self, key: &str, member: &str) -> Result<(), StoreError>;

    /// Lee todos los miembros de un conjunto no ordenado.
    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// Lee un campo de un hash nominal.
    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<Value>, StoreError>;

    /// Escribe un campo de un hash nominal.
    async fn hash_set(&self, key: &str, field: &str, value: Value) -> Result<(), StoreError>;

    /// Lee un rango de un sorted-set ordenado por prioridad ascendente.
    async fn sorted_set_range(&self, key: &str) -> Result<Vec<ScoredMember>, StoreError>;

    /// Inserta/actualiza un miembro de un sorted-set con su prioridad.
    async fn sorted_set_add(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError>;

    /// Apila un valor al final de una lista.
    async fn list_push(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Lee el rango `[start, stop]` (inclusive, estilo Redis) de una lista.
    async fn list_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Value>, StoreError>;

    /// Incrementa atómicamente un contador numérico y retorna el nuevo valor.
    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError>;

    /// Publica un mensaje en un canal lógico.
    async fn publish(&self, channel: &str, message: &str) -> Result<(), StoreError>;

    /// Se suscribe a un canal lógico; el flujo entrega mensajes ya publicados
    /// después de la suscripción (sin garantía de entrega histórica).
    fn subscribe(&self, channel: &str) -> broadcast::Receiver<String>;
}
// FIN DEL ARCHIVO [libs/infra/config-store/src/client.rs]
