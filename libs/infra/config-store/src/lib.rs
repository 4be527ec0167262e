// [libs/infra/config-store/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CONFIG STORE CRATE ROOT (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: SUPERFICIE PÚBLICA DEL ALMACÉN DE CONFIGURACIÓN
 *
 * VISION HIPER-HOLÍSTICA:
 * Este crate expone un único contrato (`ConfigStoreClient`) y dos
 * implementaciones concretas: `InMemoryConfigStore` (pruebas y
 * operación autónoma) y `LibsqlConfigStore` (producción, Turso/libSQL).
 * El estrato de dominio solo depende del contrato, nunca de la
 * implementación concreta (spec §4.A).
 * =================================================================
 */

pub mod cache;
pub mod client;
pub mod errors;
pub mod libsql_store;
pub mod memory;

/// Reexportaciones de conveniencia para los consumidores del estrato de dominio.
pub mod prelude {
    pub use crate::cache::{CachedConfigStore, DEFAULT_TTL};
    pub use crate::client::{ConfigStoreClient, ScoredMember};
    pub use crate::errors::StoreError;
    pub use crate::libsql_store::LibsqlConfigStore;
    pub use crate::memory::InMemoryConfigStore;
}
