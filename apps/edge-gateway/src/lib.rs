// [apps/edge-gateway/src/lib.rs]
/*!
 * =================================================================
 * APARATO: EDGE GATEWAY LIBRARY ROOT (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L3)
 * RESPONSABILIDAD: DEFINICIÓN DEL ÁRBOL DE MÓDULOS DEL BORDE HTTP
 *
 * Expone un `prelude` mínimo para la ignición del binario desde
 * `main.rs`, y mantiene `crate::` resoluble de forma determinista
 * tanto en la librería como en el binario.
 * =================================================================
 */

// --- ESTRATO DE INFRAESTRUCTURA Y ARRANQUE ---
/// Verificación de disponibilidad del almacén e hidratación de valores globales.
pub mod bootstrap;

// --- ESTRATO DE DATOS Y ESTADO ---
/// Traducción tipada de `ConfigStoreClient` en colecciones de entidades.
pub mod repository;
/// Estado compartido del borde y sus colaboradores de dominio.
pub mod state;

// --- ESTRATO DE APLICACIÓN ---
/// Síntesis en memoria del perfil de defensa `legacy` heredado.
pub mod legacy_profile;

// --- ESTRATO DE TRANSPORTE Y ACCIÓN ---
/// Adaptadores de entrada HTTP: evaluación pública, administración, simulación.
pub mod handlers;
/// Núcleo de mando y control para la ignición del servidor.
pub mod kernel;
/// Definición de rutas y topología del router.
pub mod routes;

// --- ESTRATO DE SEGURIDAD Y SOPORTE ---
/// Guardianes perimetrales de salud y autenticación administrativa.
pub mod middleware;

/**
 * PRELUDIO DEL BORDE
 *
 * Re-exportación estratégica de los componentes necesarios para la
 * ignición mínima del sistema, reduciendo el acoplamiento en `main.rs`.
 */
pub mod prelude {
    pub use crate::kernel::EdgeKernel;
    pub use crate::state::{AppState, GlobalDefaults, SystemMode};
}
