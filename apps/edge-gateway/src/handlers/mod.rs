// [apps/edge-gateway/src/handlers/mod.rs]
/*!
 * APARATO: HANDLER REGISTRY (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: APPLICATION ADAPTERS (ESTRATO L4)
 * RESPONSABILIDAD: ÍNDICE MAESTRO DE LOS ADAPTADORES DE ENTRADA (spec §4.N, §5)
 *
 * # Topología de Módulos:
 * - evaluate:  Canalización pública de evaluación de solicitudes.
 * - admin:     Superficie CRUD sobre vhosts/endpoints/perfiles/firmas/fingerprints.
 * - simulate:  Ejecución de un perfil de defensa contra tráfico sintético.
 */

pub mod admin;
pub mod evaluate;
pub mod simulate;
