// [apps/edge-gateway/src/bootstrap.rs]
/*!
 * =================================================================
 * APARATO: ASYNC SYSTEM BOOTSTRAP (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: VERIFICACIÓN DE DISPONIBILIDAD DEL ALMACÉN E
 * HIDRATACIÓN DE VALORES GLOBALES DE RESPALDO (spec §4.K, §6)
 *
 * Se ejecuta en una tarea secundaria para que el servidor responda al
 * sondeo de salud de inmediato, aunque sea en modo `Maintenance`
 * mientras la certificación concluye.
 * =================================================================
 */

use crate::repository::global_config_key;
use crate::state::{AppState, GlobalDefaults, SystemMode};
use tracing::{error, info, instrument, warn};
use waf_infra_config_store::prelude::StoreError;

/// Autoridad de arranque del borde.
pub struct Bootstrap;

impl Bootstrap {
    /// Lanza la secuencia de certificación de disponibilidad de forma
    /// asíncrona, sin bloquear la ignición del servidor HTTP.
    #[instrument(skip(application_shared_state))]
    pub fn spawn_diagnostics(application_shared_state: AppState) {
        tokio::spawn(async move {
            info!("🩺 [BOOTSTRAP]: Verifying config store reachability...");

            match Self::hydrate_global_defaults(&application_shared_state).await {
                Ok(defaults) => {
                    info!("✅ [BOOTSTRAP]: Config store reachable, global defaults hydrated. Operational mode authorized.");
                    if let Ok(mut guard) = application_shared_state.global_defaults.write() {
                        *guard = defaults;
                    }
                    application_shared_state.set_mode(SystemMode::Operational);
                }
                Err(certification_fault) => {
                    let error_diagnostic_report = format!("CRITICAL_BOOT_FAULT: {certification_fault}");
                    error!("❌ {}", error_diagnostic_report);
                    application_shared_state.set_mode(SystemMode::Maintenance(error_diagnostic_report));
                }
            }
        });
    }

    /// Carga el documento de valores globales del almacén; si aún no
    /// existe (primer arranque del namespace), lo siembra con el valor
    /// por defecto y lo persiste para arranques subsecuentes.
    async fn hydrate_global_defaults(state: &AppState) -> Result<GlobalDefaults, StoreError> {
        let key = global_config_key(&state.namespace);
        match state.config_store.get(&key).await? {
            Some(raw) => match serde_json::from_value(raw) {
                Ok(defaults) => Ok(defaults),
                Err(fault) => {
                    warn!("⚠️ [BOOTSTRAP]: Global defaults document malformed ({}), falling back to built-in defaults.", fault);
                    Ok(GlobalDefaults::default())
                }
            },
            None => {
                info!("🆕 [BOOTSTRAP]: No global defaults document for namespace '{}', seeding built-in defaults.", state.namespace);
                let defaults = GlobalDefaults::default();
                let encoded = serde_json::to_value(&defaults).map_err(|fault| StoreError::MalformedDocument(fault.to_string()))?;
                state.config_store.set(&key, encoded).await?;
                Ok(defaults)
            }
        }
    }
}
