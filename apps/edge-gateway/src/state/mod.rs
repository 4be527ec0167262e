// [apps/edge-gateway/src/state/mod.rs]
/*!
 * =================================================================
 * APARATO: SOVEREIGN STATE ORCHESTRATOR (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: ORQUESTACIÓN DE ESTRATOS Y COLABORADORES DEL EVALUADOR
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. DOBLE ACCESO AL ALMACÉN: `config_store` (crudo, para conjuntos,
 *    contadores y escrituras administrativas) y `config_cache` (TTL,
 *    para lecturas de documento en el camino caliente del evaluador) —
 *    `CachedConfigStore` no implementa `ConfigStoreClient`, por lo que
 *    ambos deben convivir en el estado (ver `DESIGN.md`).
 * 2. COMPOSITION ROOT: Centraliza el rastro de los motores de dominio
 *    (firmas, geoip, reputación, comportamiento) y de los daemons de
 *    fondo (webhooks, field-learner).
 * 3. NOMINAL PURITY: Uso de `Arc<T>` para inmutabilidad compartida.
 * =================================================================
 */

use std::sync::{Arc, RwLock};
use tracing::{debug, error, info, instrument, warn};
use waf_domain_behavioral::prelude::BehavioralEngine;
use waf_domain_field_learner::prelude::FieldLearnerCollector;
use waf_domain_identity_detectors::prelude::{GeoIpDetector, IpReputationDetector};
use waf_domain_models::prelude::Thresholds;
use waf_domain_resolver::prelude::HostResolutionCache;
use waf_domain_signatures::prelude::SignatureRegistry;
use waf_infra_config_store::prelude::{CachedConfigStore, ConfigStoreClient};
use waf_infra_webhook_notifier::prelude::WebhookNotifier;

/// Modos de salud del sistema para la interceptación de middleware perimetral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemMode {
    /// El borde evalúa solicitudes de forma nominal.
    Operational,
    /// El borde ha suspendido la evaluación por fallo de ignición o mando operativo.
    Maintenance(String),
}

/// Valores globales de respaldo, el nivel más externo de la jerarquía de
/// herencia de `waf-domain-resolver` (spec §4.K).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GlobalDefaults {
    pub thresholds: Thresholds,
    pub keyword_blocked: Vec<String>,
    pub keyword_flagged: Vec<String>,
    pub ip_allowlist: Vec<String>,
}

impl Default for GlobalDefaults {
    fn default() -> Self {
        Self { thresholds: Thresholds::default(), keyword_blocked: Vec::new(), keyword_flagged: Vec::new(), ip_allowlist: Vec::new() }
    }
}

/**
 * Contenedor de estado compartido (Thread-Safe) para el borde WAF. Actúa
 * como la placa base donde se conectan el almacén, los motores de
 * dominio y los daemons de fondo.
 */
#[derive(Clone)]
pub struct AppState {
    /// Prefijo de todas las claves persistidas por este despliegue (spec §6).
    pub namespace: Arc<String>,
    /// Cliente crudo del almacén: conjuntos, contadores, escrituras administrativas.
    pub config_store: Arc<dyn ConfigStoreClient>,
    /// Capa de cache TTL sobre el mismo almacén, para lecturas de documento.
    pub config_cache: Arc<CachedConfigStore>,
    /// Registro de firmas de ataque activas, parcheando configuración de nodos.
    pub signatures: Arc<SignatureRegistry>,
    /// Detector de geolocalización/ASN por IP.
    pub geoip: Arc<GeoIpDetector>,
    /// Detector de reputación de IP (lista local + proveedores externos).
    pub ip_reputation: Arc<IpReputationDetector>,
    /// Motor de líneas base e ingesta conductual.
    pub behavioral: Arc<BehavioralEngine>,
    /// Colector de muestreo para el aprendizaje de campos.
    pub field_learner: Arc<FieldLearnerCollector>,
    /// Cache de resolución de vhost por host, TTL corto (spec §4.K).
    pub host_cache: Arc<HostResolutionCache>,
    /// Notificador de eventos observacionales por webhook.
    pub webhook_notifier: Arc<WebhookNotifier>,
    /// Valores globales de respaldo de la jerarquía de configuración efectiva.
    pub global_defaults: Arc<RwLock<GlobalDefaults>>,
    /// Estado de liveness para guardias perimetrales de la API.
    pub current_system_mode: Arc<RwLock<SystemMode>>,
}

impl AppState {
    /// Forja una nueva instancia del estado maestro inyectando todas las
    /// dependencias ya construidas por `OrchestratorKernel::ignite`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        namespace: String,
        config_store: Arc<dyn ConfigStoreClient>,
        config_cache: Arc<CachedConfigStore>,
        signatures: Arc<SignatureRegistry>,
        geoip: Arc<GeoIpDetector>,
        ip_reputation: Arc<IpReputationDetector>,
        behavioral: Arc<BehavioralEngine>,
        field_learner: Arc<FieldLearnerCollector>,
        host_cache: Arc<HostResolutionCache>,
        webhook_notifier: Arc<WebhookNotifier>,
        global_defaults: GlobalDefaults,
    ) -> Self {
        debug!("🧬 [APP_STATE]: Executing sovereign ignition sequence...");

        Self {
            namespace: Arc::new(namespace),
            config_store,
            config_cache,
            signatures,
            geoip,
            ip_reputation,
            behavioral,
            field_learner,
            host_cache,
            webhook_notifier,
            global_defaults: Arc::new(RwLock::new(global_defaults)),
            current_system_mode: Arc::new(RwLock::new(SystemMode::Maintenance("BOOT_IN_PROGRESS".to_string()))),
        }
    }

    /// Sincroniza el modo operativo del servidor para el control de acceso.
    #[instrument(skip(self, target_system_mode))]
    pub fn set_mode(&self, target_system_mode: SystemMode) {
        match self.current_system_mode.write() {
            Ok(mut mode_guard) => {
                info!("🔄 [STATE_SHIFT]: System transitioning to mode: {:?}", target_system_mode);
                *mode_guard = target_system_mode;
            }
            Err(lock_poison_fault) => {
                error!("💀 [KERNEL_CRASH]: System mode lock poisoned: {}", lock_poison_fault);
            }
        }
    }

    /// Evalúa la capacidad operativa ante ráfagas HTTP entrantes.
    #[instrument(skip(self), level = "debug")]
    pub fn is_operational(&self) -> Result<(), String> {
        let mode_guard = self.current_system_mode.read().map_err(|e| format!("LOCK_POISON_FAULT: {}", e))?;

        match &*mode_guard {
            SystemMode::Operational => Ok(()),
            SystemMode::Maintenance(rejection_reason) => {
                warn!("⛔ [ACCESS_DENIED]: Strata maintenance active: {}", rejection_reason);
                Err(rejection_reason.clone())
            }
        }
    }

    /// Instantánea de los valores globales de respaldo vigentes.
    pub fn global_defaults_snapshot(&self) -> GlobalDefaults {
        self.global_defaults.read().expect("global defaults lock poisoned").clone()
    }
}
