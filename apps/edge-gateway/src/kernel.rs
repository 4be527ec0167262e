// [apps/edge-gateway/src/kernel.rs]
/*!
 * =================================================================
 * APARATO: EDGE KERNEL (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L1-APP)
 * RESPONSABILIDAD: IGNICIÓN DE DEPENDENCIAS Y LANZAMIENTO DEL SERVIDOR (spec §3, §6)
 *
 * Construye el `AppState` completo a partir de la configuración de
 * proceso (variables de entorno, vía `dotenvy`/`std::env`, spec §3),
 * lanza los daemons de fondo (field-learner, webhooks) y finalmente
 * sirve el router HTTP.
 * =================================================================
 */

use crate::bootstrap::Bootstrap;
use crate::routes::create_router;
use crate::state::{AppState, GlobalDefaults};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, instrument};
use waf_domain_behavioral::prelude::BehavioralEngine;
use waf_domain_field_learner::prelude::FieldLearnerCollector;
use waf_domain_identity_detectors::prelude::{GeoIpDetector, IpReputationDetector};
use waf_domain_resolver::prelude::HostResolutionCache;
use waf_domain_signatures::prelude::SignatureRegistry;
use waf_infra_config_store::prelude::{CachedConfigStore, ConfigStoreClient, InMemoryConfigStore, LibsqlConfigStore};
use waf_infra_webhook_notifier::prelude::{all_event_types, WebhookConfig, WebhookNotifier};

/// Núcleo de mando del borde: posee el estado compartido y el puerto de
/// escucha, y orquesta la secuencia de ignición/lanzamiento.
pub struct EdgeKernel {
    server_network_port: u16,
    application_state: AppState,
}

impl EdgeKernel {
    /// Construye el almacén, los motores de dominio y el estado
    /// compartido a partir de la configuración de proceso.
    #[instrument(skip(database_access_token))]
    pub async fn ignite(
        namespace: String,
        database_connection_url: Option<String>,
        database_access_token: Option<String>,
        listening_port: u16,
    ) -> Result<Self> {
        let config_store: Arc<dyn ConfigStoreClient> = match database_connection_url {
            Some(url) if !url.is_empty() => {
                info!("🔌 [KERNEL]: Connecting to persistent config store at [{}]...", url);
                Arc::new(LibsqlConfigStore::connect(&url, database_access_token).await.context("config store connection failed")?)
            }
            _ => {
                info!("🧪 [KERNEL]: No DATABASE_URL configured, running against an in-memory config store.");
                Arc::new(InMemoryConfigStore::new())
            }
        };

        let config_cache = Arc::new(CachedConfigStore::new(config_store.clone()));
        let signatures = Arc::new(SignatureRegistry::new());
        let geoip = Arc::new(Self::build_geoip_detector());
        let ip_reputation = Arc::new(IpReputationDetector::new(reqwest::Client::new()));
        let behavioral = Arc::new(BehavioralEngine::new(config_store.clone()));
        let field_learner = Arc::new(FieldLearnerCollector::new(config_store.clone()));
        let host_cache = Arc::new(HostResolutionCache::new());
        let webhook_notifier = Arc::new(WebhookNotifier::new(Self::build_webhook_config(), reqwest::Client::new()));

        let application_state = AppState::new(
            namespace,
            config_store,
            config_cache,
            signatures,
            geoip,
            ip_reputation,
            behavioral,
            field_learner,
            host_cache,
            webhook_notifier,
            GlobalDefaults::default(),
        );

        Ok(Self { server_network_port: listening_port, application_state })
    }

    fn build_geoip_detector() -> GeoIpDetector {
        match (std::env::var("GEOIP_COUNTRY_DB_PATH").ok(), std::env::var("GEOIP_ASN_DB_PATH").ok()) {
            (None, None) => GeoIpDetector::inert(),
            (country, asn) => GeoIpDetector::with_databases(country.as_deref(), asn.as_deref()),
        }
    }

    fn build_webhook_config() -> WebhookConfig {
        let urls: Vec<String> = std::env::var("WEBHOOK_URLS")
            .ok()
            .map(|raw| raw.split(',').map(str::trim).filter(|url| !url.is_empty()).map(str::to_string).collect())
            .unwrap_or_default();
        WebhookConfig { urls, subscribed_types: all_event_types().into_iter().collect(), ..Default::default() }
    }

    /// Lanza los daemons de fondo y sirve el router HTTP hasta que el
    /// proceso sea terminado.
    pub async fn launch(self) -> Result<()> {
        Bootstrap::spawn_diagnostics(self.application_state.clone());

        let field_learner = self.application_state.field_learner.clone();
        tokio::spawn(async move { field_learner.spawn_flush_daemon().await });

        self.application_state.webhook_notifier.clone().spawn_flush_loop();

        let router = create_router(self.application_state);

        let listening_address = SocketAddr::from(([0, 0, 0, 0], self.server_network_port));
        let tcp_listener = tokio::net::TcpListener::bind(listening_address).await.context("failed to bind edge listener")?;
        info!("🚀 [KERNEL]: Edge gateway listening on {}", listening_address);

        if let Err(server_fault) = axum::serve(tcp_listener, router.into_make_service_with_connect_info::<SocketAddr>()).await {
            error!("💀 [KERNEL]: Edge server terminated unexpectedly: {}", server_fault);
            return Err(server_fault.into());
        }

        Ok(())
    }
}
