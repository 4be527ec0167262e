// [apps/edge-gateway/src/main.rs]
/*!
 * =================================================================
 * APARATO: EDGE GATEWAY MAIN ENTRY POINT (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: CARGA DE ENTORNO, OBSERVABILIDAD E IGNICIÓN DEL KERNEL
 * =================================================================
 */

use dotenvy::dotenv;
use tracing::{error, info};
use waf_edge_gateway::prelude::EdgeKernel;
use waf_shared_telemetry::init_tracing;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing("waf_edge_gateway");

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    runtime.block_on(async {
        info!("🛰️  [EDGE_GATEWAY]: Ignition sequence starting...");

        let namespace = std::env::var("WAF_NAMESPACE").unwrap_or_else(|_| "default".to_string());
        let database_connection_url = std::env::var("DATABASE_URL").ok();
        let database_access_token = std::env::var("TURSO_AUTH_TOKEN").ok();
        let listening_network_port: u16 = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().unwrap_or(3000);

        let kernel = match EdgeKernel::ignite(namespace, database_connection_url, database_access_token, listening_network_port).await {
            Ok(kernel) => kernel,
            Err(ignition_fault) => {
                error!("❌ [EDGE_GATEWAY]: Ignition failed: {}", ignition_fault);
                std::process::exit(1);
            }
        };

        info!("🚀 [EDGE_GATEWAY]: Fully assembled, listening on port {}.", listening_network_port);
        if let Err(launch_fault) = kernel.launch().await {
            error!("💀 [EDGE_GATEWAY]: Runtime failure: {}", launch_fault);
            std::process::exit(1);
        }

        Ok(())
    })
}
