// [libs/domain/defense-executor/src/context.rs]
/*!
 * APARATO: EXECUTION CONTEXT (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: FORMA DE ENTRADA/SALIDA COMPARTIDA ENTRE NODOS (spec §4.L)
 *
 * `RequestContext` es inmutable durante la evaluación: ningún detector
 * muta el cuerpo o los encabezados. `DefenseDeps` agrupa los
 * colaboradores con estado propio (cache, handle HTTP, lector MaxMind)
 * que un nodo `defense` necesita más allá de su propio `config` JSON —
 * el resto de la parametrización del detector vive en el nodo mismo
 * (`cfg ⊕ attached_signatures`), nunca en este bundle.
 */

use std::net::IpAddr;
use std::sync::Arc;
use waf_core_body_parser::FlatBody;
use waf_domain_fingerprint::prelude::RequestHeaders;
use waf_domain_identity_detectors::prelude::{GeoIpDetector, IpReputationDetector};
use waf_infra_config_store::prelude::ConfigStoreClient;
use waf_domain_behavioral::prelude::BehavioralEngine;
use waf_domain_signatures::prelude::SignatureRegistry;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub defense_profile_id: String,
    pub vhost_id: String,
    pub endpoint_id: Option<String>,
    pub client_ip: IpAddr,
    pub headers: RequestHeaders,
    pub body: FlatBody,
    pub method: String,
    pub path: String,
    pub timing_cookie: Option<String>,
    pub now_unix: i64,
    pub fill_duration_seconds: Option<f64>,
}

pub struct DefenseDeps {
    pub store: Arc<dyn ConfigStoreClient>,
    pub signatures: Arc<SignatureRegistry>,
    pub geoip: Arc<GeoIpDetector>,
    pub ip_reputation: Arc<IpReputationDetector>,
    pub behavioral: Arc<BehavioralEngine>,
}

/// Salida de un único nodo evaluado. `output` nombra el puerto tomado
/// (`"next"`, `"matched"`, `"not_matched"`, o el valor de un rango de
/// `threshold_branch`); el nodo ya no existe cuando el perfil termina
/// en una acción.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeOutcome {
    pub score: i64,
    pub triggered: bool,
    pub flags: Vec<String>,
    pub output: String,
    /// Cookie que el manejador debe fijar en la respuesta (emitida por un
    /// nodo `timing_token` en una ruta de inicio).
    pub issued_cookie: Option<(String, String)>,
}

impl NodeOutcome {
    pub fn next(score: i64, triggered: bool, flags: Vec<String>) -> Self {
        Self { score, triggered, flags, output: "next".to_string(), issued_cookie: None }
    }

    pub fn matched(score: i64, flags: Vec<String>) -> Self {
        Self { score, triggered: true, flags, output: "matched".to_string(), issued_cookie: None }
    }

    pub fn not_matched() -> Self {
        Self { score: 0, triggered: false, flags: vec![], output: "not_matched".to_string(), issued_cookie: None }
    }

    pub fn degraded(flag: impl Into<String>) -> Self {
        Self { score: 0, triggered: false, flags: vec![flag.into()], output: "next".to_string(), issued_cookie: None }
    }
}
