// [libs/domain/models/src/common.rs]
/*!
 * APARATO: COMMON DOMAIN PRIMITIVES (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN MODEL (ESTRATO L2)
 */

use serde::{Deserialize, Serialize};

/// Modo operativo de un vhost (spec §3, Entity Vhost).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WafMode {
    Monitoring,
    Blocking,
    Passthrough,
    Strict,
}

/// Umbrales de puntuación que gobiernan la decisión final.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub block_score: i64,
    pub flag_score: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { block_score: 100, flag_score: 20 }
    }
}

/// Un patrón de coincidencia de hostname: exacto, comodín de subdominio o regex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum HostnamePattern {
    Exact(String),
    /// `*.example.com` coincide con `foo.example.com` pero no con `example.com`.
    WildcardSuffix(String),
    Regex(String),
}

/// Modo de coincidencia de ruta compartido por flujos de comportamiento y
/// reglas de endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathMatchMode {
    Exact,
    Prefix,
    Regex,
}

/// Anulaciones de palabras clave a nivel de vhost o endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordOverrides {
    /// Si es `true`, las listas globales/heredadas se conservan y estas
    /// anulaciones se concatenan; si es `false`, las reemplazan.
    pub inherit: bool,
    pub additional_blocked: Vec<String>,
    /// Sintaxis `keyword:score`; sin sufijo asume el valor por defecto.
    pub additional_flagged: Vec<String>,
    pub exclusions: Vec<String>,
}

/// Identificador estable y opaco de una entidad de dominio.
pub type EntityId = String;
