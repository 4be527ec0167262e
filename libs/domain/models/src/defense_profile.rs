// [libs/domain/models/src/defense_profile.rs]
/*!
 * APARATO: DEFENSE PROFILE MODEL (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN MODEL (ESTRATO L2)
 *
 * Un perfil de defensa es un DAG direccionado por arena: cada nodo posee
 * un conjunto de puertos de salida nombrados que apuntan a otros nodos
 * por id. La validación de las invariantes del grafo (exactamente un
 * `start`, todo puerto apunta a un nodo existente, ausencia de ciclos,
 * todo camino termina en una acción) vive en `waf-domain-defense-executor`;
 * este crate solo modela la forma de los datos (spec §3, Entity Defense Profile).
 */

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type NodeId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseType {
    IpAllowlist,
    Geoip,
    IpReputation,
    TimingToken,
    Behavioral,
    Honeypot,
    KeywordFilter,
    ContentHash,
    ExpectedFields,
    PatternScan,
    DisposableEmail,
    FieldAnomalies,
    Fingerprint,
    HeaderConsistency,
    RateLimiter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum OperatorOp {
    ThresholdBranch { ranges: Vec<ThresholdRange> },
    And,
    Or,
    Not,
    ScoreSum,
    ScoreMax,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRange {
    pub min: f64,
    pub max: Option<f64>,
    pub output: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TarpitFollowup {
    Block,
    Flag,
    Allow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ActionKind {
    Allow,
    Block,
    Captcha,
    Tarpit { delay_ms: u64, then: TarpitFollowup },
    Flag { score: i64 },
    Monitor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum NodeKind {
    Start {
        /// Único puerto de salida de un nodo `start`.
        next: NodeId,
    },
    Defense {
        defense_type: DefenseType,
        config: serde_json::Value,
        /// Puertos nombrados, siempre incluye `next`; para defensas con
        /// dicotomía disparado/no-disparado también `matched`/`not_matched`.
        outputs: HashMap<String, NodeId>,
    },
    Operator {
        op: OperatorOp,
        config: serde_json::Value,
        /// Ids de nodo cuyos scores/triggers ya deben haberse ejecutado
        /// en orden topológico (para `score_sum`/`score_max`/`and`/`or`/`not`).
        inputs: Vec<NodeId>,
        outputs: HashMap<String, NodeId>,
    },
    Action {
        action: ActionKind,
    },
    Observation {
        observation_kind: String,
        config: serde_json::Value,
        next: NodeId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseNode {
    pub id: NodeId,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefenseProfileSettings {
    pub default_action: DefaultActionKind,
    pub max_execution_time_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultActionKind {
    Allow,
    Block,
}

impl Default for DefenseProfileSettings {
    fn default() -> Self {
        Self { default_action: DefaultActionKind::Allow, max_execution_time_ms: 50 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseProfile {
    pub id: String,
    pub nodes: Vec<DefenseNode>,
    pub settings: DefenseProfileSettings,
}

impl DefenseProfile {
    pub fn node(&self, node_id: &str) -> Option<&DefenseNode> {
        self.nodes.iter().find(|node| node.id == node_id)
    }

    pub fn start_node(&self) -> Option<&DefenseNode> {
        self.nodes.iter().find(|node| matches!(node.kind, NodeKind::Start { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_node_is_located_among_mixed_node_kinds() {
        let profile = DefenseProfile {
            id: "profile-1".into(),
            nodes: vec![
                DefenseNode { id: "n0".into(), kind: NodeKind::Start { next: "n1".into() } },
                DefenseNode { id: "n1".into(), kind: NodeKind::Action { action: ActionKind::Allow } },
            ],
            settings: DefenseProfileSettings::default(),
        };
        assert_eq!(profile.start_node().map(|node| node.id.as_str()), Some("n0"));
    }

    #[test]
    fn node_lookup_returns_none_for_unknown_id() {
        let profile = DefenseProfile { id: "p".into(), nodes: vec![], settings: DefenseProfileSettings::default() };
        assert!(profile.node("missing").is_none());
    }
}
