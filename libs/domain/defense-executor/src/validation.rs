// [libs/domain/defense-executor/src/validation.rs]
/*!
 * APARATO: DEFENSE PROFILE GRAPH VALIDATION (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: INVARIANTES ESTRUCTURALES DEL DAG EN TIEMPO DE CARGA
 * (spec §3, Entity Defense Profile; spec §7 `ProfileInvalid`)
 *
 * Cuatro invariantes, en orden: exactamente un `start`; todo puerto de
 * salida de todo nodo apunta a un nodo existente; el grafo es acíclico;
 * todo camino alcanzable desde `start` termina en una acción. Un perfil
 * que falla cualquiera de estas se rechaza por completo — no hay
 * ejecución parcial de un grafo inválido.
 */

use crate::errors::ExecutorError;
use std::collections::{HashSet, VecDeque};
use waf_domain_models::prelude::{DefenseProfile, NodeId, NodeKind};

fn outgoing_ports(kind: &NodeKind) -> Vec<&NodeId> {
    match kind {
        NodeKind::Start { next } => vec![next],
        NodeKind::Defense { outputs, .. } => outputs.values().collect(),
        NodeKind::Operator { outputs, .. } => outputs.values().collect(),
        NodeKind::Observation { next, .. } => vec![next],
        NodeKind::Action { .. } => vec![],
    }
}

pub fn validate_profile(profile: &DefenseProfile) -> Result<(), ExecutorError> {
    let start_nodes: Vec<&NodeId> = profile
        .nodes
        .iter()
        .filter(|node| matches!(node.kind, NodeKind::Start { .. }))
        .map(|node| &node.id)
        .collect();

    match start_nodes.len() {
        1 => {}
        0 => return Err(ExecutorError::ProfileInvalid(format!("profile {} has no start node", profile.id))),
        _ => return Err(ExecutorError::ProfileInvalid(format!("profile {} has more than one start node", profile.id))),
    }

    for node in &profile.nodes {
        for target in outgoing_ports(&node.kind) {
            if profile.node(target).is_none() {
                return Err(ExecutorError::ProfileInvalid(format!(
                    "profile {}: node {} points to nonexistent node {target}",
                    profile.id, node.id
                )));
            }
        }
        if let NodeKind::Operator { inputs, .. } = &node.kind {
            for input in inputs {
                if profile.node(input).is_none() {
                    return Err(ExecutorError::ProfileInvalid(format!(
                        "profile {}: operator {} references nonexistent input {input}",
                        profile.id, node.id
                    )));
                }
            }
        }
    }

    detect_cycle(profile)?;
    every_reachable_path_terminates_in_action(profile)?;

    Ok(())
}

fn detect_cycle(profile: &DefenseProfile) -> Result<(), ExecutorError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    let mut marks: std::collections::HashMap<&NodeId, Mark> = std::collections::HashMap::new();

    fn visit<'a>(
        profile: &'a DefenseProfile,
        node_id: &'a NodeId,
        marks: &mut std::collections::HashMap<&'a NodeId, Mark>,
        stack: &mut Vec<&'a NodeId>,
    ) -> Result<(), ExecutorError> {
        if let Some(Mark::Done) = marks.get(node_id) {
            return Ok(());
        }
        if let Some(Mark::Visiting) = marks.get(node_id) {
            return Err(ExecutorError::ProfileInvalid(format!(
                "profile {}: cycle detected at node {node_id}",
                profile.id
            )));
        }

        marks.insert(node_id, Mark::Visiting);
        stack.push(node_id);

        let Some(node) = profile.node(node_id) else {
            return Ok(());
        };
        for target in outgoing_ports(&node.kind) {
            visit(profile, target, marks, stack)?;
        }

        stack.pop();
        marks.insert(node_id, Mark::Done);
        Ok(())
    }

    let mut stack = Vec::new();
    for node in &profile.nodes {
        visit(profile, &node.id, &mut marks, &mut stack)?;
    }
    Ok(())
}

/// Camino a camino, partiendo de `start`, todo nodo alcanzable debe
/// eventualmente desembocar en un nodo `Action` — un perfil donde algún
/// camino se pierde en un nodo sin salidas (p.ej. un `Observation` cuyo
/// `next` forma un ciclo ya detectado antes, o un operador sin puertos
/// cableados) se rechaza.
fn every_reachable_path_terminates_in_action(profile: &DefenseProfile) -> Result<(), ExecutorError> {
    let Some(start) = profile.start_node() else {
        return Err(ExecutorError::ProfileInvalid(format!("profile {} has no start node", profile.id)));
    };

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    queue.push_back(&start.id);

    while let Some(node_id) = queue.pop_front() {
        if !visited.insert(node_id) {
            continue;
        }
        let Some(node) = profile.node(node_id) else {
            return Err(ExecutorError::ProfileInvalid(format!(
                "profile {}: dangling reference to {node_id}",
                profile.id
            )));
        };

        match &node.kind {
            NodeKind::Action { .. } => continue,
            NodeKind::Operator { outputs, .. } if outputs.is_empty() => {
                return Err(ExecutorError::ProfileInvalid(format!(
                    "profile {}: operator {node_id} has no outputs and no path to an action",
                    profile.id
                )));
            }
            kind => {
                for target in outgoing_ports(kind) {
                    queue.push_back(target);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use waf_domain_models::prelude::{ActionKind, DefenseNode, DefenseProfileSettings};

    fn start_to_allow() -> DefenseProfile {
        DefenseProfile {
            id: "p1".into(),
            nodes: vec![
                DefenseNode { id: "start".into(), kind: NodeKind::Start { next: "allow".into() } },
                DefenseNode { id: "allow".into(), kind: NodeKind::Action { action: ActionKind::Allow } },
            ],
            settings: DefenseProfileSettings::default(),
        }
    }

    #[test]
    fn minimal_start_to_action_profile_is_valid() {
        assert!(validate_profile(&start_to_allow()).is_ok());
    }

    #[test]
    fn profile_with_no_start_node_is_rejected() {
        let mut profile = start_to_allow();
        profile.nodes.remove(0);
        assert!(validate_profile(&profile).is_err());
    }

    #[test]
    fn profile_with_two_start_nodes_is_rejected() {
        let mut profile = start_to_allow();
        profile.nodes.push(DefenseNode { id: "start2".into(), kind: NodeKind::Start { next: "allow".into() } });
        assert!(validate_profile(&profile).is_err());
    }

    #[test]
    fn dangling_output_port_is_rejected() {
        let mut profile = start_to_allow();
        profile.nodes[0].kind = NodeKind::Start { next: "missing".into() };
        assert!(validate_profile(&profile).is_err());
    }

    #[test]
    fn cycle_between_observation_nodes_is_rejected() {
        let mut profile = start_to_allow();
        profile.nodes[0].kind = NodeKind::Start { next: "obs_a".into() };
        profile.nodes.push(DefenseNode {
            id: "obs_a".into(),
            kind: NodeKind::Observation { observation_kind: "metric".into(), config: serde_json::json!({}), next: "obs_b".into() },
        });
        profile.nodes.push(DefenseNode {
            id: "obs_b".into(),
            kind: NodeKind::Observation { observation_kind: "metric".into(), config: serde_json::json!({}), next: "obs_a".into() },
        });
        assert!(validate_profile(&profile).is_err());
    }

    #[test]
    fn operator_with_no_outputs_never_reaches_an_action() {
        let mut profile = start_to_allow();
        profile.nodes[0].kind = NodeKind::Start { next: "op".into() };
        profile.nodes.push(DefenseNode {
            id: "op".into(),
            kind: NodeKind::Operator {
                op: waf_domain_models::prelude::OperatorOp::ScoreSum,
                config: serde_json::json!({}),
                inputs: vec![],
                outputs: HashMap::new(),
            },
        });
        assert!(validate_profile(&profile).is_err());
    }
}
