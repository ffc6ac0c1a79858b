//! Reconstruction of the solver's path for inspection.

use crate::types::{ActionList, ExperimentResult, ResourceState};
use serde::Serialize;

/// Resource-state snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathNode {
    pub index: usize,
    /// `(resource id, state)` pairs.
    pub states: Vec<(String, i64)>,
}

impl PathNode {
    pub fn label(&self) -> String {
        self.states
            .iter()
            .map(|(res, state)| format!("{res}: {state}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Action step leading from snapshot `source` to snapshot `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathEdge {
    pub index: usize,
    pub source: usize,
    pub target: usize,
    /// `(agent id, action)` pairs.
    pub actions: Vec<(i64, String)>,
}

impl PathEdge {
    pub fn label(&self) -> String {
        action_label(&self.actions)
    }
}

/// Action step with no following snapshot to point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingStep {
    pub index: usize,
    pub actions: Vec<(i64, String)>,
}

/// Linear graph of snapshots joined by action steps. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathGraph {
    pub nodes: Vec<PathNode>,
    pub edges: Vec<PathEdge>,
    pub dangling: Vec<DanglingStep>,
}

impl PathGraph {
    /// Build the path of `result`.
    ///
    /// Step `i` connects snapshot `i` to snapshot `i + 1`. A step with no
    /// snapshot `i + 1` yields a [`DanglingStep`] instead of an edge.
    pub fn from_result(result: &ExperimentResult) -> Self {
        let n_states = result.resource_states.len();
        let n_steps = result.action_list.len();
        if n_states != n_steps + 1 {
            log::warn!("result has {n_states} snapshots for {n_steps} steps");
        }

        let nodes = result
            .resource_states
            .iter()
            .enumerate()
            .map(|(index, snapshot)| PathNode {
                index,
                states: snapshot_pairs(snapshot),
            })
            .collect();

        let mut edges = Vec::with_capacity(n_steps);
        let mut dangling = Vec::new();
        for (index, step) in result.action_list.iter().enumerate() {
            let actions = action_pairs(step);
            let target = index + 1;
            if target < n_states {
                edges.push(PathEdge {
                    index,
                    source: index,
                    target,
                    actions,
                });
            } else {
                dangling.push(DanglingStep { index, actions });
            }
        }

        Self {
            nodes,
            edges,
            dangling,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            out.push_str(&format!("[{}] {}\n", node.index, node.label().replace('\n', ", ")));
            if let Some(edge) = self.edges.iter().find(|edge| edge.source == node.index) {
                out.push_str(&format!("  --({})--> [{}]\n", edge.label(), edge.target));
            }
        }
        for step in &self.dangling {
            out.push_str(&format!("  step {} without target: {}\n", step.index, action_label(&step.actions)));
        }
        out
    }
}

fn snapshot_pairs(snapshot: &ResourceState) -> Vec<(String, i64)> {
    if snapshot.resource_ids.len() != snapshot.resource_states.len() {
        log::warn!(
            "snapshot has {} resource ids for {} states",
            snapshot.resource_ids.len(),
            snapshot.resource_states.len()
        );
    }
    snapshot
        .resource_ids
        .iter()
        .cloned()
        .zip(snapshot.resource_states.iter().copied())
        .collect()
}

fn action_pairs(step: &ActionList) -> Vec<(i64, String)> {
    if step.agent_ids.len() != step.actions.len() {
        log::warn!(
            "step has {} agent ids for {} actions",
            step.agent_ids.len(),
            step.actions.len()
        );
    }
    step.agent_ids
        .iter()
        .copied()
        .zip(step.actions.iter().cloned())
        .collect()
}

fn action_label(actions: &[(i64, String)]) -> String {
    actions
        .iter()
        .map(|(agt, act)| format!("{agt}: {act}"))
        .collect::<Vec<_>>()
        .join(" ")
}
