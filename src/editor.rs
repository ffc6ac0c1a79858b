use crate::error::EditError;
use crate::graph::{Edge, EntityRef, Graph};
use crate::ids::{IdAllocator, Role};
use crate::model::{Agent, Scenario, ScenarioModel};
use crate::params::SynthesisParameters;
use std::{collections::HashMap, sync::Arc};

/// Scenario editing session.
///
/// Keeps the display graph in lockstep with the scenario model and owns the
/// identifier allocator both depend on. Every operation either updates the
/// graph and the scenario together or leaves both untouched.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    model: ScenarioModel,
    graph: Graph,
    ids: IdAllocator,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scenario snapshot.
    pub fn scenario(&self) -> Arc<Scenario> {
        self.model.snapshot()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Create an agent with no demand and no access, and return its id.
    pub fn add_agent(&mut self) -> String {
        let id = self.ids.next(Role::Agent);
        self.model.add_agent(Agent::new(id.clone(), 0, Vec::new()));
        self.graph.push_node(EntityRef::Agent(id.clone()));
        log::debug!("added agent {id}");
        id
    }

    /// Create a resource and return its id.
    pub fn add_resource(&mut self) -> String {
        let id = self.ids.next(Role::Resource);
        self.model.add_resource(&id);
        self.graph.push_node(EntityRef::Resource(id.clone()));
        log::debug!("added resource {id}");
        id
    }

    pub fn set_agent_demand(&mut self, agent_id: &str, demand: u32) -> Arc<Scenario> {
        self.model.set_agent_demand(agent_id, demand)
    }

    pub fn set_parameters(&mut self, parameters: SynthesisParameters) -> Arc<Scenario> {
        self.model.set_parameters(parameters)
    }

    pub fn set_message(&mut self, message: &str) -> Arc<Scenario> {
        self.model.set_message(message)
    }

    /// Grant an agent access to a resource and draw the matching edge.
    ///
    /// The endpoints may be given in either order; the stored edge always runs
    /// from the agent to the resource. Connecting two agents or two resources
    /// is rejected without any change. A connection naming an entity that does
    /// not exist is ignored and returns `Ok(None)`.
    pub fn connect(&mut self, a: EntityRef, b: EntityRef) -> Result<Option<String>, EditError> {
        let (agent_id, resource_id) = match (&a, &b) {
            (EntityRef::Agent(agt), EntityRef::Resource(res))
            | (EntityRef::Resource(res), EntityRef::Agent(agt)) => (agt.clone(), res.clone()),
            _ => {
                log::warn!("rejected connection between {a} and {b}");
                return Err(EditError::InvalidConnection { from: a, to: b });
            }
        };

        let scenario = self.model.snapshot();
        if scenario.agent(&agent_id).is_none() || !scenario.has_resource(&resource_id) {
            log::debug!("ignoring connection to unknown entity ({a}, {b})");
            return Ok(None);
        }

        self.model.add_resource_access(&agent_id, &resource_id);
        let edge_id = self.edge_id(&agent_id, &resource_id);
        self.graph.push_edge(Edge {
            id: edge_id.clone(),
            source: agent_id,
            target: resource_id,
        });
        log::debug!("added edge {edge_id}");

        Ok(Some(edge_id))
    }

    /// Delete nodes and the entities they represent.
    ///
    /// Each node is handled on its own; unknown nodes are skipped.
    pub fn delete_nodes(&mut self, nodes: &[EntityRef]) -> Arc<Scenario> {
        for node in nodes {
            match node {
                EntityRef::Agent(id) => self.model.remove_agent(id),
                EntityRef::Resource(id) => self.model.remove_resource(id),
            };
            self.graph.remove_node(node);
            log::debug!("deleted {node}");
        }
        self.model.snapshot()
    }

    /// Remove every agent and resource and restart identifier allocation.
    pub fn clear(&mut self) -> Arc<Scenario> {
        self.graph.clear();
        self.ids.reset_all();
        self.model.clear_entities()
    }

    /// Replace the whole session with `scenario`.
    ///
    /// Identifiers are allocated afresh: agents first, in their stored order,
    /// then resources. Access lists are rewritten with the new resource ids;
    /// grants to resources the scenario does not declare are dropped.
    pub fn load_from_scenario(&mut self, scenario: &Scenario) -> Arc<Scenario> {
        let mut ids = IdAllocator::new();
        let mut graph = Graph::new();
        let mut loaded = Scenario::new();
        loaded.set_parameters(scenario.parameters);
        loaded.set_message(scenario.message.clone());

        let agent_ids: Vec<String> = scenario
            .agents
            .keys()
            .map(|_| ids.next(Role::Agent))
            .collect();
        let resource_ids: HashMap<&str, String> = scenario
            .resources
            .iter()
            .map(|res| (res.as_str(), ids.next(Role::Resource)))
            .collect();

        for agt_id in &agent_ids {
            graph.push_node(EntityRef::Agent(agt_id.clone()));
        }
        for res in &scenario.resources {
            graph.push_node(EntityRef::Resource(resource_ids[res.as_str()].clone()));
            loaded.add_resource(resource_ids[res.as_str()].clone());
        }

        for (agt, new_id) in scenario.agents.values().zip(&agent_ids) {
            let mut acc = Vec::with_capacity(agt.acc().len());
            for res in agt.acc() {
                let Some(new_res) = resource_ids.get(res.as_str()) else {
                    log::warn!("agent {} references undeclared resource {res:?}", agt.id());
                    continue;
                };
                acc.push(new_res.clone());
                graph.push_edge(Edge {
                    id: edge_id(&mut ids, new_id, new_res),
                    source: new_id.clone(),
                    target: new_res.clone(),
                });
            }
            loaded.add_agent(Agent::new(new_id.clone(), agt.demand(), acc));
        }

        log::info!(
            "loaded scenario with {} agents, {} resources and {} grants",
            loaded.agents.len(),
            loaded.resources.len(),
            loaded.n_grants()
        );

        self.ids = ids;
        self.graph = graph;
        self.model.replace(loaded)
    }

    /// Check that the graph mirrors the scenario exactly.
    pub fn is_consistent(&self) -> bool {
        let scenario = self.model.snapshot();

        let nodes_match = self.graph.n_agents() == scenario.agents.len()
            && self.graph.n_resources() == scenario.resources.len()
            && scenario
                .agents
                .keys()
                .all(|id| self.graph.contains(&EntityRef::Agent(id.clone())))
            && scenario
                .resources
                .iter()
                .all(|id| self.graph.contains(&EntityRef::Resource(id.clone())));

        let mut grants: HashMap<(&str, &str), usize> = HashMap::new();
        for agt in scenario.agents.values() {
            for res in agt.acc() {
                *grants.entry((agt.id(), res.as_str())).or_default() += 1;
            }
        }
        for edge in self.graph.edges() {
            match grants.get_mut(&(edge.source.as_str(), edge.target.as_str())) {
                Some(count) if *count > 0 => *count -= 1,
                _ => return false,
            }
        }

        nodes_match && grants.values().all(|&count| count == 0)
    }

    fn edge_id(&mut self, agent_id: &str, resource_id: &str) -> String {
        edge_id(&mut self.ids, agent_id, resource_id)
    }
}

fn edge_id(ids: &mut IdAllocator, agent_id: &str, resource_id: &str) -> String {
    format!("{agent_id}-{resource_id}-{}", ids.next(Role::Node))
}
