//! Scenario data types.

use crate::params::SynthesisParameters;
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;

/// Agent of the scenario.
///
/// Holds the agent's demand and the resources it may access, in the order the
/// access was granted. Repeated grants are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    id: String,
    demand: u32,
    acc: Vec<String>,
}

impl Agent {
    pub fn new(id: impl Into<String>, demand: u32, acc: Vec<String>) -> Self {
        Self {
            id: id.into(),
            demand,
            acc,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn demand(&self) -> u32 {
        self.demand
    }

    /// Resources the agent may access, in grant order.
    pub fn acc(&self) -> &[String] {
        &self.acc
    }
}

/// Agents, resources, access grants, message and solver parameters.
///
/// Agents keep insertion order so that renumbering on load is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scenario {
    pub agents: IndexMap<String, Agent>,
    pub resources: IndexSet<String>,
    pub message: String,
    pub parameters: SynthesisParameters,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agent(&self, agent_id: &str) -> Option<&Agent> {
        self.agents.get(agent_id)
    }

    pub fn has_resource(&self, resource_id: &str) -> bool {
        self.resources.contains(resource_id)
    }

    /// Total number of access grants over all agents.
    pub fn n_grants(&self) -> usize {
        self.agents.values().map(|agt| agt.acc.len()).sum()
    }

    /// Insert `agent`, replacing any agent with the same id.
    pub fn add_agent(&mut self, agent: Agent) {
        self.agents.insert(agent.id.clone(), agent);
    }

    pub fn set_agent_demand(&mut self, agent_id: &str, demand: u32) {
        match self.agents.get_mut(agent_id) {
            Some(agt) => agt.demand = demand,
            None => log::debug!("ignoring demand for unknown agent {agent_id:?}"),
        }
    }

    pub fn remove_agent(&mut self, agent_id: &str) {
        self.agents.shift_remove(agent_id);
    }

    pub fn add_resource(&mut self, resource_id: impl Into<String>) {
        self.resources.insert(resource_id.into());
    }

    /// Remove a resource and purge it from every agent's access list.
    pub fn remove_resource(&mut self, resource_id: &str) {
        if !self.resources.shift_remove(resource_id) {
            return;
        }
        for agt in self.agents.values_mut() {
            agt.acc.retain(|res| res != resource_id);
        }
    }

    pub fn add_resource_access(&mut self, agent_id: &str, resource_id: &str) {
        match self.agents.get_mut(agent_id) {
            Some(agt) => agt.acc.push(resource_id.to_string()),
            None => log::debug!("ignoring access grant for unknown agent {agent_id:?}"),
        }
    }

    pub fn set_parameters(&mut self, parameters: SynthesisParameters) {
        self.parameters = parameters;
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    /// Drop every agent and resource, keeping message and parameters.
    pub fn clear_entities(&mut self) {
        self.agents.clear();
        self.resources.clear();
    }
}

/// Copy-on-write holder of the current [`Scenario`].
///
/// Every mutator returns the new snapshot. Snapshots handed out earlier are
/// never changed: a mutation clones the scenario first if a snapshot is alive.
#[derive(Debug, Clone, Default)]
pub struct ScenarioModel {
    current: Arc<Scenario>,
}

impl ScenarioModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_scenario(scenario: Scenario) -> Self {
        Self {
            current: Arc::new(scenario),
        }
    }

    pub fn snapshot(&self) -> Arc<Scenario> {
        Arc::clone(&self.current)
    }

    fn update(&mut self, f: impl FnOnce(&mut Scenario)) -> Arc<Scenario> {
        f(Arc::make_mut(&mut self.current));
        self.snapshot()
    }

    pub fn add_agent(&mut self, agent: Agent) -> Arc<Scenario> {
        self.update(|scn| scn.add_agent(agent))
    }

    pub fn set_agent_demand(&mut self, agent_id: &str, demand: u32) -> Arc<Scenario> {
        self.update(|scn| scn.set_agent_demand(agent_id, demand))
    }

    pub fn remove_agent(&mut self, agent_id: &str) -> Arc<Scenario> {
        self.update(|scn| scn.remove_agent(agent_id))
    }

    pub fn add_resource(&mut self, resource_id: &str) -> Arc<Scenario> {
        self.update(|scn| scn.add_resource(resource_id))
    }

    pub fn remove_resource(&mut self, resource_id: &str) -> Arc<Scenario> {
        self.update(|scn| scn.remove_resource(resource_id))
    }

    pub fn add_resource_access(&mut self, agent_id: &str, resource_id: &str) -> Arc<Scenario> {
        self.update(|scn| scn.add_resource_access(agent_id, resource_id))
    }

    pub fn set_parameters(&mut self, parameters: SynthesisParameters) -> Arc<Scenario> {
        self.update(|scn| scn.set_parameters(parameters))
    }

    pub fn set_message(&mut self, message: &str) -> Arc<Scenario> {
        self.update(|scn| scn.set_message(message))
    }

    pub fn clear_entities(&mut self) -> Arc<Scenario> {
        self.update(Scenario::clear_entities)
    }

    pub fn replace(&mut self, scenario: Scenario) -> Arc<Scenario> {
        self.current = Arc::new(scenario);
        self.snapshot()
    }
}
