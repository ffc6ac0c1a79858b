//! Wire types exchanged with the experiment service.
//!
//! Field names match the external protocol. Optional scenario fields are
//! treated as empty when absent.

use crate::model::{Agent, Scenario};
use crate::params::{SynthesisParameters, WireParameters};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAgent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demand: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acc: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMra {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents: Option<Vec<WireAgent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<String>>,
}

impl WireMra {
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let agents = scenario
            .agents
            .values()
            .map(|agt| WireAgent {
                id: Some(agt.id().to_string()),
                demand: Some(agt.demand()),
                acc: Some(agt.acc().to_vec()),
            })
            .collect();
        Self {
            id: None,
            agents: Some(agents),
            resources: Some(scenario.resources.iter().cloned().collect()),
        }
    }

    pub fn n_agents(&self) -> usize {
        self.agents.as_ref().map_or(0, Vec::len)
    }

    pub fn n_resources(&self) -> usize {
        self.resources.as_ref().map_or(0, Vec::len)
    }

    /// Build a [`Scenario`] carrying the given parameters and message.
    ///
    /// Agents sharing an id collapse onto the last one.
    pub fn into_scenario(self, parameters: SynthesisParameters, message: String) -> Scenario {
        let mut scenario = Scenario::new();
        for res in self.resources.unwrap_or_default() {
            scenario.add_resource(res);
        }
        for agt in self.agents.unwrap_or_default() {
            let id = agt.id.unwrap_or_default();
            if scenario.agent(&id).is_some() {
                log::warn!("agent {id:?} appears more than once, keeping the last one");
            }
            scenario.add_agent(Agent::new(
                id,
                agt.demand.unwrap_or_default(),
                agt.acc.unwrap_or_default(),
            ));
        }
        scenario.set_parameters(parameters);
        scenario.set_message(message);
        scenario
    }
}

/// Lifecycle state of a submitted experiment, owned by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperimentState {
    Pending,
    Successful,
    Failed,
}

impl fmt::Display for ExperimentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "Pending",
            Self::Successful => "Successful",
            Self::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// Scenario as sent for solving, with parameters in string form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub mra: WireMra,
    pub algorithm: String,
    pub number_of_iterations: String,
    pub timebound: String,
    pub message: String,
}

impl Submission {
    pub fn new(mra: WireMra, parameters: WireParameters, message: String) -> Self {
        Self {
            mra,
            algorithm: parameters.algorithm,
            number_of_iterations: parameters.number_of_iterations,
            timebound: parameters.timebound,
            message,
        }
    }
}

/// Persisted form of a submitted scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentRecord {
    pub id: String,
    pub algorithm: String,
    pub number_of_iterations: String,
    pub timebound: String,
    #[serde(default)]
    pub mra: WireMra,
    #[serde(default)]
    pub message: String,
    pub state: ExperimentState,
}

impl ExperimentRecord {
    /// Record for a fresh submission. Its state starts as pending.
    pub fn pending(id: String, submission: Submission) -> Self {
        Self {
            id,
            algorithm: submission.algorithm,
            number_of_iterations: submission.number_of_iterations,
            timebound: submission.timebound,
            mra: submission.mra,
            message: submission.message,
            state: ExperimentState::Pending,
        }
    }
}

/// Read-only summary of an experiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentMetadata {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub number_of_agents: usize,
    pub number_of_resources: usize,
    pub state: ExperimentState,
}

/// Resource states at one step, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceState {
    #[serde(rename = "resourceIDs", default)]
    pub resource_ids: Vec<String>,
    #[serde(rename = "resourceStates", default)]
    pub resource_states: Vec<i64>,
}

/// Actions taken by agents during one step, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionList {
    #[serde(rename = "agentIDs", default)]
    pub agent_ids: Vec<i64>,
    #[serde(default)]
    pub actions: Vec<String>,
}

/// Path returned by the solver: `n` action steps between `n + 1` snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentResult {
    #[serde(default)]
    pub resource_states: Vec<ResourceState>,
    #[serde(default)]
    pub action_list: Vec<ActionList>,
}
