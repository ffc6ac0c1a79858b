use crate::editor::Editor;
use crate::graph::EntityRef;
use crate::params::SynthesisParameters;
use crate::utils::{check_num, check_unique};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

/// Agent entry of a scenario file.
#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Name used to refer to the agent within the file.
    pub name: String,
    /// Resource demand.
    #[serde(default)]
    pub demand: u32,
    /// Names of the resources the agent may access, in grant order.
    #[serde(default)]
    pub access: Vec<String>,
}

/// Scenario definition.
///
/// Loaded from a TOML file and validated before use.
/// See [`ScenarioConfig::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Free-text message sent along with the scenario.
    #[serde(default)]
    pub message: String,

    /// Solver parameters.
    #[serde(default)]
    pub parameters: SynthesisParameters,

    /// Resource names.
    #[serde(default)]
    pub resources: Vec<String>,
    /// Agents.
    #[serde(default)]
    pub agents: Vec<AgentConfig>,
}

impl ScenarioConfig {
    /// Load a [`ScenarioConfig`] from a file.
    ///
    /// The file must be TOML-encoded.
    /// Performs validation on all fields before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the scenario is invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents = fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml(&contents)
    }

    /// Parse and validate a [`ScenarioConfig`] from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: ScenarioConfig =
            toml::from_str(contents).context("failed to deserialize scenario")?;

        cfg.validate().context("failed to validate scenario")?;

        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        let params = &self.parameters;
        check_num(params.timebound, 1..10_000).context("invalid timebound")?;
        if params.algorithm.uses_iterations() {
            check_num(params.number_of_iterations, 1..10_000)
                .context("invalid number of iterations")?;
        }

        check_num(self.resources.len(), 0..=1000).context("invalid number of resources")?;
        check_num(self.agents.len(), 0..=1000).context("invalid number of agents")?;

        check_unique(&self.resources).context("invalid resource names")?;
        check_unique(self.agents.iter().map(|agt| &agt.name)).context("invalid agent names")?;

        for agt in &self.agents {
            check_num(agt.demand, 0..1_000_000)
                .with_context(|| format!("invalid demand of agent {:?}", agt.name))?;
            for res in &agt.access {
                if !self.resources.contains(res) {
                    bail!("agent {:?} accesses undeclared resource {res:?}", agt.name);
                }
            }
        }

        Ok(())
    }

    /// Build an editing session holding this scenario.
    ///
    /// Entities are created through the editor, so ids follow allocation order.
    pub fn build(&self) -> Result<Editor> {
        let mut editor = Editor::new();
        editor.set_parameters(self.parameters);
        editor.set_message(&self.message);

        let mut resource_ids = HashMap::with_capacity(self.resources.len());
        for name in &self.resources {
            resource_ids.insert(name.as_str(), editor.add_resource());
        }

        for agt in &self.agents {
            let agent_id = editor.add_agent();
            editor.set_agent_demand(&agent_id, agt.demand);
            for res in &agt.access {
                let resource_id = resource_ids
                    .get(res.as_str())
                    .with_context(|| format!("unknown resource {res:?}"))?;
                editor
                    .connect(EntityRef::agent(&agent_id), EntityRef::resource(resource_id))
                    .with_context(|| format!("failed to grant {:?} access to {res:?}", agt.name))?;
            }
        }

        Ok(editor)
    }
}
