use crate::config::ScenarioConfig;
use crate::controller::ExperimentController;
use crate::editor::Editor;
use crate::store::DirStore;
use crate::types::ExperimentResult;
use anyhow::{Context, Result};
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

pub struct Manager {
    store_dir: PathBuf,
    store: Arc<DirStore>,
    ctrl: ExperimentController<DirStore>,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(store_dir: P) -> Result<Self> {
        let store_dir = store_dir.as_ref().to_path_buf();

        let store = DirStore::open(&store_dir)
            .with_context(|| format!("failed to open store in {store_dir:?}"))?;
        let store = Arc::new(store);
        let ctrl = ExperimentController::new(Arc::clone(&store));

        Ok(Self {
            store_dir,
            store,
            ctrl,
        })
    }

    pub fn submit_scenario<P: AsRef<Path>>(&self, file: P) -> Result<String> {
        let file = file.as_ref();
        let cfg = ScenarioConfig::from_file(file)
            .with_context(|| format!("failed to load scenario {file:?}"))?;
        log::info!("{cfg:#?}");

        let editor = cfg.build().context("failed to build scenario")?;
        let experiment = self
            .ctrl
            .submit(&editor)
            .context("failed to submit scenario")?;

        println!("{}", experiment.id);
        Ok(experiment.id)
    }

    pub fn list_experiments(&self) -> Result<()> {
        let metadata = self
            .ctrl
            .list_metadata()
            .context("failed to list experiments")?;
        log::info!("found {} experiments in {:?}", metadata.len(), self.store_dir);

        for entry in metadata {
            println!(
                "{} {} {:<10} agents={} resources={}",
                entry.id,
                entry.created_at.to_rfc3339(),
                entry.state.to_string(),
                entry.number_of_agents,
                entry.number_of_resources
            );
        }
        Ok(())
    }

    pub fn show_experiment(&self, id: &str) -> Result<()> {
        let mut editor = Editor::new();
        let scenario = self
            .ctrl
            .load_for_edit(id, &mut editor)
            .with_context(|| format!("failed to load experiment {id}"))?;

        let params = &scenario.parameters;
        println!("algorithm: {}", params.algorithm);
        if params.algorithm.uses_iterations() {
            println!("iterations: {}", params.number_of_iterations);
        }
        println!("timebound: {}", params.timebound);
        println!("message: {}", scenario.message);
        for agt in scenario.agents.values() {
            println!(
                "agent {} demand={} acc=[{}]",
                agt.id(),
                agt.demand(),
                agt.acc().join(", ")
            );
        }
        for res in &scenario.resources {
            println!("resource {res}");
        }
        println!(
            "graph: {} nodes, {} edges",
            editor.graph().nodes().len(),
            editor.graph().edges().len()
        );
        Ok(())
    }

    pub fn show_path(&self, id: &str) -> Result<()> {
        let path = self
            .ctrl
            .load_result(id)
            .with_context(|| format!("failed to load result of experiment {id}"))?;
        print!("{}", path.render());
        Ok(())
    }

    pub fn complete_experiment<P: AsRef<Path>>(&self, id: &str, result_file: P) -> Result<()> {
        let result_file = result_file.as_ref();
        let file = File::open(result_file)
            .with_context(|| format!("failed to open {result_file:?}"))?;
        let result: ExperimentResult = serde_json::from_reader(BufReader::new(file))
            .context("failed to deserialize result")?;

        self.store
            .complete(id, &result)
            .with_context(|| format!("failed to complete experiment {id}"))?;
        Ok(())
    }

    pub fn fail_experiment(&self, id: &str) -> Result<()> {
        self.store
            .fail(id)
            .with_context(|| format!("failed to mark experiment {id} failed"))?;
        Ok(())
    }

    pub fn clean_store(&self) -> Result<()> {
        let n_removed = self.store.clean().context("failed to clean store")?;
        log::info!("removed {n_removed} files from {:?}", self.store_dir);
        Ok(())
    }
}
