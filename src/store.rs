//! Directory-backed experiment store.

use crate::error::ServiceError;
use crate::service::{ExperimentService, Notification, Notifier, Subscription};
use crate::types::{
    ExperimentMetadata, ExperimentRecord, ExperimentResult, ExperimentState, Submission,
};
use chrono::Utc;
use glob::glob;
use indexmap::IndexMap;
use parking_lot::Mutex;
use rmp_serde::{decode, encode};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
};
use uuid::Uuid;

const INDEX_FILE: &str = "metadata.json";

/// Experiment store kept in a single directory.
///
/// Each record lives in `<id>.msgpack`, each result in `res-<id>.msgpack`,
/// and the metadata of all experiments in `metadata.json`.
#[derive(Debug)]
pub struct DirStore {
    root: PathBuf,
    metadata: Mutex<IndexMap<String, ExperimentMetadata>>,
    notifier: Notifier,
}

impl DirStore {
    /// Open the store at `root`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, ServiceError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        let index_file = root.join(INDEX_FILE);
        let metadata = match fs::read(&index_file) {
            Ok(bytes) if bytes.is_empty() => IndexMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                log::info!("no metadata index in {root:?}, starting empty");
                IndexMap::new()
            }
            Err(error) => return Err(error.into()),
        };

        Ok(Self {
            root,
            metadata: Mutex::new(metadata),
            notifier: Notifier::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Mark an experiment successful, store its result and notify listeners.
    pub fn complete(&self, id: &str, result: &ExperimentResult) -> Result<(), ServiceError> {
        self.transition(id, ExperimentState::Successful, Some(result))?;
        log::info!("experiment {id} successful");
        self.notifier
            .emit(Notification::ExperimentSuccessful(id.to_string()));
        Ok(())
    }

    /// Mark an experiment failed and notify listeners.
    pub fn fail(&self, id: &str) -> Result<(), ServiceError> {
        self.transition(id, ExperimentState::Failed, None)?;
        log::info!("experiment {id} failed");
        self.notifier
            .emit(Notification::ExperimentFailed(id.to_string()));
        Ok(())
    }

    /// Delete every stored experiment and return the number of removed files.
    pub fn clean(&self) -> Result<usize, ServiceError> {
        let mut metadata = self.metadata.lock();

        let mut n_removed = 0;
        for pattern in ["*.msgpack", INDEX_FILE] {
            let pattern = self.root.join(pattern);
            let pattern = pattern.to_string_lossy();
            for file in glob(&pattern)?.filter_map(Result::ok) {
                fs::remove_file(&file)?;
                log::debug!("removed {file:?}");
                n_removed += 1;
            }
        }
        metadata.clear();

        Ok(n_removed)
    }

    fn transition(
        &self,
        id: &str,
        state: ExperimentState,
        result: Option<&ExperimentResult>,
    ) -> Result<(), ServiceError> {
        let mut metadata = self.metadata.lock();

        let record_file = self.record_file(id)?;
        let mut record: ExperimentRecord = read_file(&record_file)
            .map_err(|error| not_found_as(error, || ServiceError::NotFound(id.to_string())))?;
        let previous = record.state;

        if let Some(result) = result {
            write_file(&self.result_file(id)?, result)?;
        }
        record.state = state;
        write_file(&record_file, &record)?;

        let mut updated = metadata.clone();
        match updated.get_mut(id) {
            Some(entry) => entry.state = state,
            None => {
                log::warn!("experiment {id} has no metadata entry, recreating it");
                updated.insert(id.to_string(), metadata_of(&record));
            }
        }
        if let Err(error) = self.persist_index(&updated) {
            record.state = previous;
            if let Err(undo) = write_file(&record_file, &record) {
                log::error!("could not restore record of experiment {id}: {undo}");
            }
            return Err(error);
        }

        *metadata = updated;
        Ok(())
    }

    fn record_file(&self, id: &str) -> Result<PathBuf, ServiceError> {
        check_id(id)?;
        Ok(self.root.join(format!("{id}.msgpack")))
    }

    fn result_file(&self, id: &str) -> Result<PathBuf, ServiceError> {
        check_id(id)?;
        Ok(self.root.join(format!("res-{id}.msgpack")))
    }

    fn persist_index(&self, metadata: &IndexMap<String, ExperimentMetadata>) -> Result<(), ServiceError> {
        let file = File::create(self.root.join(INDEX_FILE))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, metadata)?;
        writer.flush()?;
        Ok(())
    }
}

impl ExperimentService for DirStore {
    fn submit(&self, submission: Submission) -> Result<String, ServiceError> {
        let id = Uuid::new_v4().to_string();
        let record = ExperimentRecord::pending(id.clone(), submission);

        let mut metadata = self.metadata.lock();
        let record_file = self.record_file(&id)?;
        write_file(&record_file, &record)?;

        let mut updated = metadata.clone();
        updated.insert(id.clone(), metadata_of(&record));
        if let Err(error) = self.persist_index(&updated) {
            if let Err(undo) = fs::remove_file(&record_file) {
                log::error!("could not remove record of experiment {id}: {undo}");
            }
            return Err(error);
        }
        *metadata = updated;

        log::info!(
            "stored experiment {id} algorithm={} iterations={} timebound={} agents={} resources={}",
            record.algorithm,
            record.number_of_iterations,
            record.timebound,
            record.mra.n_agents(),
            record.mra.n_resources()
        );
        Ok(id)
    }

    fn list_metadata(&self) -> Result<Vec<ExperimentMetadata>, ServiceError> {
        let mut entries: Vec<_> = self.metadata.lock().values().cloned().collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    fn load_record(&self, id: &str) -> Result<ExperimentRecord, ServiceError> {
        read_file(&self.record_file(id)?)
            .map_err(|error| not_found_as(error, || ServiceError::NotFound(id.to_string())))
    }

    fn load_result(&self, id: &str) -> Result<ExperimentResult, ServiceError> {
        read_file(&self.result_file(id)?)
            .map_err(|error| not_found_as(error, || ServiceError::ResultNotFound(id.to_string())))
    }

    fn subscribe(&self) -> Subscription {
        self.notifier.subscribe()
    }
}

fn metadata_of(record: &ExperimentRecord) -> ExperimentMetadata {
    ExperimentMetadata {
        id: record.id.clone(),
        created_at: Utc::now(),
        number_of_agents: record.mra.n_agents(),
        number_of_resources: record.mra.n_resources(),
        state: record.state,
    }
}

fn check_id(id: &str) -> Result<(), ServiceError> {
    if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
        return Err(ServiceError::NotFound(id.to_string()));
    }
    Ok(())
}

fn not_found_as(error: ServiceError, not_found: impl FnOnce() -> ServiceError) -> ServiceError {
    match error {
        ServiceError::Io(io) if io.kind() == ErrorKind::NotFound => not_found(),
        other => other,
    }
}

fn write_file<T: Serialize>(file: &Path, value: &T) -> Result<(), ServiceError> {
    let file = File::create(file)?;
    let mut writer = BufWriter::new(file);
    encode::write_named(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

fn read_file<T: DeserializeOwned>(file: &Path) -> Result<T, ServiceError> {
    let file = File::open(file)?;
    let reader = BufReader::new(file);
    Ok(decode::from_read(reader)?)
}
