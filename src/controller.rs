//! Experiment lifecycle: submission, loading and result inspection.

use crate::editor::Editor;
use crate::error::{ExperimentError, ServiceError};
use crate::model::Scenario;
use crate::params::SynthesisParameters;
use crate::path::PathGraph;
use crate::service::{ExperimentService, Notification, Subscription};
use crate::types::{ExperimentMetadata, ExperimentState, Submission, WireMra};
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use uuid::Uuid;

/// Experiment submitted from this session.
///
/// Starts out pending. Later states are only ever taken from metadata
/// reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedExperiment {
    pub id: String,
    pub state: ExperimentState,
}

impl SubmittedExperiment {
    /// Adopt the state reported for this experiment in `metadata`, if any.
    ///
    /// Returns whether the state changed.
    pub fn observe(&mut self, metadata: &[ExperimentMetadata]) -> bool {
        match metadata.iter().find(|entry| entry.id == self.id) {
            Some(entry) if entry.state != self.state => {
                log::info!("experiment {} is now {}", self.id, entry.state);
                self.state = entry.state;
                true
            }
            _ => false,
        }
    }
}

/// Drives experiments through the service on behalf of an editor.
pub struct ExperimentController<S> {
    service: Arc<S>,
}

impl<S: ExperimentService> ExperimentController<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// Send the editor's scenario for solving.
    ///
    /// The editor is only read, so it stays editable whatever the outcome.
    pub fn submit(&self, editor: &Editor) -> Result<SubmittedExperiment, ExperimentError> {
        let scenario = editor.scenario();

        let mut mra = WireMra::from_scenario(&scenario);
        mra.id = Some(Uuid::new_v4().to_string());
        let submission = Submission::new(mra, scenario.parameters.to_wire(), scenario.message.clone());

        let id = self.service.submit(submission).map_err(|error| {
            log::error!("could not submit experiment: {error}");
            ExperimentError::Submission(error)
        })?;
        log::info!("submitted experiment {id}");

        Ok(SubmittedExperiment {
            id,
            state: ExperimentState::Pending,
        })
    }

    pub fn list_metadata(&self) -> Result<Vec<ExperimentMetadata>, ExperimentError> {
        self.service.list_metadata().map_err(ExperimentError::Load)
    }

    /// Replace the editor's session with a stored experiment.
    ///
    /// On failure the editor is left as it was.
    pub fn load_for_edit(
        &self,
        id: &str,
        editor: &mut Editor,
    ) -> Result<Arc<Scenario>, ExperimentError> {
        let record = self.service.load_record(id).map_err(|error| {
            log::error!("could not load experiment {id}: {error}");
            ExperimentError::Load(error)
        })?;

        let parameters = SynthesisParameters::from_wire(
            &record.algorithm,
            &record.number_of_iterations,
            &record.timebound,
        )
        .map_err(|source| ExperimentError::MalformedRecord {
            id: id.to_string(),
            source,
        })?;

        let scenario = record.mra.into_scenario(parameters, record.message);
        Ok(editor.load_from_scenario(&scenario))
    }

    /// Fetch the result of a solved experiment as a path graph.
    pub fn load_result(&self, id: &str) -> Result<PathGraph, ExperimentError> {
        let result = self.service.load_result(id).map_err(|error| {
            log::error!("could not load result of experiment {id}: {error}");
            ExperimentError::Load(error)
        })?;
        Ok(PathGraph::from_result(&result))
    }

    /// Open a metadata view that refreshes on every completion notification.
    pub fn watch(&self) -> MetadataBoard<S> {
        MetadataBoard::new(Arc::clone(&self.service))
    }
}

/// Last fetched experiment metadata, kept up to date from notifications.
///
/// Dropping the board stops listening.
pub struct MetadataBoard<S> {
    service: Arc<S>,
    metadata: Mutex<Vec<ExperimentMetadata>>,
    subscription: Mutex<Subscription>,
    n_refreshes: AtomicUsize,
}

impl<S: ExperimentService> MetadataBoard<S> {
    pub fn new(service: Arc<S>) -> Self {
        let subscription = service.subscribe();
        Self {
            service,
            metadata: Mutex::new(Vec::new()),
            subscription: Mutex::new(subscription),
            n_refreshes: AtomicUsize::new(0),
        }
    }

    pub fn metadata(&self) -> Vec<ExperimentMetadata> {
        self.metadata.lock().clone()
    }

    pub fn n_refreshes(&self) -> usize {
        self.n_refreshes.load(Ordering::SeqCst)
    }

    /// Fetch the full metadata list and replace the current one.
    ///
    /// Refreshes are not ordered against each other; the last one to finish wins.
    pub fn refresh(&self) -> Result<usize, ServiceError> {
        let fetched = self.service.list_metadata()?;
        let n_entries = fetched.len();
        *self.metadata.lock() = fetched;
        self.n_refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(n_entries)
    }

    /// Handle pending notifications, refreshing once per notification.
    ///
    /// Returns the notifications handled.
    pub fn pump(&self) -> Result<Vec<Notification>, ServiceError> {
        let notifications = self.subscription.lock().drain();
        for notification in &notifications {
            log::debug!("refreshing metadata after {notification:?}");
            self.refresh()?;
        }
        Ok(notifications)
    }
}
