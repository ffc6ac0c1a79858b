#![allow(dead_code)]

use chrono::Utc;
use mra_editor::error::ServiceError;
use mra_editor::service::{ExperimentService, Notification, Notifier, Subscription};
use mra_editor::types::{
    ExperimentMetadata, ExperimentRecord, ExperimentResult, ExperimentState, Submission,
};
use parking_lot::Mutex;
use std::collections::HashMap;

/// In-memory service with switchable failures.
#[derive(Default)]
pub struct MemoryService {
    records: Mutex<HashMap<String, ExperimentRecord>>,
    results: Mutex<HashMap<String, ExperimentResult>>,
    submissions: Mutex<Vec<Submission>>,
    next_id: Mutex<u64>,
    offline: Mutex<bool>,
    notifier: Notifier,
}

impl MemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock() = offline;
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().clone()
    }

    pub fn insert_record(&self, record: ExperimentRecord) {
        self.records.lock().insert(record.id.clone(), record);
    }

    pub fn insert_result(&self, id: &str, result: ExperimentResult) {
        self.results.lock().insert(id.to_string(), result);
    }

    pub fn set_state(&self, id: &str, state: ExperimentState) {
        if let Some(record) = self.records.lock().get_mut(id) {
            record.state = state;
        }
        let notification = match state {
            ExperimentState::Successful => Notification::ExperimentSuccessful(id.to_string()),
            ExperimentState::Failed => Notification::ExperimentFailed(id.to_string()),
            ExperimentState::Pending => return,
        };
        self.notifier.emit(notification);
    }

    pub fn n_listeners(&self) -> usize {
        self.notifier.n_listeners()
    }

    fn check_online(&self) -> Result<(), ServiceError> {
        if *self.offline.lock() {
            return Err(ServiceError::Unavailable("offline".to_string()));
        }
        Ok(())
    }
}

impl ExperimentService for MemoryService {
    fn submit(&self, submission: Submission) -> Result<String, ServiceError> {
        self.check_online()?;
        let id = {
            let mut next_id = self.next_id.lock();
            *next_id += 1;
            format!("exp-{}", *next_id)
        };
        self.submissions.lock().push(submission.clone());
        self.insert_record(ExperimentRecord::pending(id.clone(), submission));
        Ok(id)
    }

    fn list_metadata(&self) -> Result<Vec<ExperimentMetadata>, ServiceError> {
        self.check_online()?;
        let mut entries: Vec<_> = self
            .records
            .lock()
            .values()
            .map(|record| ExperimentMetadata {
                id: record.id.clone(),
                created_at: Utc::now(),
                number_of_agents: record.mra.n_agents(),
                number_of_resources: record.mra.n_resources(),
                state: record.state,
            })
            .collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(entries)
    }

    fn load_record(&self, id: &str) -> Result<ExperimentRecord, ServiceError> {
        self.check_online()?;
        self.records
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    fn load_result(&self, id: &str) -> Result<ExperimentResult, ServiceError> {
        self.check_online()?;
        self.results
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::ResultNotFound(id.to_string()))
    }

    fn subscribe(&self) -> Subscription {
        self.notifier.subscribe()
    }
}
