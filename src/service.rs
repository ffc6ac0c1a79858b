//! Interface to the experiment solving and storage service.

use crate::error::ServiceError;
use crate::types::{ExperimentMetadata, ExperimentRecord, ExperimentResult, Submission};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    sync::{
        Arc, Weak,
        mpsc::{self, Receiver, Sender},
    },
};

/// Operations the editor needs from the service.
pub trait ExperimentService: Send + Sync {
    /// Store and enqueue a submission, returning the id the service assigned.
    fn submit(&self, submission: Submission) -> Result<String, ServiceError>;

    fn list_metadata(&self) -> Result<Vec<ExperimentMetadata>, ServiceError>;

    fn load_record(&self, id: &str) -> Result<ExperimentRecord, ServiceError>;

    fn load_result(&self, id: &str) -> Result<ExperimentResult, ServiceError>;

    /// Listen for solver completion notifications.
    fn subscribe(&self) -> Subscription;
}

/// Completion notice pushed by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    ExperimentSuccessful(String),
    ExperimentFailed(String),
}

impl Notification {
    pub fn id(&self) -> &str {
        match self {
            Self::ExperimentSuccessful(id) | Self::ExperimentFailed(id) => id,
        }
    }
}

#[derive(Debug, Default)]
struct Listeners {
    next_key: u64,
    senders: HashMap<u64, Sender<Notification>>,
}

/// Fan-out of notifications to every live [`Subscription`].
#[derive(Debug, Default)]
pub struct Notifier {
    listeners: Arc<Mutex<Listeners>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::channel();
        let mut listeners = self.listeners.lock();
        let key = listeners.next_key;
        listeners.next_key += 1;
        listeners.senders.insert(key, sender);
        Subscription {
            key,
            receiver,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Deliver `notification` to every listener, pruning disconnected ones.
    pub fn emit(&self, notification: Notification) {
        let mut listeners = self.listeners.lock();
        listeners
            .senders
            .retain(|_, sender| sender.send(notification.clone()).is_ok());
        log::debug!(
            "delivered {notification:?} to {} listeners",
            listeners.senders.len()
        );
    }

    pub fn n_listeners(&self) -> usize {
        self.listeners.lock().senders.len()
    }
}

/// Registered listener. Dropping it unregisters the listener.
#[derive(Debug)]
pub struct Subscription {
    key: u64,
    receiver: Receiver<Notification>,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// Take every notification received so far, in arrival order.
    pub fn drain(&self) -> Vec<Notification> {
        self.receiver.try_iter().collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.lock().senders.remove(&self.key);
        }
    }
}
