//! Error types.
//!
//! Nothing here is fatal: every failing operation leaves the scenario and the
//! display graph as they were before the call.

use crate::graph::EntityRef;
use crate::params::ParamError;

/// Rejected editor operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// Both endpoints are agents or both are resources.
    #[error("invalid connection between {from} and {to}: can only connect agents to resources")]
    InvalidConnection { from: EntityRef, to: EntityRef },
}

/// Failure reported by the experiment service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("experiment {0} not found")]
    NotFound(String),

    #[error("result for experiment {0} not found")]
    ResultNotFound(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("i/o failure")]
    Io(#[from] std::io::Error),

    #[error("failed to encode payload")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("failed to decode payload")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("failed to process metadata index")]
    Json(#[from] serde_json::Error),

    #[error("invalid glob pattern")]
    Pattern(#[from] glob::PatternError),
}

/// Failure of an experiment lifecycle operation.
#[derive(Debug, thiserror::Error)]
pub enum ExperimentError {
    #[error("failed to submit experiment")]
    Submission(#[source] ServiceError),

    #[error("failed to load experiment")]
    Load(#[source] ServiceError),

    #[error("malformed experiment record {id}")]
    MalformedRecord {
        id: String,
        #[source]
        source: ParamError,
    },
}

impl ExperimentError {
    /// Whether retrying the same call may succeed.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Submission(_) | Self::Load(_))
    }
}
