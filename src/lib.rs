//! Build multi-agent resource allocation scenarios, submit them for
//! synthesis and inspect the returned paths.
//!
//! The [`Editor`] keeps an editable agent/resource graph in lockstep with the
//! [`Scenario`] it describes. The [`ExperimentController`] moves scenarios to
//! and from an [`ExperimentService`], and [`PathGraph`] turns a solver result
//! into a linear graph of resource-state snapshots.

pub mod config;
pub mod controller;
pub mod editor;
pub mod error;
pub mod graph;
pub mod ids;
pub mod manager;
pub mod model;
pub mod params;
pub mod path;
pub mod service;
pub mod store;
pub mod types;
mod utils;

pub use controller::{ExperimentController, MetadataBoard, SubmittedExperiment};
pub use editor::Editor;
pub use error::{EditError, ExperimentError, ServiceError};
pub use graph::{EntityRef, Graph};
pub use ids::{IdAllocator, Role};
pub use model::{Agent, Scenario, ScenarioModel};
pub use params::{Algorithm, SynthesisParameters};
pub use path::PathGraph;
pub use service::{ExperimentService, Notification, Subscription};
pub use store::DirStore;
