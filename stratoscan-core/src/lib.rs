//! # Stratoscan Core
//!
//! Agentless VM scanning engine. Given a fleet of running targets, the
//! orchestrator snapshots each target's root volume, mounts the snapshot on
//! a disposable scanner instance, runs the configured analyzer families
//! against it, records findings in the backend store, and reclaims every
//! cloud resource it provisioned.
//!
//! ## Architecture
//!
//! - [`provider`]: trait seams over the cloud primitives (instances,
//!   volumes, snapshots) and scanner-instance launches.
//! - [`store`]: the backend store the orchestrator and scanner CLIs share,
//!   consumed over HTTP.
//! - [`families`]: translation of the user's analyzer-family toggles into
//!   the YAML configuration document handed to the scanner CLI.
//! - [`orchestration`]: the scan engine itself: controller, worker pool,
//!   job pipeline, result waiter, and job reaper.

pub mod error;
pub mod families;
pub mod orchestration;
pub mod provider;
pub mod store;

pub use error::{Result, ScanError};
pub use orchestration::{
    config::OrchestratorConfig,
    controller::ScanController,
    job::{JobCompletion, JobOutcome, JobResources, ScanData, TargetInstance},
};
pub use provider::{Instance, Provider, Region, ScanningJobConfig, Snapshot, Volume};
pub use store::{BackendStore, CreatedScanResult, HttpBackendStore};
