//! The scan engine: a bounded-concurrency controller driving one scan job
//! per target through provisioning, result collection, and cleanup.

pub mod clock;
pub mod config;
pub mod controller;
pub mod job;
pub mod pipeline;
pub mod reaper;
pub mod waiter;
pub(crate) mod worker;

pub use clock::{Clock, TokioClock};
pub use config::OrchestratorConfig;
pub use controller::ScanController;
pub use job::{JobCompletion, JobOutcome, JobResources, ScanData, TargetInstance};
pub use pipeline::JobPipeline;
pub use reaper::JobReaper;
pub use waiter::ResultWaiter;
