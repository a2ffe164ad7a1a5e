//! # Stratoscan Model
//!
//! Data model shared between the Stratoscan orchestrator and the backend
//! store: scans and their summaries, per-target scan results and statuses,
//! and the user-facing scan configuration.
//!
//! Everything here is plain data with serde derives; the wire format uses
//! UPPERCASE state values and SCREAMING_SNAKE_CASE reasons so the store,
//! the orchestrator, and the scanner CLI all agree on enum spellings.

pub mod config;
pub mod ids;
pub mod scan;
pub mod target;

pub use config::{
    DeleteJobPolicy, FamilyFlag, FamilyKind, ScanConfig, ScanFamiliesConfig,
    ScannerInstanceCreationConfig,
};
pub use ids::{ScanID, ScanResultID, TargetID};
pub use scan::{
    FindingsSummary, Scan, ScanPatch, ScanState, ScanStateReason, ScanSummary,
    VulnerabilitySummary,
};
pub use target::{
    ScanJobState, TargetScanResult, TargetScanState, TargetScanStatus, TargetScanStatusPatch,
};
