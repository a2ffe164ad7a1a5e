//! Backend store access.
//!
//! The store owns every scan, scan result, and target scan status; the
//! orchestrator and the scanner CLIs reconcile through it. Reads are
//! optimistic, writes are PATCH-shaped (last-writer-wins on supplied
//! fields).

pub mod http;
pub mod retry;

use async_trait::async_trait;

use stratoscan_model::{
    FindingsSummary, Scan, ScanID, ScanPatch, ScanResultID, TargetScanResult, TargetScanStatus,
    TargetScanStatusPatch,
};

use crate::error::Result;

pub use http::HttpBackendStore;

/// Outcome of creating a scan result: either a fresh record, or the
/// identifier of a record that already existed for the same (scan, target)
/// pair. Conflicts make the create idempotent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreatedScanResult {
    Created(ScanResultID),
    Conflict(ScanResultID),
}

impl CreatedScanResult {
    pub fn id(&self) -> ScanResultID {
        match self {
            CreatedScanResult::Created(id) | CreatedScanResult::Conflict(id) => *id,
        }
    }
}

#[async_trait]
pub trait BackendStore: Send + Sync {
    async fn get_scan(&self, id: ScanID) -> Result<Scan>;

    async fn patch_scan(&self, id: ScanID, patch: &ScanPatch) -> Result<()>;

    async fn post_scan_result(&self, result: &TargetScanResult) -> Result<CreatedScanResult>;

    async fn get_scan_result_summary(&self, id: ScanResultID) -> Result<FindingsSummary>;

    async fn get_scan_result_status(&self, id: ScanResultID) -> Result<TargetScanStatus>;

    async fn patch_scan_result_status(
        &self,
        id: ScanResultID,
        patch: &TargetScanStatusPatch,
    ) -> Result<()>;
}
