//! Data carried through one scan job's lifecycle.

use std::fmt;
use std::sync::Arc;

use stratoscan_model::{ScanResultID, TargetID};

use crate::provider::{Instance, Snapshot, Volume};

/// A scannable workload: the store-side target identifier plus the live
/// provider handle for its instance.
#[derive(Clone)]
pub struct TargetInstance {
    pub target_id: TargetID,
    pub instance: Arc<dyn Instance>,
}

impl fmt::Debug for TargetInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetInstance")
            .field("target_id", &self.target_id)
            .field("instance", &self.instance.id())
            .finish()
    }
}

/// Controller-owned record for one target of a scan. Immutable once built;
/// progress flows back to the controller as [`JobCompletion`] messages.
#[derive(Clone)]
pub struct ScanData {
    pub target: TargetInstance,
    pub scan_result_id: ScanResultID,
}

impl fmt::Debug for ScanData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanData")
            .field("target", &self.target)
            .field("scan_result_id", &self.scan_result_id)
            .finish()
    }
}

/// Cloud resources provisioned for one scan job. Used exclusively for
/// cleanup; never persisted. Every resource is recorded here before the
/// next fallible pipeline step so the reaper can always find it.
#[derive(Default)]
pub struct JobResources {
    pub instance: Option<Arc<dyn Instance>>,
    pub src_snapshot: Option<Arc<dyn Snapshot>>,
    pub dst_snapshot: Option<Arc<dyn Snapshot>>,
    pub volume: Option<Arc<dyn Volume>>,
}

impl JobResources {
    pub fn is_empty(&self) -> bool {
        self.instance.is_none()
            && self.src_snapshot.is_none()
            && self.dst_snapshot.is_none()
            && self.volume.is_none()
    }
}

impl fmt::Debug for JobResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobResources")
            .field("instance", &self.instance.as_ref().map(|i| i.id()))
            .field("src_snapshot", &self.src_snapshot.as_ref().map(|s| s.id()))
            .field("dst_snapshot", &self.dst_snapshot.as_ref().map(|s| s.id()))
            .field("volume", &self.volume.as_ref().map(|v| v.id()))
            .finish()
    }
}

/// How one scan job ended.
///
/// `completed = false` means the job never reached a verdict (cancellation,
/// or a target that was already terminal on arrival); the reaper treats
/// such jobs as orphans and always tears them down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JobOutcome {
    pub success: bool,
    pub completed: bool,
    pub timeout: bool,
}

impl JobOutcome {
    pub fn completed(success: bool) -> Self {
        Self {
            success,
            completed: true,
            timeout: false,
        }
    }

    pub fn timed_out() -> Self {
        Self {
            success: false,
            completed: true,
            timeout: true,
        }
    }
}

/// Message a worker sends the controller when a job finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JobCompletion {
    pub target_id: TargetID,
    pub outcome: JobOutcome,
}
