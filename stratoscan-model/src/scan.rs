use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::ScanID;

/// Coarse lifecycle of a scan as stored by the backend.
///
/// `Aborted` is set externally (user request) while the scan is running; the
/// orchestrator folds it into a terminal `Failed` on the final patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScanState {
    Pending,
    InProgress,
    Aborted,
    Failed,
    Done,
}

/// Why a scan ended up in its terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanStateReason {
    Success,
    OneOrMoreTargetsFailed,
    Aborted,
    TimedOut,
    Unexpected,
}

/// Vulnerability counts broken down by severity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilitySummary {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
    pub negligible: u32,
}

impl VulnerabilitySummary {
    /// Severity-wise addition. Each lane sums with its own lane only.
    pub fn add(&mut self, other: &VulnerabilitySummary) {
        self.critical += other.critical;
        self.high += other.high;
        self.medium += other.medium;
        self.low += other.low;
        self.negligible += other.negligible;
    }

    pub fn total(&self) -> u32 {
        self.critical + self.high + self.medium + self.low + self.negligible
    }
}

/// Finding counts reported for a single target, and aggregated per scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingsSummary {
    pub exploits: u32,
    pub malware: u32,
    pub misconfigurations: u32,
    pub packages: u32,
    pub rootkits: u32,
    pub secrets: u32,
    pub vulnerabilities: VulnerabilitySummary,
}

impl FindingsSummary {
    pub fn add(&mut self, other: &FindingsSummary) {
        self.exploits += other.exploits;
        self.malware += other.malware;
        self.misconfigurations += other.misconfigurations;
        self.packages += other.packages;
        self.rootkits += other.rootkits;
        self.secrets += other.secrets;
        self.vulnerabilities.add(&other.vulnerabilities);
    }
}

/// Scan-level summary: aggregated findings plus job progress counters.
///
/// Invariant: `jobs_completed + jobs_left_to_run` equals the scan's target
/// count at all times.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub jobs_completed: u32,
    pub jobs_left_to_run: u32,
    #[serde(flatten)]
    pub findings: FindingsSummary,
}

impl ScanSummary {
    /// Initial summary for a scan over `total_targets` targets.
    pub fn for_targets(total_targets: u32) -> Self {
        Self {
            jobs_completed: 0,
            jobs_left_to_run: total_targets,
            findings: FindingsSummary::default(),
        }
    }

    /// Fold one completed target's findings into the scan summary.
    pub fn absorb_result(&mut self, result: &FindingsSummary) {
        self.jobs_completed += 1;
        self.jobs_left_to_run = self.jobs_left_to_run.saturating_sub(1);
        self.findings.add(result);
    }
}

/// Top-level scan record as read from the backend store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    pub id: ScanID,
    pub state: ScanState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_reason: Option<ScanStateReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_message: Option<String>,
    pub summary: ScanSummary,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

/// Partial scan update; only supplied fields are written by the store
/// (last-writer-wins per field).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ScanState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_reason: Option<ScanStateReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ScanSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}
