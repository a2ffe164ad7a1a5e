use serde::{Deserialize, Serialize};

use crate::config::{FamilyKind, ScanFamiliesConfig};
use crate::ids::{ScanID, ScanResultID, TargetID};
use crate::scan::FindingsSummary;

/// Lifecycle of one scan job, mirrored per analyzer family and once for the
/// job as a whole (the `general` sub-state).
///
/// `Init` and `Attached` are driven by the orchestrator; `InProgress`,
/// `Done`, `NotScanned` and `Aborted` are reported by the scanner CLI
/// running on the worker instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScanJobState {
    Init,
    Attached,
    InProgress,
    Aborted,
    Done,
    NotScanned,
}

impl ScanJobState {
    /// Terminal states stop the result waiter. `Aborted` is not terminal:
    /// partial results may still be reported after an abort.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanJobState::Done | ScanJobState::NotScanned)
    }
}

/// One sub-state of a target scan: where it is, and what went wrong.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetScanState {
    pub state: ScanJobState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl TargetScanState {
    pub fn new(state: ScanJobState) -> Self {
        Self {
            state,
            errors: Vec::new(),
        }
    }
}

/// Full status of a target scan: the general machine plus one sub-state per
/// analyzer family.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetScanStatus {
    pub general: TargetScanState,
    pub sbom: TargetScanState,
    pub vulnerabilities: TargetScanState,
    pub secrets: TargetScanState,
    pub exploits: TargetScanState,
    pub malware: TargetScanState,
    pub misconfigurations: TargetScanState,
    pub rootkits: TargetScanState,
}

impl TargetScanStatus {
    /// Initial status for a new scan result: general `Init`, each family
    /// `Init` when enabled and `NotScanned` otherwise.
    pub fn initial(families: &ScanFamiliesConfig) -> Self {
        let family_state = |kind| {
            if families.enabled(kind) {
                TargetScanState::new(ScanJobState::Init)
            } else {
                TargetScanState::new(ScanJobState::NotScanned)
            }
        };

        Self {
            general: TargetScanState::new(ScanJobState::Init),
            sbom: family_state(FamilyKind::Sbom),
            vulnerabilities: family_state(FamilyKind::Vulnerabilities),
            secrets: family_state(FamilyKind::Secrets),
            exploits: family_state(FamilyKind::Exploits),
            malware: family_state(FamilyKind::Malware),
            misconfigurations: family_state(FamilyKind::Misconfigurations),
            rootkits: family_state(FamilyKind::Rootkits),
        }
    }

    pub fn family(&self, kind: FamilyKind) -> &TargetScanState {
        match kind {
            FamilyKind::Sbom => &self.sbom,
            FamilyKind::Vulnerabilities => &self.vulnerabilities,
            FamilyKind::Secrets => &self.secrets,
            FamilyKind::Exploits => &self.exploits,
            FamilyKind::Malware => &self.malware,
            FamilyKind::Misconfigurations => &self.misconfigurations,
            FamilyKind::Rootkits => &self.rootkits,
        }
    }

    pub fn family_mut(&mut self, kind: FamilyKind) -> &mut TargetScanState {
        match kind {
            FamilyKind::Sbom => &mut self.sbom,
            FamilyKind::Vulnerabilities => &mut self.vulnerabilities,
            FamilyKind::Secrets => &mut self.secrets,
            FamilyKind::Exploits => &mut self.exploits,
            FamilyKind::Malware => &mut self.malware,
            FamilyKind::Misconfigurations => &mut self.misconfigurations,
            FamilyKind::Rootkits => &mut self.rootkits,
        }
    }

    /// True when any sub-state, general included, carries errors.
    pub fn has_errors(&self) -> bool {
        if !self.general.errors.is_empty() {
            return true;
        }
        FamilyKind::ALL
            .iter()
            .any(|kind| !self.family(*kind).errors.is_empty())
    }
}

/// Partial status update; only supplied sub-states are written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetScanStatusPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general: Option<TargetScanState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sbom: Option<TargetScanState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vulnerabilities: Option<TargetScanState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<TargetScanState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exploits: Option<TargetScanState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub malware: Option<TargetScanState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub misconfigurations: Option<TargetScanState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rootkits: Option<TargetScanState>,
}

impl TargetScanStatusPatch {
    /// Patch that moves the general state only.
    pub fn general_state(state: ScanJobState) -> Self {
        Self {
            general: Some(TargetScanState::new(state)),
            ..Default::default()
        }
    }
}

/// Per-(scan, target) result record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetScanResult {
    /// Assigned by the store on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ScanResultID>,
    pub scan_id: ScanID,
    pub target_id: TargetID,
    pub summary: FindingsSummary,
    pub status: TargetScanStatus,
}

impl TargetScanResult {
    /// Fresh result record for one target of a scan: zeroed summary, initial
    /// status per the enabled families.
    pub fn new(scan_id: ScanID, target_id: TargetID, families: &ScanFamiliesConfig) -> Self {
        Self {
            id: None,
            scan_id,
            target_id,
            summary: FindingsSummary::default(),
            status: TargetScanStatus::initial(families),
        }
    }
}
