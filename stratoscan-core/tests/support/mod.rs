//! Test doubles for the orchestration scenarios: a scripted fake provider
//! and an in-memory backend store that plays the scanner CLI's part.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use stratoscan_core::{
    BackendStore, CreatedScanResult, Instance, Provider, Region, Result, ScanError,
    ScanningJobConfig, Snapshot, TargetInstance, Volume,
};
use stratoscan_model::{
    FindingsSummary, Scan, ScanID, ScanJobState, ScanPatch, ScanResultID, ScanState, ScanSummary,
    TargetID, TargetScanResult, TargetScanState, TargetScanStatus, TargetScanStatusPatch,
};

/// Route engine logs through the test harness; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// Fake provider

/// Shared observation point for everything the fake provider does.
#[derive(Default)]
pub struct ProviderState {
    deleted: Mutex<Vec<String>>,
    launched: Mutex<Vec<(String, String)>>,
    fail_attach_marker: Mutex<Option<String>>,
    snapshots_inflight: Mutex<usize>,
    snapshots_max_inflight: Mutex<usize>,
}

impl ProviderState {
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn deletes_of(&self, id: &str) -> usize {
        self.deleted
            .lock()
            .unwrap()
            .iter()
            .filter(|deleted| deleted.as_str() == id)
            .count()
    }

    /// Scanner launches as (instance id, region) pairs.
    pub fn launched(&self) -> Vec<(String, String)> {
        self.launched.lock().unwrap().clone()
    }

    pub fn max_snapshot_concurrency(&self) -> usize {
        *self.snapshots_max_inflight.lock().unwrap()
    }

    /// Make every attach fail for resources whose snapshot id contains the
    /// marker (use the target's instance id).
    pub fn fail_attach_for(&self, instance_id: &str) {
        *self.fail_attach_marker.lock().unwrap() = Some(instance_id.to_string());
    }

    fn record_delete(&self, id: &str) {
        self.deleted.lock().unwrap().push(id.to_string());
    }

    fn enter_snapshot(&self) {
        let mut inflight = self.snapshots_inflight.lock().unwrap();
        *inflight += 1;
        let mut max = self.snapshots_max_inflight.lock().unwrap();
        if *inflight > *max {
            *max = *inflight;
        }
    }

    fn leave_snapshot(&self) {
        *self.snapshots_inflight.lock().unwrap() -= 1;
    }

    fn attach_should_fail(&self, scanner_id: &str) -> bool {
        self.fail_attach_marker
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|marker| scanner_id.contains(marker.as_str()))
    }
}

pub struct FakeProvider {
    state: Arc<ProviderState>,
}

impl FakeProvider {
    pub fn new(state: Arc<ProviderState>) -> Arc<Self> {
        Arc::new(Self { state })
    }
}

#[async_trait]
impl Provider for FakeProvider {
    async fn run_scanning_job(
        &self,
        region: &Region,
        snapshot_id: &str,
        _config: ScanningJobConfig,
    ) -> Result<Box<dyn Instance>> {
        let id = format!("scanner-{snapshot_id}");
        self.state
            .launched
            .lock()
            .unwrap()
            .push((id.clone(), region.to_string()));
        Ok(Box::new(FakeInstance {
            id,
            region: region.clone(),
            state: Arc::clone(&self.state),
        }))
    }
}

/// Build a target whose fake resources all derive their ids from
/// `i-<index>` so tests can assert exact delete sets.
pub fn target(state: &Arc<ProviderState>, index: usize, region: &str) -> TargetInstance {
    TargetInstance {
        target_id: TargetID::new(),
        instance: Arc::new(FakeInstance {
            id: format!("i-{index}"),
            region: Region::new(region),
            state: Arc::clone(state),
        }),
    }
}

pub struct FakeInstance {
    id: String,
    region: Region,
    state: Arc<ProviderState>,
}

#[async_trait]
impl Instance for FakeInstance {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn region(&self) -> Region {
        self.region.clone()
    }

    fn availability_zone(&self) -> String {
        format!("{}a", self.region)
    }

    async fn root_volume(&self) -> Result<Box<dyn Volume>> {
        Ok(Box::new(FakeVolume {
            id: format!("vol-{}", self.id),
            region: self.region.clone(),
            state: Arc::clone(&self.state),
        }))
    }

    async fn wait_for_ready(&self) -> Result<()> {
        Ok(())
    }

    async fn attach_volume(&self, _volume: &dyn Volume, _device_name: &str) -> Result<()> {
        if self.state.attach_should_fail(&self.id) {
            return Err(ScanError::Provider(format!(
                "cannot attach volume to {}",
                self.id
            )));
        }
        Ok(())
    }

    async fn delete(&self) -> Result<()> {
        self.state.record_delete(&self.id);
        Ok(())
    }
}

pub struct FakeVolume {
    id: String,
    region: Region,
    state: Arc<ProviderState>,
}

#[async_trait]
impl Volume for FakeVolume {
    fn id(&self) -> String {
        self.id.clone()
    }

    async fn take_snapshot(&self) -> Result<Box<dyn Snapshot>> {
        // Hold the snapshot slot briefly so pipeline concurrency is
        // observable.
        self.state.enter_snapshot();
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.state.leave_snapshot();

        Ok(Box::new(FakeSnapshot {
            id: format!("snap-{}", self.id),
            region: self.region.clone(),
            state: Arc::clone(&self.state),
        }))
    }

    async fn wait_for_ready(&self) -> Result<()> {
        Ok(())
    }

    async fn wait_for_attached(&self) -> Result<()> {
        Ok(())
    }

    async fn delete(&self) -> Result<()> {
        self.state.record_delete(&self.id);
        Ok(())
    }
}

pub struct FakeSnapshot {
    id: String,
    region: Region,
    state: Arc<ProviderState>,
}

#[async_trait]
impl Snapshot for FakeSnapshot {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn region(&self) -> Region {
        self.region.clone()
    }

    async fn wait_for_ready(&self) -> Result<()> {
        Ok(())
    }

    async fn copy(&self, region: &Region) -> Result<Box<dyn Snapshot>> {
        Ok(Box::new(FakeSnapshot {
            id: format!("{}-copy", self.id),
            region: region.clone(),
            state: Arc::clone(&self.state),
        }))
    }

    async fn create_volume(&self, _availability_zone: &str) -> Result<Box<dyn Volume>> {
        Ok(Box::new(FakeVolume {
            id: format!("vol-from-{}", self.id),
            region: self.region.clone(),
            state: Arc::clone(&self.state),
        }))
    }

    async fn delete(&self) -> Result<()> {
        self.state.record_delete(&self.id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory store

/// What the simulated scanner CLI does once the orchestrator marks a
/// target ATTACHED.
#[derive(Clone, Debug)]
pub enum CliBehavior {
    /// Report the given findings and finish every enabled family.
    CompleteWith(FindingsSummary),
    /// Move to INPROGRESS and never finish (stuck scanner).
    StayInProgress,
}

#[derive(Default)]
struct StoreState {
    scans: HashMap<ScanID, Scan>,
    results: HashMap<ScanResultID, TargetScanResult>,
}

pub struct InMemoryStore {
    state: Mutex<StoreState>,
    behavior: CliBehavior,
}

impl InMemoryStore {
    pub fn new(behavior: CliBehavior) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(StoreState::default()),
            behavior,
        })
    }

    /// Seed a fresh scan covering `total_targets` targets and return its id.
    pub fn seed_scan(&self, total_targets: u32) -> ScanID {
        let scan = Scan {
            id: ScanID::new(),
            state: ScanState::InProgress,
            state_reason: None,
            state_message: None,
            summary: ScanSummary::for_targets(total_targets),
            start_time: Utc::now(),
            end_time: None,
        };
        let id = scan.id;
        self.state.lock().unwrap().scans.insert(id, scan);
        id
    }

    pub fn scan(&self, id: ScanID) -> Scan {
        self.state.lock().unwrap().scans[&id].clone()
    }

    pub fn set_scan_state(&self, id: ScanID, state: ScanState) {
        let mut guard = self.state.lock().unwrap();
        if let Some(scan) = guard.scans.get_mut(&id) {
            scan.state = state;
        }
    }

    pub fn result_count(&self) -> usize {
        self.state.lock().unwrap().results.len()
    }

    pub fn result_for_target(&self, target_id: TargetID) -> Option<TargetScanResult> {
        self.state
            .lock()
            .unwrap()
            .results
            .values()
            .find(|result| result.target_id == target_id)
            .cloned()
    }

    fn apply_cli_behavior(behavior: &CliBehavior, result: &mut TargetScanResult) {
        match behavior {
            CliBehavior::CompleteWith(summary) => {
                result.summary = *summary;
                let status = &mut result.status;
                for state in [
                    &mut status.sbom,
                    &mut status.vulnerabilities,
                    &mut status.secrets,
                    &mut status.exploits,
                    &mut status.malware,
                    &mut status.misconfigurations,
                    &mut status.rootkits,
                ] {
                    if state.state != ScanJobState::NotScanned {
                        state.state = ScanJobState::Done;
                    }
                }
                status.general.state = ScanJobState::Done;
            }
            CliBehavior::StayInProgress => {
                result.status.general.state = ScanJobState::InProgress;
            }
        }
    }

    fn apply_status_patch(status: &mut TargetScanStatus, patch: &TargetScanStatusPatch) {
        let apply = |slot: &mut TargetScanState, value: &Option<TargetScanState>| {
            if let Some(value) = value {
                *slot = value.clone();
            }
        };
        apply(&mut status.general, &patch.general);
        apply(&mut status.sbom, &patch.sbom);
        apply(&mut status.vulnerabilities, &patch.vulnerabilities);
        apply(&mut status.secrets, &patch.secrets);
        apply(&mut status.exploits, &patch.exploits);
        apply(&mut status.malware, &patch.malware);
        apply(&mut status.misconfigurations, &patch.misconfigurations);
        apply(&mut status.rootkits, &patch.rootkits);
    }
}

#[async_trait]
impl BackendStore for InMemoryStore {
    async fn get_scan(&self, id: ScanID) -> Result<Scan> {
        self.state
            .lock()
            .unwrap()
            .scans
            .get(&id)
            .cloned()
            .ok_or_else(|| ScanError::NotFound(format!("scan {id}")))
    }

    async fn patch_scan(&self, id: ScanID, patch: &ScanPatch) -> Result<()> {
        let mut guard = self.state.lock().unwrap();
        let scan = guard
            .scans
            .get_mut(&id)
            .ok_or_else(|| ScanError::NotFound(format!("scan {id}")))?;

        if let Some(state) = patch.state {
            scan.state = state;
        }
        if let Some(reason) = patch.state_reason {
            scan.state_reason = Some(reason);
        }
        if let Some(message) = &patch.state_message {
            scan.state_message = Some(message.clone());
        }
        if let Some(summary) = patch.summary {
            scan.summary = summary;
        }
        if let Some(end_time) = patch.end_time {
            scan.end_time = Some(end_time);
        }
        Ok(())
    }

    async fn post_scan_result(&self, result: &TargetScanResult) -> Result<CreatedScanResult> {
        let mut guard = self.state.lock().unwrap();

        let existing = guard
            .results
            .values()
            .find(|stored| stored.scan_id == result.scan_id && stored.target_id == result.target_id)
            .and_then(|stored| stored.id);
        if let Some(id) = existing {
            return Ok(CreatedScanResult::Conflict(id));
        }

        let id = ScanResultID::new();
        let mut stored = result.clone();
        stored.id = Some(id);
        guard.results.insert(id, stored);
        Ok(CreatedScanResult::Created(id))
    }

    async fn get_scan_result_summary(&self, id: ScanResultID) -> Result<FindingsSummary> {
        self.state
            .lock()
            .unwrap()
            .results
            .get(&id)
            .map(|result| result.summary)
            .ok_or_else(|| ScanError::NotFound(format!("scan result {id}")))
    }

    async fn get_scan_result_status(&self, id: ScanResultID) -> Result<TargetScanStatus> {
        self.state
            .lock()
            .unwrap()
            .results
            .get(&id)
            .map(|result| result.status.clone())
            .ok_or_else(|| ScanError::NotFound(format!("scan result {id}")))
    }

    async fn patch_scan_result_status(
        &self,
        id: ScanResultID,
        patch: &TargetScanStatusPatch,
    ) -> Result<()> {
        let mut guard = self.state.lock().unwrap();
        let result = guard
            .results
            .get_mut(&id)
            .ok_or_else(|| ScanError::NotFound(format!("scan result {id}")))?;

        Self::apply_status_patch(&mut result.status, patch);

        // The orchestrator marking a target ATTACHED is the scanner CLI's
        // cue; play its part immediately.
        if result.status.general.state == ScanJobState::Attached {
            Self::apply_cli_behavior(&self.behavior, result);
        }
        Ok(())
    }
}
