//! The scan controller: fans one scan out into per-target jobs, runs them
//! on a bounded worker pool, and rolls per-target results up into the
//! scan-level summary and terminal state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use stratoscan_model::{
    Scan, ScanConfig, ScanID, ScanPatch, ScanResultID, ScanState, ScanStateReason,
    TargetScanResult, TargetID,
};

use crate::error::{Result, ScanError};
use crate::orchestration::clock::{Clock, TokioClock};
use crate::orchestration::config::OrchestratorConfig;
use crate::orchestration::job::{JobCompletion, ScanData, TargetInstance};
use crate::orchestration::pipeline::JobPipeline;
use crate::orchestration::reaper::JobReaper;
use crate::orchestration::waiter::ResultWaiter;
use crate::orchestration::worker::Worker;
use crate::provider::Provider;
use crate::store::retry::{retry_async, RetryPolicy};
use crate::store::{BackendStore, CreatedScanResult};

/// Drives a single scan from kickoff to terminal state.
///
/// One controller per scan: it owns the ScanData records, the worker pool,
/// and the only consumer of the completion channel, so summary updates are
/// naturally serialized.
pub struct ScanController {
    scan_id: ScanID,
    config: Arc<OrchestratorConfig>,
    scan_config: Arc<ScanConfig>,
    provider: Arc<dyn Provider>,
    store: Arc<dyn BackendStore>,
    clock: Arc<dyn Clock>,
    kill: CancellationToken,
}

impl ScanController {
    pub fn new(
        scan_id: ScanID,
        config: OrchestratorConfig,
        scan_config: ScanConfig,
        provider: Arc<dyn Provider>,
        store: Arc<dyn BackendStore>,
    ) -> Self {
        Self {
            scan_id,
            config: Arc::new(config),
            scan_config: Arc::new(scan_config),
            provider,
            store,
            clock: Arc::new(TokioClock),
            kill: CancellationToken::new(),
        }
    }

    /// Swap the clock, for harnesses that drive time themselves.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The scan-wide kill signal. Cancelling it requests cooperative
    /// shutdown of dispatch, every worker, and every in-flight wait.
    pub fn kill_signal(&self) -> CancellationToken {
        self.kill.clone()
    }

    /// Run the scan to its terminal state. Returns once the terminal scan
    /// patch has been attempted; in-flight workers are not awaited after a
    /// kill (the signal tears them down cooperatively).
    pub async fn run(&self, targets: Vec<TargetInstance>) -> Result<()> {
        let scan_id = self.scan_id;
        let total_targets = targets.len();

        tracing::info!(%scan_id, targets = total_targets, "starting scan");

        let items = self.init_scan_results(targets).await?;
        if items.is_empty() {
            return self.finish_empty_scan().await;
        }

        let worker_count = self.scan_config.max_parallel_scanners.max(1);
        let (queue_tx, queue_rx) = mpsc::channel::<ScanData>(worker_count);
        let queue_rx = Arc::new(Mutex::new(queue_rx));
        let (completion_tx, mut completion_rx) = mpsc::channel::<JobCompletion>(worker_count);

        let pipeline = Arc::new(JobPipeline::new(
            scan_id,
            Arc::clone(&self.provider),
            Arc::clone(&self.store),
            Arc::clone(&self.clock),
            Arc::clone(&self.config),
            Arc::clone(&self.scan_config),
            self.kill.clone(),
        ));
        let waiter = Arc::new(ResultWaiter::new(
            scan_id,
            Arc::clone(&self.store),
            Arc::clone(&self.clock),
            Arc::clone(&self.config),
            self.kill.clone(),
        ));
        let reaper = Arc::new(JobReaper::new(self.config.delete_job_policy, scan_id));

        for index in 0..worker_count {
            let worker = Worker {
                index,
                scan_id,
                store: Arc::clone(&self.store),
                pipeline: Arc::clone(&pipeline),
                waiter: Arc::clone(&waiter),
                reaper: Arc::clone(&reaper),
                queue: Arc::clone(&queue_rx),
                completions: completion_tx.clone(),
                kill: self.kill.clone(),
            };
            tokio::spawn(worker.run());
        }
        // The controller only consumes completions; workers hold the
        // remaining senders.
        drop(completion_tx);

        self.spawn_dispatcher(queue_tx, items.clone());

        let result_ids: HashMap<TargetID, ScanResultID> = items
            .iter()
            .map(|data| (data.target.target_id, data.scan_result_id))
            .collect();

        let mut jobs_completed = 0usize;
        let mut any_jobs_failed = false;

        loop {
            tokio::select! {
                completion = completion_rx.recv() => {
                    let Some(completion) = completion else {
                        return Err(ScanError::Internal(
                            "completion channel closed before all jobs finished".to_string(),
                        ));
                    };

                    jobs_completed += 1;
                    if !completion.outcome.success {
                        any_jobs_failed = true;
                    }

                    let scan_complete = jobs_completed == total_targets;
                    self.handle_completion(&completion, &result_ids, scan_complete, any_jobs_failed)
                        .await;

                    if scan_complete {
                        return Ok(());
                    }
                }
                _ = self.kill.cancelled() => {
                    tracing::debug!(
                        %scan_id,
                        "scan cancelled - stop waiting for in-flight jobs"
                    );
                    let patch = ScanPatch {
                        state: Some(ScanState::Failed),
                        state_reason: Some(ScanStateReason::TimedOut),
                        state_message: Some("Scan was canceled or timed out".to_string()),
                        end_time: Some(Utc::now()),
                        summary: None,
                    };
                    if let Err(err) = self.store.patch_scan(scan_id, &patch).await {
                        tracing::error!(%scan_id, error = %err, "failed to patch cancelled scan");
                    }
                    return Ok(());
                }
            }
        }
    }

    /// Create one scan result per target. A conflict from the store means a
    /// previous attempt already created the record; its id is adopted, so
    /// initialization is idempotent.
    async fn init_scan_results(&self, targets: Vec<TargetInstance>) -> Result<Vec<ScanData>> {
        let scan_id = self.scan_id;
        let mut items = Vec::with_capacity(targets.len());

        for target in targets {
            let result =
                TargetScanResult::new(scan_id, target.target_id, &self.scan_config.families);
            let created = self.store.post_scan_result(&result).await?;
            if let CreatedScanResult::Conflict(existing) = created {
                tracing::info!(
                    %scan_id,
                    target_id = %target.target_id,
                    scan_result_id = %existing,
                    "scan result already exists, adopting it"
                );
            }
            items.push(ScanData {
                target,
                scan_result_id: created.id(),
            });
        }

        Ok(items)
    }

    fn spawn_dispatcher(&self, queue_tx: mpsc::Sender<ScanData>, items: Vec<ScanData>) {
        let scan_id = self.scan_id;
        let kill = self.kill.clone();

        tokio::spawn(async move {
            for item in items {
                tokio::select! {
                    sent = queue_tx.send(item) => {
                        if sent.is_err() {
                            return;
                        }
                    }
                    _ = kill.cancelled() => {
                        tracing::debug!(%scan_id, "scan cancelled during dispatch");
                        return;
                    }
                }
            }
            // Dropping the sender closes the queue; already-enqueued items
            // still drain.
        });
    }

    /// Roll one completion into the scan summary and patch the scan. When
    /// this is the last completion, the terminal state rides the same
    /// patch.
    async fn handle_completion(
        &self,
        completion: &JobCompletion,
        result_ids: &HashMap<TargetID, ScanResultID>,
        scan_complete: bool,
        any_jobs_failed: bool,
    ) {
        let scan_id = self.scan_id;
        let target_id = completion.target_id;

        let scan = match result_ids.get(&target_id) {
            Some(scan_result_id) => match self.scan_with_updated_summary(*scan_result_id).await {
                Ok(scan) => Some(scan),
                Err(err) => {
                    tracing::error!(
                        %scan_id,
                        %target_id,
                        error = %err,
                        "failed to build scan with updated summary"
                    );
                    None
                }
            },
            None => {
                tracing::error!(%scan_id, %target_id, "completion for unknown target");
                None
            }
        };

        let mut patch = ScanPatch::default();
        if let Some(scan) = &scan {
            patch.summary = Some(scan.summary);
        }

        if scan_complete {
            patch.end_time = Some(Utc::now());

            match &scan {
                None => {
                    patch.state = Some(ScanState::Failed);
                    patch.state_reason = Some(ScanStateReason::Unexpected);
                    patch.state_message = Some("Failed to retrieve scan state".to_string());
                }
                Some(scan) if scan.state == ScanState::Aborted => {
                    tracing::warn!(%scan_id, "scan is aborted");
                    patch.state = Some(ScanState::Failed);
                    patch.state_reason = Some(ScanStateReason::Aborted);
                    patch.state_message = Some("User initiated".to_string());
                }
                Some(_) if any_jobs_failed => {
                    tracing::warn!(%scan_id, "scan failed");
                    patch.state = Some(ScanState::Failed);
                    patch.state_reason = Some(ScanStateReason::OneOrMoreTargetsFailed);
                    patch.state_message = Some("One or more scan jobs failed".to_string());
                }
                Some(_) => {
                    tracing::info!(%scan_id, "scan completed");
                    patch.state = Some(ScanState::Done);
                    patch.state_reason = Some(ScanStateReason::Success);
                    patch.state_message = Some("All scan jobs completed".to_string());
                }
            }
        }

        // Progress must stay observable even when a single patch fails; the
        // next completion's patch carries the freshly re-read summary.
        let patched = retry_async("patch_scan", RetryPolicy::default(), || {
            self.store.patch_scan(scan_id, &patch)
        })
        .await;
        if let Err(err) = patched {
            tracing::error!(%scan_id, error = %err, "failed to patch scan");
        }
    }

    /// Re-read the scan, fold the completed target's findings into its
    /// summary, and hand the result back for patching.
    async fn scan_with_updated_summary(&self, scan_result_id: ScanResultID) -> Result<Scan> {
        let policy = RetryPolicy::default();

        let mut scan = retry_async("get_scan", policy, || self.store.get_scan(self.scan_id)).await?;
        let result_summary = retry_async("get_scan_result_summary", policy, || {
            self.store.get_scan_result_summary(scan_result_id)
        })
        .await?;

        scan.summary.absorb_result(&result_summary);
        Ok(scan)
    }

    async fn finish_empty_scan(&self) -> Result<()> {
        let patch = ScanPatch {
            state: Some(ScanState::Done),
            state_reason: Some(ScanStateReason::Success),
            state_message: Some("All scan jobs completed".to_string()),
            end_time: Some(Utc::now()),
            summary: None,
        };
        self.store.patch_scan(self.scan_id, &patch).await
    }
}
