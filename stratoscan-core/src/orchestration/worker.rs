//! The worker task: pulls targets off the shared queue, drives the
//! pipeline and the result wait, reaps resources, and reports completions.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use stratoscan_model::{ScanID, ScanJobState, ScanResultID, TargetScanStatusPatch};

use crate::error::{Result, ScanError};
use crate::orchestration::job::{JobCompletion, JobOutcome, JobResources, ScanData};
use crate::orchestration::pipeline::JobPipeline;
use crate::orchestration::reaper::JobReaper;
use crate::orchestration::waiter::ResultWaiter;
use crate::store::BackendStore;

pub(crate) struct Worker {
    pub(crate) index: usize,
    pub(crate) scan_id: ScanID,
    pub(crate) store: Arc<dyn BackendStore>,
    pub(crate) pipeline: Arc<JobPipeline>,
    pub(crate) waiter: Arc<ResultWaiter>,
    pub(crate) reaper: Arc<JobReaper>,
    pub(crate) queue: Arc<Mutex<mpsc::Receiver<ScanData>>>,
    pub(crate) completions: mpsc::Sender<JobCompletion>,
    pub(crate) kill: CancellationToken,
}

impl Worker {
    pub(crate) async fn run(self) {
        let scan_id = self.scan_id;

        loop {
            let data = {
                let mut queue = self.queue.lock().await;
                tokio::select! {
                    item = queue.recv() => match item {
                        Some(data) => data,
                        // Queue closed and drained: dispatch is finished.
                        None => break,
                    },
                    _ = self.kill.cancelled() => {
                        tracing::debug!(%scan_id, worker = self.index, "worker halted");
                        return;
                    }
                }
            };

            let target_id = data.target.target_id;
            let (mut job, outcome, error) = self.handle_scan_data(&data).await;

            if let Some(err) = error {
                tracing::error!(%scan_id, %target_id, error = %err, "scan job failed");
                if let Err(patch_err) = self
                    .record_completion_error(data.scan_result_id, &err)
                    .await
                {
                    // Not retried; the error stays visible in our logs even
                    // if the store never hears about it.
                    tracing::error!(
                        %scan_id,
                        %target_id,
                        error = %patch_err,
                        "failed to record completion error on target scan status"
                    );
                }
            }

            self.reaper.delete_job_if_needed(&mut job, outcome).await;

            let completion = JobCompletion { target_id, outcome };
            tokio::select! {
                sent = self.completions.send(completion) => {
                    if sent.is_err() {
                        tracing::debug!(%scan_id, %target_id, "completion channel closed");
                    }
                }
                _ = self.kill.cancelled() => {
                    tracing::info!(
                        %scan_id,
                        %target_id,
                        "scan cancelled before completion could be reported"
                    );
                }
            }
        }

        tracing::debug!(%scan_id, worker = self.index, "worker finished");
    }

    /// Drive one target through its remaining lifecycle, based on the
    /// general state currently recorded in the store.
    async fn handle_scan_data(
        &self,
        data: &ScanData,
    ) -> (JobResources, JobOutcome, Option<ScanError>) {
        let mut job = JobResources::default();
        let mut outcome = JobOutcome::default();

        let status = match self.store.get_scan_result_status(data.scan_result_id).await {
            Ok(status) => status,
            Err(err) => return (job, outcome, Some(err)),
        };

        let state = status.general.state;
        if state == ScanJobState::Init {
            match self.pipeline.run(data, &self.reaper).await {
                Ok(resources) => job = resources,
                Err(err) => {
                    outcome = JobOutcome::completed(false);
                    return (job, outcome, Some(err));
                }
            }
        }

        match state {
            ScanJobState::Init
            | ScanJobState::Attached
            | ScanJobState::InProgress
            | ScanJobState::Aborted => {
                outcome = self.waiter.wait(data).await;
                if outcome.timeout {
                    let err = ScanError::Timeout(format!(
                        "scan job results for target {}",
                        data.target.target_id
                    ));
                    return (job, outcome, Some(err));
                }
            }
            ScanJobState::Done | ScanJobState::NotScanned => {}
        }

        (job, outcome, None)
    }

    /// Append the failure to the target's general sub-state and mark it
    /// terminal so every observer of the status converges.
    async fn record_completion_error(
        &self,
        scan_result_id: ScanResultID,
        error: &ScanError,
    ) -> Result<()> {
        let status = self.store.get_scan_result_status(scan_result_id).await?;

        let mut general = status.general;
        general.errors.push(error.to_string());
        general.state = ScanJobState::Done;

        let patch = TargetScanStatusPatch {
            general: Some(general),
            ..Default::default()
        };
        self.store
            .patch_scan_result_status(scan_result_id, &patch)
            .await
    }
}
