//! Polling loop for a dispatched job's results.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use stratoscan_model::{ScanID, ScanJobState};

use crate::orchestration::clock::Clock;
use crate::orchestration::config::OrchestratorConfig;
use crate::orchestration::job::{JobOutcome, ScanData};
use crate::store::BackendStore;

/// Polls a target's scan status on a fixed tick until the job reaches a
/// terminal state, the overall result timeout elapses, or the scan is
/// killed.
pub struct ResultWaiter {
    scan_id: ScanID,
    store: Arc<dyn BackendStore>,
    clock: Arc<dyn Clock>,
    config: Arc<OrchestratorConfig>,
    kill: CancellationToken,
}

impl ResultWaiter {
    pub fn new(
        scan_id: ScanID,
        store: Arc<dyn BackendStore>,
        clock: Arc<dyn Clock>,
        config: Arc<OrchestratorConfig>,
        kill: CancellationToken,
    ) -> Self {
        Self {
            scan_id,
            store,
            clock,
            config,
            kill,
        }
    }

    /// Wait for the target to finish.
    ///
    /// Returns the zero outcome (not completed) when the kill signal fires;
    /// the controller reconciles through its own terminal path and the
    /// reaper's orphan rule tears the job down.
    pub async fn wait(&self, data: &ScanData) -> JobOutcome {
        let scan_id = self.scan_id;
        let target_id = data.target.target_id;
        let scan_result_id = data.scan_result_id;

        tracing::info!(%scan_id, %target_id, "waiting for scan job results");

        let deadline = self.clock.sleep(self.config.job_result_timeout());
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    tracing::info!(%scan_id, %target_id, "scan job timed out waiting for results");
                    return JobOutcome::timed_out();
                }
                _ = self.kill.cancelled() => {
                    tracing::info!(%scan_id, %target_id, "scan cancelled while waiting for results");
                    return JobOutcome::default();
                }
                _ = self.clock.sleep(self.config.job_results_polling_interval()) => {
                    tracing::debug!(%scan_id, %target_id, "polling scan job status");

                    let status = match self.store.get_scan_result_status(scan_result_id).await {
                        Ok(status) => status,
                        Err(err) => {
                            tracing::error!(
                                %scan_id,
                                %target_id,
                                error = %err,
                                "failed to get target scan status"
                            );
                            continue;
                        }
                    };

                    match status.general.state {
                        ScanJobState::Init
                        | ScanJobState::Attached
                        | ScanJobState::InProgress => {
                            tracing::debug!(
                                %scan_id,
                                %target_id,
                                state = ?status.general.state,
                                "scan job still running"
                            );
                        }
                        ScanJobState::Aborted => {
                            // Keep polling: the scanner reports whatever
                            // partial results it gathered before stopping.
                            tracing::info!(
                                %scan_id,
                                %target_id,
                                "scan job aborted, waiting for partial results"
                            );
                        }
                        ScanJobState::Done | ScanJobState::NotScanned => {
                            let success = !status.has_errors();
                            tracing::info!(
                                %scan_id,
                                %target_id,
                                state = ?status.general.state,
                                success,
                                "scan job completed"
                            );
                            return JobOutcome::completed(success);
                        }
                    }
                }
            }
        }
    }
}
