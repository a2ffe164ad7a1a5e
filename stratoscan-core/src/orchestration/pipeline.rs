//! The per-target resource-provisioning pipeline.
//!
//! Sequence for one scan job: root volume → snapshot → (cross-region copy)
//! → family config → scanner instance launch → volume from snapshot →
//! readiness waits → attach → ATTACHED state patch. Every step is
//! long-latency and failure-prone; resources are recorded on the job
//! before the next fallible step, and any error reaps the partial job
//! before it propagates.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use stratoscan_model::{ScanConfig, ScanID, ScanJobState, TargetScanStatusPatch};

use crate::error::{Result, ScanError};
use crate::families::FamiliesConfig;
use crate::orchestration::clock::{run_with_timeout, Clock};
use crate::orchestration::config::OrchestratorConfig;
use crate::orchestration::job::{JobResources, ScanData};
use crate::orchestration::reaper::JobReaper;
use crate::provider::{Instance, Provider, ScanningJobConfig, Snapshot, Volume};
use crate::store::BackendStore;

pub struct JobPipeline {
    scan_id: ScanID,
    provider: Arc<dyn Provider>,
    store: Arc<dyn BackendStore>,
    clock: Arc<dyn Clock>,
    config: Arc<OrchestratorConfig>,
    scan_config: Arc<ScanConfig>,
    kill: CancellationToken,
}

impl JobPipeline {
    pub fn new(
        scan_id: ScanID,
        provider: Arc<dyn Provider>,
        store: Arc<dyn BackendStore>,
        clock: Arc<dyn Clock>,
        config: Arc<OrchestratorConfig>,
        scan_config: Arc<ScanConfig>,
        kill: CancellationToken,
    ) -> Self {
        Self {
            scan_id,
            provider,
            store,
            clock,
            config,
            scan_config,
            kill,
        }
    }

    /// Provision the full job for one target. On any failure the partial
    /// job is reaped before the error is returned; on success the caller
    /// owns the resources until it hands them to the reaper.
    pub async fn run(&self, data: &ScanData, reaper: &JobReaper) -> Result<JobResources> {
        let scan_id = self.scan_id;
        let target_id = data.target.target_id;
        let mut job = JobResources::default();

        let result = tokio::select! {
            result = self.provision(&mut job, data) => result,
            _ = self.kill.cancelled() => {
                Err(ScanError::Cancelled(format!("scan job for target {target_id}")))
            }
        };

        match result {
            Ok(()) => Ok(job),
            Err(err) => {
                tracing::warn!(
                    %scan_id,
                    %target_id,
                    error = %err,
                    "job pipeline failed, reaping partial resources"
                );
                reaper.delete_job(&mut job).await;
                Err(err)
            }
        }
    }

    async fn provision(&self, job: &mut JobResources, data: &ScanData) -> Result<()> {
        let scan_id = self.scan_id;
        let target_id = data.target.target_id;
        let instance_to_scan = &data.target.instance;

        tracing::info!(
            %scan_id,
            %target_id,
            instance_id = %instance_to_scan.id(),
            "running scan job pipeline"
        );

        let root_volume = instance_to_scan.root_volume().await?;

        let src_snapshot: Arc<dyn Snapshot> = Arc::from(root_volume.take_snapshot().await?);
        job.src_snapshot = Some(Arc::clone(&src_snapshot));
        run_with_timeout(
            self.clock.as_ref(),
            self.config.snapshot_create_timeout(),
            "snapshot creation",
            src_snapshot.wait_for_ready(),
        )
        .await?;

        // The snapshot has to live in the scanner region before a volume
        // can be created from it.
        let mut launch_snapshot = Arc::clone(&src_snapshot);
        if src_snapshot.region() != self.config.region {
            tracing::debug!(
                %scan_id,
                %target_id,
                from = %src_snapshot.region(),
                to = %self.config.region,
                "copying snapshot into scanner region"
            );
            let copied: Arc<dyn Snapshot> =
                Arc::from(src_snapshot.copy(&self.config.region).await?);
            job.dst_snapshot = Some(Arc::clone(&copied));
            run_with_timeout(
                self.clock.as_ref(),
                self.config.snapshot_copy_timeout(),
                "snapshot copy",
                copied.wait_for_ready(),
            )
            .await?;
            launch_snapshot = copied;
        }

        let families_yaml =
            FamiliesConfig::from_scan_config(&self.scan_config.families, &self.config).to_yaml()?;

        let job_config = ScanningJobConfig {
            scanner_image: self.config.scanner_image.clone(),
            scanner_cli_config: families_yaml,
            backend_address: self.config.scanner_backend_address.clone(),
            scan_result_id: data.scan_result_id,
            key_pair_name: self.config.scanner_key_pair_name.clone(),
            instance_creation: self.scan_config.instance_creation.clone(),
        };
        let scanner: Arc<dyn Instance> = Arc::from(
            self.provider
                .run_scanning_job(&launch_snapshot.region(), &launch_snapshot.id(), job_config)
                .await?,
        );
        job.instance = Some(Arc::clone(&scanner));

        let volume: Arc<dyn Volume> = Arc::from(
            launch_snapshot
                .create_volume(&scanner.availability_zone())
                .await?,
        );
        job.volume = Some(Arc::clone(&volume));

        scanner.wait_for_ready().await?;
        volume.wait_for_ready().await?;
        scanner
            .attach_volume(volume.as_ref(), &self.config.device_name)
            .await?;
        volume.wait_for_attached().await?;

        self.store
            .patch_scan_result_status(
                data.scan_result_id,
                &TargetScanStatusPatch::general_state(ScanJobState::Attached),
            )
            .await?;

        tracing::info!(
            %scan_id,
            %target_id,
            scanner_instance = %scanner.id(),
            volume_id = %volume.id(),
            "target volume attached, scanner may begin"
        );

        Ok(())
    }
}
