//! Teardown of provisioned cloud resources.

use stratoscan_model::{DeleteJobPolicy, ScanID};

use crate::orchestration::job::{JobOutcome, JobResources};

/// Applies the delete policy to a finished job and tears down whatever the
/// pipeline provisioned. Deletes are best-effort: failures are logged and
/// the remaining resources are still attempted.
#[derive(Clone, Debug)]
pub struct JobReaper {
    policy: DeleteJobPolicy,
    scan_id: ScanID,
}

impl JobReaper {
    pub fn new(policy: DeleteJobPolicy, scan_id: ScanID) -> Self {
        Self { policy, scan_id }
    }

    /// Decide per policy whether the job's resources survive.
    ///
    /// Jobs that never completed are orphans and are always torn down,
    /// whatever the policy.
    pub async fn delete_job_if_needed(&self, job: &mut JobResources, outcome: JobOutcome) {
        if !outcome.completed {
            self.delete_job(job).await;
            return;
        }

        match self.policy {
            DeleteJobPolicy::Never => {}
            DeleteJobPolicy::Always => self.delete_job(job).await,
            DeleteJobPolicy::OnSuccess => {
                if outcome.success {
                    self.delete_job(job).await;
                }
            }
        }
    }

    /// Delete everything recorded on the job, instance first so nothing is
    /// still using the volume when it goes. Each resource slot is taken out
    /// of the job, so reaping twice is a no-op.
    pub async fn delete_job(&self, job: &mut JobResources) {
        let scan_id = self.scan_id;

        if let Some(instance) = job.instance.take() {
            if let Err(err) = instance.delete().await {
                tracing::warn!(
                    %scan_id,
                    instance_id = %instance.id(),
                    error = %err,
                    "failed to delete scanner instance"
                );
            }
        }
        if let Some(snapshot) = job.src_snapshot.take() {
            if let Err(err) = snapshot.delete().await {
                tracing::warn!(
                    %scan_id,
                    snapshot_id = %snapshot.id(),
                    error = %err,
                    "failed to delete source snapshot"
                );
            }
        }
        if let Some(snapshot) = job.dst_snapshot.take() {
            if let Err(err) = snapshot.delete().await {
                tracing::warn!(
                    %scan_id,
                    snapshot_id = %snapshot.id(),
                    error = %err,
                    "failed to delete copied snapshot"
                );
            }
        }
        if let Some(volume) = job.volume.take() {
            if let Err(err) = volume.delete().await {
                tracing::warn!(
                    %scan_id,
                    volume_id = %volume.id(),
                    error = %err,
                    "failed to delete volume"
                );
            }
        }
    }
}
