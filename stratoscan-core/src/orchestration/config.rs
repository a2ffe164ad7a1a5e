use std::time::Duration;

use serde::{Deserialize, Serialize};

use stratoscan_model::DeleteJobPolicy;

use crate::provider::Region;

/// Deployment-level knobs for the scan orchestrator.
///
/// All fields carry defaults so a deployment only overrides what it needs.
/// Per-scan behaviour (parallelism, enabled families) rides the user scan
/// configuration instead.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Region the scanner pool lives in. Snapshots taken elsewhere are
    /// copied here before a volume can be created from them.
    pub region: Region,
    /// Device name the target volume is attached under on the scanner
    /// instance.
    pub device_name: String,
    /// Machine image used for scanner instances.
    pub scanner_image: String,
    /// Backend address handed to scanner CLIs so they can report status.
    pub scanner_backend_address: String,
    /// Key pair installed on scanner instances.
    pub scanner_key_pair_name: String,
    /// What happens to provisioned cloud resources once a job completes.
    pub delete_job_policy: DeleteJobPolicy,
    /// Cadence for polling a target's scan status (seconds).
    pub job_results_polling_interval_secs: u64,
    /// Upper bound on waiting for one job's results after dispatch (seconds).
    pub job_result_timeout_secs: u64,
    /// Upper bound on waiting for a snapshot to become ready (seconds).
    pub snapshot_create_timeout_secs: u64,
    /// Upper bound on waiting for a cross-region snapshot copy (seconds).
    /// Copies take much longer than plain snapshot creation.
    pub snapshot_copy_timeout_secs: u64,

    // Tooling on the scanner image, forwarded into the family config.
    pub gitleaks_binary_path: String,
    pub clam_binary_path: String,
    pub freshclam_binary_path: String,
    pub alternative_freshclam_mirror_url: Option<String>,
    pub lynis_install_path: String,
    pub chkrootkit_binary_path: String,
    pub exploit_db_address: String,
    pub trivy_server_address: Option<String>,
    /// When set, grype runs in remote mode against this server; otherwise
    /// each scanner instance maintains a local vulnerability DB.
    pub grype_server_address: Option<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            region: Region::new("us-east-1"),
            device_name: "/dev/xvdh".to_string(),
            scanner_image: String::new(),
            scanner_backend_address: String::new(),
            scanner_key_pair_name: String::new(),
            delete_job_policy: DeleteJobPolicy::Always,
            job_results_polling_interval_secs: 30,
            job_result_timeout_secs: 70 * 60,
            snapshot_create_timeout_secs: 3 * 60,
            snapshot_copy_timeout_secs: 15 * 60,
            gitleaks_binary_path: "/usr/local/bin/gitleaks".to_string(),
            clam_binary_path: "clamscan".to_string(),
            freshclam_binary_path: "freshclam".to_string(),
            alternative_freshclam_mirror_url: None,
            lynis_install_path: "/usr/local/lynis".to_string(),
            chkrootkit_binary_path: "/usr/local/bin/chkrootkit".to_string(),
            exploit_db_address: String::new(),
            trivy_server_address: None,
            grype_server_address: None,
        }
    }
}

impl OrchestratorConfig {
    pub fn job_results_polling_interval(&self) -> Duration {
        Duration::from_secs(self.job_results_polling_interval_secs)
    }

    pub fn job_result_timeout(&self) -> Duration {
        Duration::from_secs(self.job_result_timeout_secs)
    }

    pub fn snapshot_create_timeout(&self) -> Duration {
        Duration::from_secs(self.snapshot_create_timeout_secs)
    }

    pub fn snapshot_copy_timeout(&self) -> Duration {
        Duration::from_secs(self.snapshot_copy_timeout_secs)
    }
}
