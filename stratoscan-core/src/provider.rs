//! Trait seams over the cloud provider.
//!
//! The orchestrator never talks to a cloud SDK directly; it drives these
//! object-safe traits and lets the provider adapter decide what an
//! instance, volume, or snapshot actually is. Waits are plain awaits;
//! callers overlay per-step timeouts and cancellation, and dropping the
//! future is the cooperative cancel.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use stratoscan_model::{ScanResultID, ScannerInstanceCreationConfig};

use crate::error::Result;

/// Cloud region name, e.g. `us-west-2`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region(pub String);

impl Region {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Region {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Everything the provider needs to launch one scanner instance.
#[derive(Clone, Debug)]
pub struct ScanningJobConfig {
    pub scanner_image: String,
    /// Analyzer-family configuration, an opaque YAML document consumed by
    /// the scanner CLI after boot.
    pub scanner_cli_config: String,
    pub backend_address: String,
    pub scan_result_id: ScanResultID,
    pub key_pair_name: String,
    pub instance_creation: ScannerInstanceCreationConfig,
}

#[async_trait]
pub trait Provider: Send + Sync {
    /// Launch a scanner instance in `region`, configured to mount the given
    /// snapshot once the orchestrator attaches it.
    async fn run_scanning_job(
        &self,
        region: &Region,
        snapshot_id: &str,
        config: ScanningJobConfig,
    ) -> Result<Box<dyn Instance>>;
}

#[async_trait]
pub trait Instance: Send + Sync {
    fn id(&self) -> String;

    fn region(&self) -> Region;

    fn availability_zone(&self) -> String;

    /// The instance's root storage volume.
    async fn root_volume(&self) -> Result<Box<dyn Volume>>;

    /// Resolve once the instance reaches its running state.
    async fn wait_for_ready(&self) -> Result<()>;

    async fn attach_volume(&self, volume: &dyn Volume, device_name: &str) -> Result<()>;

    async fn delete(&self) -> Result<()>;
}

#[async_trait]
pub trait Volume: Send + Sync {
    fn id(&self) -> String;

    async fn take_snapshot(&self) -> Result<Box<dyn Snapshot>>;

    async fn wait_for_ready(&self) -> Result<()>;

    async fn wait_for_attached(&self) -> Result<()>;

    async fn delete(&self) -> Result<()>;
}

#[async_trait]
pub trait Snapshot: Send + Sync {
    fn id(&self) -> String;

    fn region(&self) -> Region;

    async fn wait_for_ready(&self) -> Result<()>;

    /// Copy this snapshot into another region and return the copy.
    async fn copy(&self, region: &Region) -> Result<Box<dyn Snapshot>>;

    /// Create a volume from this snapshot in the given availability zone.
    async fn create_volume(&self, availability_zone: &str) -> Result<Box<dyn Volume>>;

    async fn delete(&self) -> Result<()>;
}
