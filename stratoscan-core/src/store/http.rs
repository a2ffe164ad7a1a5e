//! reqwest-backed implementation of [`BackendStore`].

use async_trait::async_trait;
use reqwest::{Response, StatusCode};

use stratoscan_model::{
    FindingsSummary, Scan, ScanID, ScanPatch, ScanResultID, TargetScanResult, TargetScanStatus,
    TargetScanStatusPatch,
};

use crate::error::{Result, ScanError};
use crate::store::{BackendStore, CreatedScanResult};

/// HTTP client for the backend store REST surface.
#[derive(Clone, Debug)]
pub struct HttpBackendStore {
    client: reqwest::Client,
    base: String,
}

impl HttpBackendStore {
    /// `base_address` is the store's API root, e.g. `http://backend:8888/api`.
    pub fn new(base_address: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base_address.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    async fn expect_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(ScanError::Backend {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl BackendStore for HttpBackendStore {
    async fn get_scan(&self, id: ScanID) -> Result<Scan> {
        let response = self.client.get(self.url(&format!("scans/{id}"))).send().await?;
        Ok(Self::expect_success(response).await?.json().await?)
    }

    async fn patch_scan(&self, id: ScanID, patch: &ScanPatch) -> Result<()> {
        let response = self
            .client
            .patch(self.url(&format!("scans/{id}")))
            .json(patch)
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    async fn post_scan_result(&self, result: &TargetScanResult) -> Result<CreatedScanResult> {
        let response = self
            .client
            .post(self.url("scan-results"))
            .json(result)
            .send()
            .await?;

        // A conflict carries the pre-existing record so the create stays
        // idempotent for the caller.
        if response.status() == StatusCode::CONFLICT {
            let existing: TargetScanResult = response.json().await?;
            let id = existing.id.ok_or_else(|| {
                ScanError::Internal("conflicting scan result has no id".to_string())
            })?;
            return Ok(CreatedScanResult::Conflict(id));
        }

        let created: TargetScanResult = Self::expect_success(response).await?.json().await?;
        let id = created
            .id
            .ok_or_else(|| ScanError::Internal("created scan result has no id".to_string()))?;
        Ok(CreatedScanResult::Created(id))
    }

    async fn get_scan_result_summary(&self, id: ScanResultID) -> Result<FindingsSummary> {
        let response = self
            .client
            .get(self.url(&format!("scan-results/{id}/summary")))
            .send()
            .await?;
        Ok(Self::expect_success(response).await?.json().await?)
    }

    async fn get_scan_result_status(&self, id: ScanResultID) -> Result<TargetScanStatus> {
        let response = self
            .client
            .get(self.url(&format!("scan-results/{id}/status")))
            .send()
            .await?;
        Ok(Self::expect_success(response).await?.json().await?)
    }

    async fn patch_scan_result_status(
        &self,
        id: ScanResultID,
        patch: &TargetScanStatusPatch,
    ) -> Result<()> {
        let response = self
            .client
            .patch(self.url(&format!("scan-results/{id}/status")))
            .json(patch)
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_building_tolerates_trailing_slash() {
        let store = HttpBackendStore::new("http://backend:8888/api/");
        let id = ScanID::new();
        assert_eq!(
            store.url(&format!("scans/{id}")),
            format!("http://backend:8888/api/scans/{id}")
        );
    }
}
