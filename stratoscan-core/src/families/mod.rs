//! Analyzer-family configuration.
//!
//! The user scan config only toggles families on and off; the deployment
//! config carries the tool paths and endpoints. This module combines both
//! into the YAML document the scanner CLI consumes after it mounts the
//! target volume. The document is opaque to the orchestrator: it is
//! generated, marshalled, and handed to the provider unchanged.

pub mod exploits;
pub mod malware;
pub mod misconfiguration;
pub mod rootkits;
pub mod sbom;
pub mod secrets;
pub mod vulnerabilities;

use serde::Serialize;

use stratoscan_model::{FamilyKind, ScanFamiliesConfig};

use crate::error::Result;
use crate::orchestration::config::OrchestratorConfig;

/// The full per-scan configuration document for the scanner CLI.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FamiliesConfig {
    pub sbom: sbom::Config,
    pub vulnerabilities: vulnerabilities::Config,
    pub secrets: secrets::Config,
    pub exploits: exploits::Config,
    pub malware: malware::Config,
    pub misconfiguration: misconfiguration::Config,
    pub rootkits: rootkits::Config,
}

impl FamiliesConfig {
    pub fn from_scan_config(families: &ScanFamiliesConfig, config: &OrchestratorConfig) -> Self {
        Self {
            sbom: sbom::Config::from_user(families.enabled(FamilyKind::Sbom)),
            vulnerabilities: vulnerabilities::Config::from_user(
                families.enabled(FamilyKind::Vulnerabilities),
                config.trivy_server_address.as_deref(),
                config.grype_server_address.as_deref(),
            ),
            secrets: secrets::Config::from_user(
                families.enabled(FamilyKind::Secrets),
                &config.gitleaks_binary_path,
            ),
            exploits: exploits::Config::from_user(
                families.enabled(FamilyKind::Exploits),
                &config.exploit_db_address,
            ),
            malware: malware::Config::from_user(
                families.enabled(FamilyKind::Malware),
                &config.clam_binary_path,
                &config.freshclam_binary_path,
                config.alternative_freshclam_mirror_url.as_deref(),
            ),
            misconfiguration: misconfiguration::Config::from_user(
                families.enabled(FamilyKind::Misconfigurations),
                &config.lynis_install_path,
            ),
            rootkits: rootkits::Config::from_user(
                families.enabled(FamilyKind::Rootkits),
                &config.chkrootkit_binary_path,
            ),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratoscan_model::FamilyFlag;

    #[test]
    fn disabled_families_serialize_disabled() {
        let families = ScanFamiliesConfig {
            sbom: FamilyFlag::on(),
            ..Default::default()
        };
        let config = FamiliesConfig::from_scan_config(&families, &OrchestratorConfig::default());

        assert!(config.sbom.enabled);
        assert!(!config.vulnerabilities.enabled);
        assert!(!config.rootkits.enabled);

        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("sbom"), "families document lists sbom: {yaml}");
    }

    #[test]
    fn yaml_document_keeps_unfilled_inputs() {
        let config = FamiliesConfig::from_scan_config(
            &ScanFamiliesConfig::all_enabled(),
            &OrchestratorConfig::default(),
        );
        let yaml = config.to_yaml().unwrap();

        // The CLI fills inputs after mounting the target volume.
        assert!(yaml.contains("inputs: null"), "{yaml}");
    }
}
