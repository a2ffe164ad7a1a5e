use serde::{Deserialize, Serialize};

/// Analyzer family tags, in the order families are reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyKind {
    Sbom,
    Vulnerabilities,
    Secrets,
    Exploits,
    Malware,
    Misconfigurations,
    Rootkits,
}

impl FamilyKind {
    pub const ALL: [FamilyKind; 7] = [
        FamilyKind::Sbom,
        FamilyKind::Vulnerabilities,
        FamilyKind::Secrets,
        FamilyKind::Exploits,
        FamilyKind::Malware,
        FamilyKind::Misconfigurations,
        FamilyKind::Rootkits,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FamilyKind::Sbom => "sbom",
            FamilyKind::Vulnerabilities => "vulnerabilities",
            FamilyKind::Secrets => "secrets",
            FamilyKind::Exploits => "exploits",
            FamilyKind::Malware => "malware",
            FamilyKind::Misconfigurations => "misconfigurations",
            FamilyKind::Rootkits => "rootkits",
        }
    }
}

impl std::fmt::Display for FamilyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-family on/off switch in the user scan configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyFlag {
    pub enabled: bool,
}

impl FamilyFlag {
    pub fn on() -> Self {
        Self { enabled: true }
    }

    pub fn off() -> Self {
        Self { enabled: false }
    }
}

/// Which analyzer families a scan runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFamiliesConfig {
    pub sbom: FamilyFlag,
    pub vulnerabilities: FamilyFlag,
    pub secrets: FamilyFlag,
    pub exploits: FamilyFlag,
    pub malware: FamilyFlag,
    pub misconfigurations: FamilyFlag,
    pub rootkits: FamilyFlag,
}

impl ScanFamiliesConfig {
    /// Uniform capability lookup keyed by family tag.
    pub fn enabled(&self, kind: FamilyKind) -> bool {
        match kind {
            FamilyKind::Sbom => self.sbom.enabled,
            FamilyKind::Vulnerabilities => self.vulnerabilities.enabled,
            FamilyKind::Secrets => self.secrets.enabled,
            FamilyKind::Exploits => self.exploits.enabled,
            FamilyKind::Malware => self.malware.enabled,
            FamilyKind::Misconfigurations => self.misconfigurations.enabled,
            FamilyKind::Rootkits => self.rootkits.enabled,
        }
    }

    pub fn all_enabled() -> Self {
        Self {
            sbom: FamilyFlag::on(),
            vulnerabilities: FamilyFlag::on(),
            secrets: FamilyFlag::on(),
            exploits: FamilyFlag::on(),
            malware: FamilyFlag::on(),
            misconfigurations: FamilyFlag::on(),
            rootkits: FamilyFlag::on(),
        }
    }
}

/// Retention policy for cloud resources provisioned per scan job.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeleteJobPolicy {
    #[default]
    Always,
    OnSuccess,
    Never,
}

/// Knobs forwarded to the provider when launching scanner instances.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScannerInstanceCreationConfig {
    pub use_spot_instances: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_max_attempts: Option<u32>,
}

/// User-supplied configuration for a single scan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Upper bound on concurrently running scan jobs.
    pub max_parallel_scanners: usize,
    pub families: ScanFamiliesConfig,
    #[serde(default)]
    pub instance_creation: ScannerInstanceCreationConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_parallel_scanners: 2,
            families: ScanFamiliesConfig::default(),
            instance_creation: ScannerInstanceCreationConfig::default(),
        }
    }
}
