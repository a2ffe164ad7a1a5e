use serde::Serialize;

pub const TRIVY_TIMEOUT_SECS: u64 = 300;
pub const GRYPE_SERVER_TIMEOUT_SECS: u64 = 120;
pub const GRYPE_DB_LISTING_URL: &str =
    "https://toolbox-data.anchore.io/grype/databases/listing.json";
pub const GRYPE_DB_ROOT_DIR: &str = "/tmp/";

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Config {
    pub enabled: bool,
    pub scanners_list: Vec<String>,
    /// Filled in by the scanner CLI when it feeds the SBOM output into the
    /// vulnerability scanners.
    pub input_from_sbom: bool,
    pub scanners_config: Option<ScannersConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScannersConfig {
    pub grype: GrypeConfig,
    pub trivy: TrivyScannerConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GrypeMode {
    Local,
    Remote,
}

/// Grype either talks to a shared grype-server or maintains a local DB on
/// the scanner instance.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GrypeConfig {
    pub mode: GrypeMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<LocalGrypeConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteGrypeConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LocalGrypeConfig {
    pub update_db: bool,
    pub db_root_dir: String,
    pub listing_url: String,
    pub scope: LayerScope,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LayerScope {
    Squashed,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RemoteGrypeConfig {
    pub grype_server_address: String,
    pub grype_server_timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrivyScannerConfig {
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_address: Option<String>,
}

impl Config {
    pub fn from_user(
        enabled: bool,
        trivy_server_address: Option<&str>,
        grype_server_address: Option<&str>,
    ) -> Self {
        if !enabled {
            return Self::default();
        }

        let grype = match grype_server_address {
            Some(address) => GrypeConfig {
                mode: GrypeMode::Remote,
                local: None,
                remote: Some(RemoteGrypeConfig {
                    grype_server_address: address.to_string(),
                    grype_server_timeout_secs: GRYPE_SERVER_TIMEOUT_SECS,
                }),
            },
            None => GrypeConfig {
                mode: GrypeMode::Local,
                local: Some(LocalGrypeConfig {
                    update_db: true,
                    db_root_dir: GRYPE_DB_ROOT_DIR.to_string(),
                    listing_url: GRYPE_DB_LISTING_URL.to_string(),
                    scope: LayerScope::Squashed,
                }),
                remote: None,
            },
        };

        Self {
            enabled: true,
            scanners_list: vec!["grype".to_string(), "trivy".to_string()],
            input_from_sbom: false,
            scanners_config: Some(ScannersConfig {
                grype,
                trivy: TrivyScannerConfig {
                    timeout_secs: TRIVY_TIMEOUT_SECS,
                    server_address: trivy_server_address.map(str::to_string),
                },
            }),
        }
    }
}
