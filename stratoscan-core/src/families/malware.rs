use serde::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Config {
    pub enabled: bool,
    pub scanners_list: Vec<String>,
    pub inputs: Option<Vec<String>>,
    pub scanners_config: Option<ScannersConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScannersConfig {
    pub clam: ClamConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClamConfig {
    pub clam_scan_binary_path: String,
    pub freshclam_binary_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_freshclam_mirror_url: Option<String>,
}

impl Config {
    pub fn from_user(
        enabled: bool,
        clam_binary_path: &str,
        freshclam_binary_path: &str,
        alternative_freshclam_mirror_url: Option<&str>,
    ) -> Self {
        if !enabled {
            return Self::default();
        }
        Self {
            enabled: true,
            scanners_list: vec!["clam".to_string()],
            inputs: None,
            scanners_config: Some(ScannersConfig {
                clam: ClamConfig {
                    clam_scan_binary_path: clam_binary_path.to_string(),
                    freshclam_binary_path: freshclam_binary_path.to_string(),
                    alternative_freshclam_mirror_url: alternative_freshclam_mirror_url
                        .map(str::to_string),
                },
            }),
        }
    }
}
