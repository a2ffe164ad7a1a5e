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
    pub gitleaks: GitleaksConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GitleaksConfig {
    pub binary_path: String,
}

impl Config {
    pub fn from_user(enabled: bool, gitleaks_binary_path: &str) -> Self {
        if !enabled {
            return Self::default();
        }
        Self {
            enabled: true,
            scanners_list: vec!["gitleaks".to_string()],
            inputs: None,
            scanners_config: Some(ScannersConfig {
                gitleaks: GitleaksConfig {
                    binary_path: gitleaks_binary_path.to_string(),
                },
            }),
        }
    }
}
