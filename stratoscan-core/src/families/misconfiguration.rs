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
    pub lynis: LynisConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LynisConfig {
    pub install_path: String,
}

impl Config {
    pub fn from_user(enabled: bool, lynis_install_path: &str) -> Self {
        if !enabled {
            return Self::default();
        }
        Self {
            enabled: true,
            scanners_list: vec!["lynis".to_string()],
            inputs: None,
            scanners_config: Some(ScannersConfig {
                lynis: LynisConfig {
                    install_path: lynis_install_path.to_string(),
                },
            }),
        }
    }
}
