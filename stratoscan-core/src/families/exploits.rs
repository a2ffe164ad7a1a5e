use serde::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Config {
    pub enabled: bool,
    pub scanners_list: Vec<String>,
    /// Exploit matching runs after the vulnerability family and consumes
    /// its output.
    pub input_from_vuln: bool,
    pub scanners_config: Option<ScannersConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScannersConfig {
    pub exploit_db: ExploitDbConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExploitDbConfig {
    pub base_url: String,
}

impl Config {
    pub fn from_user(enabled: bool, exploit_db_address: &str) -> Self {
        if !enabled {
            return Self::default();
        }
        Self {
            enabled: true,
            scanners_list: vec!["exploitdb".to_string()],
            input_from_vuln: true,
            scanners_config: Some(ScannersConfig {
                exploit_db: ExploitDbConfig {
                    base_url: exploit_db_address.to_string(),
                },
            }),
        }
    }
}
