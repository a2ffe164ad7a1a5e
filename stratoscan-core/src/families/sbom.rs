use serde::Serialize;

/// Trivy is given a generous analysis timeout; large root volumes take a
/// while to walk.
pub const TRIVY_TIMEOUT_SECS: u64 = 300;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Config {
    pub enabled: bool,
    pub analyzers_list: Vec<String>,
    pub inputs: Option<Vec<String>>,
    pub analyzers_config: Option<AnalyzersConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalyzersConfig {
    pub output_format: String,
    pub trivy: TrivyAnalyzerConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrivyAnalyzerConfig {
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_user(enabled: bool) -> Self {
        if !enabled {
            return Self::default();
        }
        Self {
            enabled: true,
            analyzers_list: vec!["syft".to_string(), "trivy".to_string()],
            inputs: None,
            analyzers_config: Some(AnalyzersConfig {
                output_format: "cyclonedx".to_string(),
                trivy: TrivyAnalyzerConfig {
                    timeout_secs: TRIVY_TIMEOUT_SECS,
                },
            }),
        }
    }
}
