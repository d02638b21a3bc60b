use crate::config::{DEFAULT_ARCHIVE_NAME, DEFAULT_TIMEOUT_SECS, MAX_TIMEOUT_SECS};
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub carpark_info_endpoint: String,
    pub availability_endpoint: String,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub archive_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub system_stats: Option<bool>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Both monitoring switches must be on for per-phase statistics.
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring
            .as_ref()
            .map(|m| m.enabled && m.system_stats.unwrap_or(true))
            .unwrap_or(false)
    }
}

/// Replaces `${VAR}` with the environment value; unknown variables stay as written.
fn substitute_env_vars(content: &str) -> String {
    static ENV_VAR: OnceLock<Regex> = OnceLock::new();
    let re = ENV_VAR.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
    });

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}

impl ConfigProvider for TomlConfig {
    fn carpark_info_endpoint(&self) -> &str {
        &self.source.carpark_info_endpoint
    }

    fn availability_endpoint(&self) -> &str {
        &self.source.availability_endpoint
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn archive_name(&self) -> &str {
        self.load
            .archive_name
            .as_deref()
            .unwrap_or(DEFAULT_ARCHIVE_NAME)
    }

    fn api_key(&self) -> Option<&str> {
        self.source.api_key.as_deref()
    }

    fn request_timeout_secs(&self) -> u64 {
        self.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("pipeline.name", &self.pipeline.name)?;
        validation::validate_url(
            "source.carpark_info_endpoint",
            &self.source.carpark_info_endpoint,
        )?;
        validation::validate_url(
            "source.availability_endpoint",
            &self.source.availability_endpoint,
        )?;
        if let Some(api_key) = &self.source.api_key {
            if api_key.starts_with("${") {
                return Err(EtlError::MissingConfigError {
                    field: format!("source.api_key ({} is not set)", api_key),
                });
            }
            validation::validate_non_empty_string("source.api_key", api_key)?;
        }
        validation::validate_range(
            "source.timeout_seconds",
            self.request_timeout_secs(),
            1,
            MAX_TIMEOUT_SECS,
        )?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_output_formats("load.output_formats", &self.load.output_formats)?;
        validation::validate_archive_name("load.archive_name", self.archive_name())?;
        Ok(())
    }
}
