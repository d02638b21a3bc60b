pub mod local;
pub mod toml_config;

pub use local::LocalStorage;
pub use toml_config::TomlConfig;

pub const DEFAULT_ARCHIVE_NAME: &str = "carpark_output.zip";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const MAX_TIMEOUT_SECS: u64 = 300;

#[cfg(feature = "cli")]
mod cli_config {
    use super::{DEFAULT_ARCHIVE_NAME, MAX_TIMEOUT_SECS};
    use crate::core::ConfigProvider;
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate};
    use clap::Parser;
    use std::path::PathBuf;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "carpark-etl")]
    #[command(about = "Fetch carpark information and availability feeds into a single archive")]
    pub struct CliConfig {
        #[arg(
            long,
            default_value = "https://data.gov.sg/api/action/datastore_search?resource_id=d_23f946fa557947f93a8043bbef41dd09&limit=5000"
        )]
        pub carpark_info_endpoint: String,

        #[arg(
            long,
            default_value = "https://api.data.gov.sg/v1/transport/carpark-availability"
        )]
        pub availability_endpoint: String,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        #[arg(long = "formats", value_delimiter = ',', default_value = "csv,json")]
        pub output_formats: Vec<String>,

        #[arg(long, default_value = DEFAULT_ARCHIVE_NAME)]
        pub archive_name: String,

        #[arg(long, env = "CARPARK_API_KEY", hide_env_values = true)]
        pub api_key: Option<String>,

        #[arg(long, default_value = "30")]
        pub timeout_secs: u64,

        #[arg(long, help = "Read pipeline settings from a TOML file instead")]
        pub config: Option<PathBuf>,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub log_json: bool,

        #[arg(long, help = "Log CPU and memory usage per phase")]
        pub monitor: bool,
    }

    impl ConfigProvider for CliConfig {
        fn carpark_info_endpoint(&self) -> &str {
            &self.carpark_info_endpoint
        }

        fn availability_endpoint(&self) -> &str {
            &self.availability_endpoint
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_formats(&self) -> &[String] {
            &self.output_formats
        }

        fn archive_name(&self) -> &str {
            &self.archive_name
        }

        fn api_key(&self) -> Option<&str> {
            self.api_key.as_deref()
        }

        fn request_timeout_secs(&self) -> u64 {
            self.timeout_secs
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_url("carpark_info_endpoint", &self.carpark_info_endpoint)?;
            validation::validate_url("availability_endpoint", &self.availability_endpoint)?;
            validation::validate_path("output_path", &self.output_path)?;
            validation::validate_output_formats("formats", &self.output_formats)?;
            validation::validate_archive_name("archive_name", &self.archive_name)?;
            validation::validate_range("timeout_secs", self.timeout_secs, 1, MAX_TIMEOUT_SECS)?;
            if let Some(api_key) = &self.api_key {
                validation::validate_non_empty_string("api_key", api_key)?;
            }
            Ok(())
        }
    }

}

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;
