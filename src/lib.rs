pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{LocalStorage, TomlConfig};

pub use self::core::{etl::EtlEngine, pipeline::CarparkPipeline};
pub use domain::index::{AttachSummary, AvailabilityIndex};
pub use domain::model::{Availability, Carpark, CarparkInfo, Coordinate};
pub use utils::error::{EtlError, Result};
