pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use config::TomlConfig;
pub use core::{
    advisor::AdvisorClient,
    catalog::{CropCatalog, DistrictTable},
    engine::AdvisorEngine,
    locator::LocationService,
    report::ReportRenderer,
};
pub use utils::error::{CropError, Result};
