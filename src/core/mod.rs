pub mod advisor;
pub mod catalog;
pub mod engine;
pub mod locator;
pub mod report;
pub mod scorer;

pub use crate::domain::model::{
    CropMatch, CropRequirement, DistrictProfile, Report, Resolution, SoilConditions,
};
pub use crate::domain::ports::{Advisor, ConfigProvider, LocationResolver, Storage};
pub use crate::utils::error::Result;
