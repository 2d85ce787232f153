use serde::{Deserialize, Serialize};
use std::fmt;

/// Growing requirements of one crop, as read from the crop table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRequirement {
    pub name: String,
    pub preferred_soil_types: Vec<String>,
    pub ideal_moisture_percent: f64,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub temperature_range: Option<String>,
    pub rainfall_need: Option<String>,
}

impl CropRequirement {
    /// Case-insensitive membership test against the preferred soil types.
    pub fn prefers_soil(&self, soil: &str) -> bool {
        let soil = soil.trim().to_lowercase();
        !soil.is_empty()
            && self
                .preferred_soil_types
                .iter()
                .any(|preferred| preferred.to_lowercase() == soil)
    }

    pub fn soil_list(&self) -> String {
        self.preferred_soil_types.join(", ")
    }

    /// Display text for the temperature range; falls back to the numeric bounds.
    pub fn temperature_label(&self) -> String {
        if let Some(range) = &self.temperature_range {
            return range.clone();
        }
        match (self.temp_min, self.temp_max) {
            (Some(min), Some(max)) => format!("{}-{}", min, max),
            _ => "n/a".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictProfile {
    pub district_name: String,
    pub soil_type: String,
    pub moisture_percent: f64,
}

/// Field conditions a crop is scored against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilConditions {
    pub soil: String,
    pub moisture: f64,
    pub temperature: f64,
}

impl SoilConditions {
    pub fn new(soil: impl Into<String>, moisture: f64, temperature: f64) -> Self {
        Self {
            soil: soil.into(),
            moisture,
            temperature,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropMatch<'a> {
    pub crop: &'a CropRequirement,
    pub score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuitabilityVerdict {
    Suitable,
    NotSuitable,
}

impl fmt::Display for SuitabilityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuitabilityVerdict::Suitable => write!(f, "Suitable for this crop"),
            SuitabilityVerdict::NotSuitable => write!(f, "Not suitable for this crop"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Everything the location resolver could work out for a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReading {
    pub coordinates: Coordinates,
    pub district: String,
    pub soil_type: String,
    pub moisture: f64,
    pub temperature: f64,
}

impl LocationReading {
    pub fn conditions(&self) -> SoilConditions {
        SoilConditions::new(self.soil_type.clone(), self.moisture, self.temperature)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(LocationReading),
    NotFound(String),
}

impl Resolution {
    pub fn found(self) -> Option<LocationReading> {
        match self {
            Resolution::Found(reading) => Some(reading),
            Resolution::NotFound(_) => None,
        }
    }
}

/// Input of the report renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub user_input: String,
    pub match_data: Option<String>,
    pub advice: String,
}
