//! Weighted point scoring of field conditions against crop requirements.
//!
//! Soil match is worth 40 points, moisture and temperature 30 each, so a
//! score always lands in `0..=100`.

use crate::core::catalog::CropCatalog;
use crate::domain::model::{CropMatch, CropRequirement, SoilConditions, SuitabilityVerdict};

pub const SOIL_POINTS: u8 = 40;
pub const MOISTURE_POINTS: u8 = 30;
pub const TEMPERATURE_POINTS: u8 = 30;

/// Number of crops returned by [`rank`].
pub const TOP_MATCHES: usize = 5;

/// Minimum score for a crop to count as suitable.
pub const SUITABLE_THRESHOLD: u8 = 70;

pub fn soil_points(crop: &CropRequirement, soil: &str) -> u8 {
    if crop.prefers_soil(soil) {
        SOIL_POINTS
    } else {
        0
    }
}

pub fn moisture_points(crop: &CropRequirement, moisture: f64) -> u8 {
    let diff = (moisture - crop.ideal_moisture_percent).abs();
    if diff <= 5.0 {
        MOISTURE_POINTS
    } else if diff <= 10.0 {
        20
    } else if diff <= 15.0 {
        10
    } else {
        0
    }
}

pub fn temperature_points(crop: &CropRequirement, temperature: f64) -> u8 {
    let (Some(min), Some(max)) = (crop.temp_min, crop.temp_max) else {
        return 0;
    };

    let nearest = (temperature - min).abs().min((temperature - max).abs());
    if min <= temperature && temperature <= max {
        TEMPERATURE_POINTS
    } else if nearest <= 5.0 {
        20
    } else if nearest <= 10.0 {
        10
    } else {
        0
    }
}

pub fn score(crop: &CropRequirement, soil: &str, moisture: f64, temperature: f64) -> u8 {
    soil_points(crop, soil) + moisture_points(crop, moisture) + temperature_points(crop, temperature)
}

pub fn score_conditions(crop: &CropRequirement, conditions: &SoilConditions) -> u8 {
    score(
        crop,
        &conditions.soil,
        conditions.moisture,
        conditions.temperature,
    )
}

/// Stricter all-or-nothing rule for checking a single crop: soil match,
/// moisture within 5 of the ideal, temperature inside the crop's range.
/// No partial credit. Missing temperature bounds give 0 temperature points.
pub fn suitability_score(crop: &CropRequirement, conditions: &SoilConditions) -> u8 {
    let moisture = if (conditions.moisture - crop.ideal_moisture_percent).abs() <= 5.0 {
        MOISTURE_POINTS
    } else {
        0
    };
    let temperature = match (crop.temp_min, crop.temp_max) {
        (Some(min), Some(max)) if min <= conditions.temperature && conditions.temperature <= max => {
            TEMPERATURE_POINTS
        }
        _ => 0,
    };
    soil_points(crop, &conditions.soil) + moisture + temperature
}

/// Scores every crop and keeps the best [`TOP_MATCHES`]. Ties keep table order.
pub fn rank<'a>(catalog: &'a CropCatalog, conditions: &SoilConditions) -> Vec<CropMatch<'a>> {
    let mut matches: Vec<CropMatch<'a>> = catalog
        .crops()
        .iter()
        .map(|crop| CropMatch {
            crop,
            score: score_conditions(crop, conditions),
        })
        .collect();

    // sort_by 是穩定排序
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches.truncate(TOP_MATCHES);
    matches
}

pub fn verdict(score: u8) -> SuitabilityVerdict {
    if score >= SUITABLE_THRESHOLD {
        SuitabilityVerdict::Suitable
    } else {
        SuitabilityVerdict::NotSuitable
    }
}
