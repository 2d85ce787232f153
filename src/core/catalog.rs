use crate::domain::model::{CropRequirement, DistrictProfile};
use crate::utils::error::{CropError, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CropRow {
    #[serde(rename = "Crop")]
    crop: String,
    #[serde(rename = "Preferred_Soil_Types")]
    preferred_soil_types: String,
    #[serde(rename = "Ideal_Moisture_Level (%)")]
    ideal_moisture: f64,
    #[serde(rename = "Temperature_Range (°C)", default)]
    temperature_range: Option<String>,
    #[serde(rename = "Rainfall_Need (mm/year)", default)]
    rainfall_need: Option<String>,
    #[serde(rename = "Temp_Min", default)]
    temp_min: Option<f64>,
    #[serde(rename = "Temp_Max", default)]
    temp_max: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DistrictRow {
    #[serde(rename = "DistrictName")]
    district_name: String,
    #[serde(rename = "Soil_Type")]
    soil_type: String,
    #[serde(rename = "Moisture_Percentage")]
    moisture_percent: f64,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CropRow {
    fn into_requirement(self, line: usize) -> Result<CropRequirement> {
        let name = self.crop.trim().to_string();
        if name.is_empty() {
            return Err(CropError::CatalogError {
                message: format!("row {} has an empty crop name", line),
            });
        }

        let mut preferred_soil_types: Vec<String> = Vec::new();
        for soil in self.preferred_soil_types.split(',') {
            let soil = soil.trim();
            if soil.is_empty() {
                continue;
            }
            if !preferred_soil_types
                .iter()
                .any(|known| known.eq_ignore_ascii_case(soil))
            {
                preferred_soil_types.push(soil.to_string());
            }
        }

        Ok(CropRequirement {
            name,
            preferred_soil_types,
            ideal_moisture_percent: self.ideal_moisture,
            temp_min: self.temp_min,
            temp_max: self.temp_max,
            temperature_range: non_blank(self.temperature_range),
            rainfall_need: non_blank(self.rainfall_need),
        })
    }
}

/// Crop requirement table. Loaded once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct CropCatalog {
    crops: Vec<CropRequirement>,
}

impl CropCatalog {
    pub fn new(crops: Vec<CropRequirement>) -> Result<Self> {
        if crops.is_empty() {
            return Err(CropError::CatalogError {
                message: "crop table has no rows".to_string(),
            });
        }
        Ok(Self { crops })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading crop table from {}", path.display());
        let file = std::fs::File::open(path)?;
        let catalog = Self::from_reader(file)?;
        tracing::info!("🌾 Loaded {} crops from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut crops = Vec::new();
        for (index, row) in csv_reader.deserialize::<CropRow>().enumerate() {
            // 標題列算第 1 行
            crops.push(row?.into_requirement(index + 2)?);
        }

        Self::new(crops)
    }

    pub fn crops(&self) -> &[CropRequirement] {
        &self.crops
    }

    pub fn len(&self) -> usize {
        self.crops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&CropRequirement> {
        let name = name.trim().to_lowercase();
        self.crops.iter().find(|crop| crop.name.to_lowercase() == name)
    }

    pub fn get(&self, name: &str) -> Result<&CropRequirement> {
        self.find(name).ok_or_else(|| CropError::UnknownCropError {
            name: name.to_string(),
        })
    }

    /// Distinct soil types across the table, in first-seen order.
    pub fn soil_types(&self) -> Vec<&str> {
        let mut soils: Vec<&str> = Vec::new();
        for soil in self.crops.iter().flat_map(|c| c.preferred_soil_types.iter()) {
            if !soils.iter().any(|known| known.eq_ignore_ascii_case(soil)) {
                soils.push(soil.as_str());
            }
        }
        soils
    }
}

/// District soil/moisture reference table.
#[derive(Debug, Clone, Default)]
pub struct DistrictTable {
    districts: Vec<DistrictProfile>,
}

impl DistrictTable {
    pub fn new(districts: Vec<DistrictProfile>) -> Self {
        Self { districts }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading district table from {}", path.display());
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file)?;
        tracing::info!("🗺️ Loaded {} districts from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let districts = csv_reader
            .deserialize::<DistrictRow>()
            .map(|row| {
                row.map(|r| DistrictProfile {
                    district_name: r.district_name,
                    soil_type: r.soil_type,
                    moisture_percent: r.moisture_percent,
                })
            })
            .collect::<std::result::Result<Vec<_>, csv::Error>>()?;

        Ok(Self::new(districts))
    }

    /// Case-insensitive exact match on the district name; first row wins.
    pub fn lookup(&self, district: &str) -> Option<&DistrictProfile> {
        let wanted = district.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.districts
            .iter()
            .find(|d| d.district_name.trim().to_lowercase() == wanted)
    }

    pub fn len(&self) -> usize {
        self.districts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CROPS: &str = "\
Crop,Preferred_Soil_Types,Ideal_Moisture_Level (%),Temperature_Range (°C),Rainfall_Need (mm/year),Temp_Min,Temp_Max
Rice,\"Clayey, Loamy\",80,20-35,1500-2000,20,35
Wheat,\"Loamy, Sandy Loam\",50,10-25,450-650,10,25
Millet,\"Sandy, Loamy, sandy\",30,,,,
";

    const DISTRICTS: &str = "\
DistrictName,Soil_Type,Moisture_Percentage
Mysuru,Red,32
Mandya, Clayey ,45
";

    #[test]
    fn test_parse_crop_table() {
        let catalog = CropCatalog::from_reader(CROPS.as_bytes()).unwrap();

        assert_eq!(catalog.len(), 3);
        let rice = &catalog.crops()[0];
        assert_eq!(rice.name, "Rice");
        assert_eq!(rice.preferred_soil_types, vec!["Clayey", "Loamy"]);
        assert_eq!(rice.ideal_moisture_percent, 80.0);
        assert_eq!(rice.temp_min, Some(20.0));
        assert_eq!(rice.temp_max, Some(35.0));
        assert_eq!(rice.rainfall_need.as_deref(), Some("1500-2000"));
    }

    #[test]
    fn test_missing_temperature_bounds_are_none() {
        let catalog = CropCatalog::from_reader(CROPS.as_bytes()).unwrap();
        let millet = catalog.find("millet").unwrap();

        assert_eq!(millet.temp_min, None);
        assert_eq!(millet.temp_max, None);
        assert_eq!(millet.temperature_range, None);
        assert_eq!(millet.temperature_label(), "n/a");
        // 重複的土壤類型只保留一次
        assert_eq!(millet.preferred_soil_types, vec!["Sandy", "Loamy"]);
    }

    #[test]
    fn test_soil_types_are_distinct_in_table_order() {
        let catalog = CropCatalog::from_reader(CROPS.as_bytes()).unwrap();
        assert_eq!(catalog.soil_types(), vec!["Clayey", "Loamy", "Sandy Loam", "Sandy"]);
    }

    #[test]
    fn test_unknown_crop() {
        let catalog = CropCatalog::from_reader(CROPS.as_bytes()).unwrap();
        assert!(matches!(
            catalog.get("Kiwi"),
            Err(CropError::UnknownCropError { .. })
        ));
        assert_eq!(catalog.get(" WHEAT ").unwrap().name, "Wheat");
    }

    #[test]
    fn test_empty_crop_table_is_rejected() {
        let header = "Crop,Preferred_Soil_Types,Ideal_Moisture_Level (%),Temp_Min,Temp_Max\n";
        assert!(matches!(
            CropCatalog::from_reader(header.as_bytes()),
            Err(CropError::CatalogError { .. })
        ));
    }

    #[test]
    fn test_blank_crop_name_is_rejected() {
        let table = "Crop,Preferred_Soil_Types,Ideal_Moisture_Level (%)\n ,Loamy,40\n";
        assert!(matches!(
            CropCatalog::from_reader(table.as_bytes()),
            Err(CropError::CatalogError { .. })
        ));
    }

    #[test]
    fn test_district_lookup_is_case_insensitive() {
        let table = DistrictTable::from_reader(DISTRICTS.as_bytes()).unwrap();

        let upper = table.lookup("Mysuru").unwrap();
        let lower = table.lookup("mysuru").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.soil_type, "Red");
        assert_eq!(upper.moisture_percent, 32.0);

        assert_eq!(table.lookup("mandya").unwrap().soil_type, "Clayey");
        assert!(table.lookup("Bengaluru").is_none());
        assert!(table.lookup("").is_none());
    }

    #[test]
    fn test_district_lookup_is_exact() {
        let table = DistrictTable::from_reader(DISTRICTS.as_bytes()).unwrap();
        assert!(table.lookup("Mysuru District").is_none());
        assert!(table.lookup("Mys").is_none());
    }
}
