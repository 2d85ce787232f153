use crate::adapters::{IpLocator, ReverseGeocoder, WeatherClient};
use crate::core::catalog::DistrictTable;
use crate::domain::model::{Coordinates, LocationReading, Resolution};
use crate::domain::ports::LocationResolver;
use async_trait::async_trait;

/// Coordinates → district → soil/moisture, plus live temperature.
///
/// Every failing step turns into [`Resolution::NotFound`] so the caller can
/// fall back to manual input.
pub struct LocationService {
    ip_locator: IpLocator,
    geocoder: ReverseGeocoder,
    weather: WeatherClient,
    districts: DistrictTable,
}

impl LocationService {
    pub fn new(
        ip_locator: IpLocator,
        geocoder: ReverseGeocoder,
        weather: WeatherClient,
        districts: DistrictTable,
    ) -> Self {
        Self {
            ip_locator,
            geocoder,
            weather,
            districts,
        }
    }
}

#[async_trait]
impl LocationResolver for LocationService {
    async fn resolve(&self, coordinates: Option<Coordinates>) -> Resolution {
        let coordinates = match coordinates {
            Some(coordinates) => coordinates,
            None => match self.ip_locator.locate().await {
                Ok(coordinates) => coordinates,
                Err(e) => {
                    tracing::warn!("⚠️ Could not determine device location: {}", e);
                    return Resolution::NotFound(format!("device location unavailable: {}", e));
                }
            },
        };
        tracing::info!("📍 Resolving location {}", coordinates);

        let district = match self.geocoder.district(coordinates).await {
            Ok(Some(district)) => district,
            Ok(None) => {
                return Resolution::NotFound(format!("no district found for {}", coordinates));
            }
            Err(e) => {
                tracing::warn!("⚠️ Reverse geocoding failed: {}", e);
                return Resolution::NotFound(format!("reverse geocoding failed: {}", e));
            }
        };

        let Some(profile) = self.districts.lookup(&district) else {
            tracing::warn!("⚠️ District '{}' is not in the district table", district);
            return Resolution::NotFound(format!("no soil data for district '{}'", district));
        };

        let temperature = match self.weather.current_temperature(coordinates).await {
            Ok(temperature) => temperature,
            Err(e) => {
                tracing::warn!("⚠️ Weather lookup failed: {}", e);
                return Resolution::NotFound(format!("temperature unavailable: {}", e));
            }
        };

        Resolution::Found(LocationReading {
            coordinates,
            district,
            soil_type: profile.soil_type.clone(),
            moisture: profile.moisture_percent,
            temperature,
        })
    }
}
