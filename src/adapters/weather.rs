use crate::adapters::http::{check_response, malformed};
use crate::domain::model::Coordinates;
use crate::utils::error::{CropError, Result};
use reqwest::Client;
use serde::Deserialize;

const SERVICE: &str = "weather";

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    main: Option<MainReadings>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: Option<f64>,
}

/// Current-temperature client for an OpenWeatherMap style endpoint.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl WeatherClient {
    pub fn new(client: Client, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        }
    }

    /// Current temperature in °C.
    pub async fn current_temperature(&self, coordinates: Coordinates) -> Result<f64> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| CropError::MissingConfigError {
                field: "weather.api_key".to_string(),
            })?;

        tracing::debug!("Requesting temperature at {} from {}", coordinates, self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
                ("appid", api_key.to_string()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        let body: WeatherResponse = check_response(SERVICE, response).await?.json().await?;
        body.main
            .and_then(|main| main.temp)
            .ok_or_else(|| malformed(SERVICE, "missing main.temp"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const MYSURU: Coordinates = Coordinates {
        latitude: 12.2958,
        longitude: 76.6394,
    };

    #[tokio::test]
    async fn test_current_temperature() {
        let server = MockServer::start();
        let weather_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/data/2.5/weather")
                .query_param("lat", "12.2958")
                .query_param("lon", "76.6394")
                .query_param("appid", "secret")
                .query_param("units", "metric");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"main": {"temp": 27.4, "humidity": 60}}));
        });

        let client = WeatherClient::new(
            Client::new(),
            server.url("/data/2.5/weather"),
            Some("secret".to_string()),
        );
        let temperature = client.current_temperature(MYSURU).await.unwrap();

        weather_mock.assert();
        assert_eq!(temperature, 27.4);
    }

    #[tokio::test]
    async fn test_unauthorized_is_service_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/weather");
            then.status(401).body("Invalid API key");
        });

        let client = WeatherClient::new(Client::new(), server.url("/weather"), Some("bad".to_string()));
        let err = client.current_temperature(MYSURU).await.unwrap_err();

        assert!(matches!(err, CropError::ServiceError { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_missing_temperature_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/weather");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"cod": 200}));
        });

        let client = WeatherClient::new(Client::new(), server.url("/weather"), Some("k".to_string()));
        let err = client.current_temperature(MYSURU).await.unwrap_err();

        assert!(matches!(err, CropError::MalformedResponseError { .. }));
    }

    #[tokio::test]
    async fn test_missing_api_key_skips_request() {
        let client = WeatherClient::new(Client::new(), "http://127.0.0.1:9/weather", None);
        let err = client.current_temperature(MYSURU).await.unwrap_err();

        assert!(matches!(err, CropError::MissingConfigError { .. }));
    }
}
