use crate::adapters::http::check_response;
use crate::domain::model::Coordinates;
use crate::utils::error::Result;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde_json::Value;

const SERVICE: &str = "reverse geocoding";

/// Address fields checked for a district-level name, most specific first.
const DISTRICT_FIELDS: [&str; 3] = ["state_district", "district", "county"];

/// Reverse geocoder for a Nominatim style `/reverse` endpoint.
#[derive(Debug, Clone)]
pub struct ReverseGeocoder {
    client: Client,
    endpoint: String,
    user_agent: String,
}

impl ReverseGeocoder {
    pub fn new(client: Client, endpoint: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            user_agent: user_agent.into(),
        }
    }

    /// District name for the coordinates, `None` when the address has no district field.
    pub async fn district(&self, coordinates: Coordinates) -> Result<Option<String>> {
        tracing::debug!("Reverse geocoding {} via {}", coordinates, self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .header(USER_AGENT, &self.user_agent)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
            ])
            .send()
            .await?;

        let body: Value = check_response(SERVICE, response).await?.json().await?;
        Ok(extract_district(&body))
    }
}

pub fn extract_district(body: &Value) -> Option<String> {
    let address = body.get("address")?;
    DISTRICT_FIELDS
        .iter()
        .filter_map(|field| address.get(*field).and_then(Value::as_str))
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
}
