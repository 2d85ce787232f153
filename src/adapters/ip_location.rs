use crate::adapters::http::{check_response, malformed};
use crate::domain::model::Coordinates;
use crate::utils::error::Result;
use reqwest::Client;
use serde::Deserialize;

const SERVICE: &str = "IP lookup";

#[derive(Debug, Deserialize)]
struct IpInfo {
    loc: Option<String>,
}

/// Approximate device position from an ipinfo.io style endpoint.
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: Client,
    endpoint: String,
}

impl IpLocator {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub async fn locate(&self) -> Result<Coordinates> {
        tracing::debug!("Looking up device position via {}", self.endpoint);
        let response = self.client.get(&self.endpoint).send().await?;
        let info: IpInfo = check_response(SERVICE, response).await?.json().await?;

        let loc = info.loc.ok_or_else(|| malformed(SERVICE, "missing loc field"))?;
        parse_loc(&loc).ok_or_else(|| malformed(SERVICE, format!("unparseable loc '{}'", loc)))
    }
}

/// Parses `"lat,lon"`.
pub fn parse_loc(loc: &str) -> Option<Coordinates> {
    let (lat, lon) = loc.split_once(',')?;
    let latitude: f64 = lat.trim().parse().ok()?;
    let longitude: f64 = lon.trim().parse().ok()?;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }
    Some(Coordinates {
        latitude,
        longitude,
    })
}
