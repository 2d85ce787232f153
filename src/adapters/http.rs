//! Shared HTTP response helpers for the service clients.

use crate::utils::error::{CropError, Result};

/// Passes a successful response through; any other status becomes
/// [`CropError::ServiceError`] carrying the response body.
pub async fn check_response(service: &str, resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = resp.text().await.unwrap_or_default();
    tracing::debug!("{} responded with HTTP {}: {}", service, status, message);
    Err(CropError::ServiceError {
        service: service.to_string(),
        status: status.as_u16(),
        message,
    })
}

pub fn malformed(service: &str, message: impl Into<String>) -> CropError {
    CropError::MalformedResponseError {
        service: service.to_string(),
        message: message.into(),
    }
}
