use crate::domain::model::{Coordinates, Resolution};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn crops_path(&self) -> &str;
    fn districts_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn report_filename(&self) -> &str;
    fn weather_endpoint(&self) -> &str;
    fn weather_api_key(&self) -> Option<&str>;
    fn geocode_endpoint(&self) -> &str;
    fn ip_lookup_endpoint(&self) -> &str;
    fn user_agent(&self) -> &str;
    fn advisor_endpoint(&self) -> &str;
    fn advisor_api_key(&self) -> Option<&str>;
    fn advisor_model(&self) -> &str;
}

/// Free-text advice source. Never fails; failures come back as `"Error: ..."` text.
#[async_trait]
pub trait Advisor: Send + Sync {
    async fn advise(&self, prompt: &str) -> String;
}

#[async_trait]
pub trait LocationResolver: Send + Sync {
    /// Resolves the given coordinates, or the device's own position when `None`.
    async fn resolve(&self, coordinates: Option<Coordinates>) -> Resolution;
}
