// Adapters layer: concrete clients for external systems (weather, geocoding, ip lookup, chat completion).

pub mod chat;
pub mod geocoding;
pub mod http;
pub mod ip_location;
pub mod weather;

pub use chat::ChatCompletionClient;
pub use geocoding::ReverseGeocoder;
pub use ip_location::IpLocator;
pub use weather::WeatherClient;
