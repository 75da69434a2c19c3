//! Third-party data providers behind a shared resilient HTTP client.

pub mod air_quality;
pub mod disaster;
pub mod earthquake;
pub mod fetch;
pub mod water_level;
pub mod weather;

pub use fetch::{FetchError, ResilientClient};

use air_quality::AirQualityClient;
use disaster::DisasterClient;
use earthquake::EarthquakeClient;
use water_level::WaterLevelClient;
use weather::WeatherClient;

/// Provider endpoints and credentials.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub openweather_api_key: Option<String>,
    pub openweather_base_url: String,
    pub open_meteo_base_url: String,
    pub earthquake_feed_url: String,
    pub disaster_reports_url: String,
    pub water_level_api_url: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            openweather_api_key: None,
            openweather_base_url: weather::DEFAULT_OPENWEATHER_BASE_URL.to_string(),
            open_meteo_base_url: weather::DEFAULT_OPEN_METEO_BASE_URL.to_string(),
            earthquake_feed_url: earthquake::DEFAULT_FEED_URL.to_string(),
            disaster_reports_url: disaster::DEFAULT_REPORTS_URL.to_string(),
            water_level_api_url: None,
        }
    }
}

/// Every provider client, all sharing one connection pool and breaker.
#[derive(Clone)]
pub struct Providers {
    pub weather: WeatherClient,
    pub air_quality: AirQualityClient,
    pub earthquakes: EarthquakeClient,
    pub disasters: DisasterClient,
    pub water_level: WaterLevelClient,
}

impl Providers {
    pub fn new(http: ResilientClient, config: ProviderConfig) -> Self {
        Self {
            weather: WeatherClient::new(
                http.clone(),
                config.openweather_base_url.clone(),
                config.openweather_api_key.clone(),
                config.open_meteo_base_url,
            ),
            air_quality: AirQualityClient::new(
                http.clone(),
                config.openweather_base_url,
                config.openweather_api_key,
            ),
            earthquakes: EarthquakeClient::new(http.clone(), config.earthquake_feed_url),
            disasters: DisasterClient::new(http.clone(), config.disaster_reports_url),
            water_level: WaterLevelClient::new(http, config.water_level_api_url),
        }
    }
}
