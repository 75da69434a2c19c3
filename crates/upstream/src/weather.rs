//! Current weather conditions with a provider fallback chain.
//!
//! OpenWeatherMap is tried first when an API key is configured, then
//! Open-Meteo (keyless). Both are normalised into [`WeatherReport`]. When
//! every provider fails the caller can serve [`WeatherReport::mock`].

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fetch::{FetchError, ResilientClient};

pub const DEFAULT_OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com";

pub const SOURCE_OPENWEATHER: &str = "openweathermap";
pub const SOURCE_OPEN_METEO: &str = "open-meteo";
pub const SOURCE_MOCK: &str = "mock";

/// Normalised current conditions at a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub source: String,
    pub latitude: f64,
    pub longitude: f64,
    pub location_name: Option<String>,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_ms: f64,
    pub precipitation_mm: f64,
    pub description: String,
    pub observed_at: DateTime<Utc>,
}

impl WeatherReport {
    /// Plausible tropical placeholder served when no provider answers.
    pub fn mock(latitude: f64, longitude: f64) -> Self {
        Self {
            source: SOURCE_MOCK.to_string(),
            latitude,
            longitude,
            location_name: None,
            temperature_c: 28.0,
            humidity_pct: 80.0,
            wind_speed_ms: 2.5,
            precipitation_mm: 0.0,
            description: "partly cloudy".to_string(),
            observed_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Provider payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct OwmCurrent {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    main: OwmMain,
    #[serde(default)]
    wind: Option<OwmWind>,
    #[serde(default)]
    rain: Option<OwmPrecipitation>,
    dt: i64,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwmPrecipitation {
    #[serde(rename = "1h", default)]
    one_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    current: OpenMeteoCurrent,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoCurrent {
    time: String,
    temperature_2m: f64,
    relative_humidity_2m: f64,
    #[serde(default)]
    precipitation: f64,
    wind_speed_10m: f64,
    weather_code: u32,
}

fn from_openweather(raw: OwmCurrent, latitude: f64, longitude: f64) -> Result<WeatherReport, FetchError> {
    let observed_at = DateTime::from_timestamp(raw.dt, 0)
        .ok_or_else(|| FetchError::Decode(format!("invalid observation timestamp {}", raw.dt)))?;
    Ok(WeatherReport {
        source: SOURCE_OPENWEATHER.to_string(),
        latitude,
        longitude,
        location_name: raw.name.filter(|n| !n.is_empty()),
        temperature_c: raw.main.temp,
        humidity_pct: raw.main.humidity,
        wind_speed_ms: raw.wind.map(|w| w.speed).unwrap_or(0.0),
        precipitation_mm: raw.rain.and_then(|r| r.one_hour).unwrap_or(0.0),
        description: raw
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .unwrap_or_else(|| "unknown".to_string()),
        observed_at,
    })
}

fn from_open_meteo(
    raw: OpenMeteoResponse,
    latitude: f64,
    longitude: f64,
) -> Result<WeatherReport, FetchError> {
    let current = raw.current;
    // Open-Meteo reports local ISO time without an offset; GMT is requested.
    let observed_at = NaiveDateTime::parse_from_str(&current.time, "%Y-%m-%dT%H:%M")
        .map_err(|e| FetchError::Decode(format!("invalid time {:?}: {e}", current.time)))?
        .and_utc();
    Ok(WeatherReport {
        source: SOURCE_OPEN_METEO.to_string(),
        latitude,
        longitude,
        location_name: None,
        temperature_c: current.temperature_2m,
        humidity_pct: current.relative_humidity_2m,
        wind_speed_ms: current.wind_speed_10m,
        precipitation_mm: current.precipitation,
        description: wmo_description(current.weather_code).to_string(),
        observed_at,
    })
}

/// Text for a WMO weather interpretation code.
pub fn wmo_description(code: u32) -> &'static str {
    match code {
        0 => "clear sky",
        1 => "mainly clear",
        2 => "partly cloudy",
        3 => "overcast",
        45 | 48 => "fog",
        51 | 53 | 55 => "drizzle",
        56 | 57 => "freezing drizzle",
        61 => "light rain",
        63 => "moderate rain",
        65 => "heavy rain",
        66 | 67 => "freezing rain",
        71 | 73 | 75 | 77 => "snow",
        80 | 81 => "rain showers",
        82 => "violent rain showers",
        85 | 86 => "snow showers",
        95 => "thunderstorm",
        96 | 99 => "thunderstorm with hail",
        _ => "unknown",
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct WeatherClient {
    http: ResilientClient,
    openweather_base: String,
    openweather_api_key: Option<String>,
    open_meteo_base: String,
}

impl WeatherClient {
    pub fn new(
        http: ResilientClient,
        openweather_base: impl Into<String>,
        openweather_api_key: Option<String>,
        open_meteo_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            openweather_base: openweather_base.into(),
            openweather_api_key: openweather_api_key.filter(|k| !k.is_empty()),
            open_meteo_base: open_meteo_base.into(),
        }
    }

    /// Current conditions from the first provider that answers.
    ///
    /// Returns the last provider error when all of them fail.
    pub async fn current(&self, latitude: f64, longitude: f64) -> Result<WeatherReport, FetchError> {
        if self.openweather_api_key.is_some() {
            match self.from_openweather(latitude, longitude).await {
                Ok(report) => return Ok(report),
                Err(e) => {
                    tracing::warn!(error = %e, "OpenWeatherMap failed, falling back to Open-Meteo");
                }
            }
        }
        self.from_open_meteo(latitude, longitude).await
    }

    pub async fn from_openweather(&self, latitude: f64, longitude: f64) -> Result<WeatherReport, FetchError> {
        let key = self
            .openweather_api_key
            .as_deref()
            .ok_or(FetchError::NotConfigured("OPENWEATHER_API_KEY"))?;
        let url = format!("{}/data/2.5/weather", self.openweather_base.trim_end_matches('/'));
        let (lat, lon) = (latitude.to_string(), longitude.to_string());
        let raw: OwmCurrent = self
            .http
            .get_json_as(
                &url,
                &[("lat", lat.as_str()), ("lon", lon.as_str()), ("units", "metric"), ("appid", key)],
            )
            .await?;
        from_openweather(raw, latitude, longitude)
    }

    pub async fn from_open_meteo(&self, latitude: f64, longitude: f64) -> Result<WeatherReport, FetchError> {
        let url = format!("{}/v1/forecast", self.open_meteo_base.trim_end_matches('/'));
        let (lat, lon) = (latitude.to_string(), longitude.to_string());
        let raw: OpenMeteoResponse = self
            .http
            .get_json_as(
                &url,
                &[
                    ("latitude", lat.as_str()),
                    ("longitude", lon.as_str()),
                    (
                        "current",
                        "temperature_2m,relative_humidity_2m,precipitation,wind_speed_10m,weather_code",
                    ),
                    ("wind_speed_unit", "ms"),
                    ("timezone", "GMT"),
                ],
            )
            .await?;
        from_open_meteo(raw, latitude, longitude)
    }
}
