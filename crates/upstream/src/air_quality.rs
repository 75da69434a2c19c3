//! Air quality from the OpenWeatherMap air pollution API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fetch::{FetchError, ResilientClient};

/// Pollutant concentrations (μg/m³) plus the 1..=5 air quality index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReport {
    pub latitude: f64,
    pub longitude: f64,
    pub aqi: u8,
    pub category: String,
    pub pm2_5: f64,
    pub pm10: f64,
    pub o3: f64,
    pub no2: f64,
    pub so2: f64,
    pub co: f64,
    pub observed_at: DateTime<Utc>,
}

/// Label for the OpenWeatherMap index (1 = good, 5 = very poor).
pub fn aqi_category(aqi: u8) -> &'static str {
    match aqi {
        1 => "good",
        2 => "fair",
        3 => "moderate",
        4 => "poor",
        5 => "very_poor",
        _ => "unknown",
    }
}

#[derive(Debug, Deserialize)]
struct PollutionResponse {
    list: Vec<PollutionEntry>,
}

#[derive(Debug, Deserialize)]
struct PollutionEntry {
    main: PollutionIndex,
    components: Components,
    dt: i64,
}

#[derive(Debug, Deserialize)]
struct PollutionIndex {
    aqi: u8,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Components {
    co: f64,
    no2: f64,
    o3: f64,
    so2: f64,
    pm2_5: f64,
    pm10: f64,
}

fn normalise(raw: PollutionResponse, latitude: f64, longitude: f64) -> Result<AirQualityReport, FetchError> {
    let entry = raw
        .list
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Decode("air pollution list is empty".to_string()))?;
    let observed_at = DateTime::from_timestamp(entry.dt, 0)
        .ok_or_else(|| FetchError::Decode(format!("invalid observation timestamp {}", entry.dt)))?;
    let c = entry.components;
    Ok(AirQualityReport {
        latitude,
        longitude,
        aqi: entry.main.aqi,
        category: aqi_category(entry.main.aqi).to_string(),
        pm2_5: c.pm2_5,
        pm10: c.pm10,
        o3: c.o3,
        no2: c.no2,
        so2: c.so2,
        co: c.co,
        observed_at,
    })
}

#[derive(Clone)]
pub struct AirQualityClient {
    http: ResilientClient,
    base_url: String,
    api_key: Option<String>,
}

impl AirQualityClient {
    pub fn new(http: ResilientClient, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    pub async fn current(&self, latitude: f64, longitude: f64) -> Result<AirQualityReport, FetchError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(FetchError::NotConfigured("OPENWEATHER_API_KEY"))?;
        let url = format!("{}/data/2.5/air_pollution", self.base_url.trim_end_matches('/'));
        let (lat, lon) = (latitude.to_string(), longitude.to_string());
        let raw: PollutionResponse = self
            .http
            .get_json_as(&url, &[("lat", lat.as_str()), ("lon", lon.as_str()), ("appid", key)])
            .await?;
        normalise(raw, latitude, longitude)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::test_support::{spawn_server, test_client};

    fn body() -> serde_json::Value {
        json!({
            "coord": {"lon": 106.8, "lat": -6.2},
            "list": [{
                "main": {"aqi": 4},
                "components": {
                    "co": 1200.5, "no": 0.1, "no2": 35.2, "o3": 60.1,
                    "so2": 12.0, "pm2_5": 58.3, "pm10": 75.9, "nh3": 3.2
                },
                "dt": 1_700_000_000
            }]
        })
    }

    #[test]
    fn categories() {
        assert_eq!(aqi_category(1), "good");
        assert_eq!(aqi_category(3), "moderate");
        assert_eq!(aqi_category(5), "very_poor");
        assert_eq!(aqi_category(0), "unknown");
    }

    #[test]
    fn normalises_first_entry() {
        let raw: PollutionResponse = serde_json::from_value(body()).unwrap();
        let report = normalise(raw, -6.2, 106.8).unwrap();
        assert_eq!(report.aqi, 4);
        assert_eq!(report.category, "poor");
        assert_eq!(report.pm2_5, 58.3);
        assert_eq!(report.co, 1200.5);
    }

    #[test]
    fn empty_list_is_a_decode_error() {
        let raw: PollutionResponse = serde_json::from_value(json!({"list": []})).unwrap();
        assert_matches!(normalise(raw, 0.0, 0.0), Err(FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn requires_api_key() {
        let client = AirQualityClient::new(test_client(), "http://127.0.0.1:9", None);
        assert_matches!(
            client.current(0.0, 0.0).await,
            Err(FetchError::NotConfigured("OPENWEATHER_API_KEY"))
        );
    }

    #[tokio::test]
    async fn fetches_report() {
        let router = Router::new().route("/data/2.5/air_pollution", get(|| async { Json(body()) }));
        let base = spawn_server(router).await;

        let client = AirQualityClient::new(test_client(), base, Some("key".into()));
        let report = client.current(-6.2, 106.8).await.unwrap();
        assert_eq!(report.category, "poor");
        assert_eq!(report.latitude, -6.2);
    }
}
