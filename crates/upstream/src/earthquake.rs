//! Earthquake bulletins from the BMKG open data feed.
//!
//! BMKG publishes every field as a string (`"Magnitude": "5.0"`,
//! `"Kedalaman": "10 km"`), so the latest event is parsed into typed
//! [`Earthquake`] values here. The felt-earthquakes list is passed through.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fetch::{FetchError, ResilientClient};

pub const DEFAULT_FEED_URL: &str = "https://data.bmkg.go.id/DataMKG/TEWS";

const LATEST_FILE: &str = "autogempa.json";
const FELT_FILE: &str = "gempadirasakan.json";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A single normalised earthquake event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Earthquake {
    pub occurred_at: DateTime<Utc>,
    pub magnitude: f64,
    pub depth_km: f64,
    pub region: String,
    pub coordinates: Coordinates,
    /// Tsunami potential statement, when the bulletin carries one.
    pub potential: Option<String>,
    /// Regions that reported shaking (MMI scale).
    pub felt: Option<String>,
    pub shakemap_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LatestFeed {
    #[serde(rename = "Infogempa")]
    info: LatestInfo,
}

#[derive(Debug, Deserialize)]
struct LatestInfo {
    gempa: RawQuake,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawQuake {
    date_time: String,
    coordinates: String,
    magnitude: String,
    kedalaman: String,
    wilayah: String,
    #[serde(default)]
    potensi: Option<String>,
    #[serde(default)]
    dirasakan: Option<String>,
    #[serde(default)]
    shakemap: Option<String>,
}

fn decode_err(field: &str, value: &str) -> FetchError {
    FetchError::Decode(format!("invalid {field}: {value:?}"))
}

/// Parse `"-6.12,106.80"` into coordinates.
fn parse_coordinates(value: &str) -> Result<Coordinates, FetchError> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| decode_err("coordinates", value))?;
    let latitude = lat.trim().parse().map_err(|_| decode_err("coordinates", value))?;
    let longitude = lon.trim().parse().map_err(|_| decode_err("coordinates", value))?;
    Ok(Coordinates {
        latitude,
        longitude,
    })
}

/// Parse the leading number of `"10 km"`.
fn parse_depth_km(value: &str) -> Result<f64, FetchError> {
    value
        .split_whitespace()
        .next()
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| decode_err("depth", value))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn normalise(raw: RawQuake, feed_url: &str) -> Result<Earthquake, FetchError> {
    let occurred_at = DateTime::parse_from_rfc3339(&raw.date_time)
        .map_err(|_| decode_err("DateTime", &raw.date_time))?
        .with_timezone(&Utc);
    let magnitude = raw
        .magnitude
        .trim()
        .parse()
        .map_err(|_| decode_err("magnitude", &raw.magnitude))?;

    Ok(Earthquake {
        occurred_at,
        magnitude,
        depth_km: parse_depth_km(&raw.kedalaman)?,
        region: raw.wilayah.trim().to_string(),
        coordinates: parse_coordinates(&raw.coordinates)?,
        potential: non_empty(raw.potensi),
        felt: non_empty(raw.dirasakan).filter(|f| f != "-"),
        shakemap_url: non_empty(raw.shakemap)
            .map(|file| format!("{}/{file}", feed_url.trim_end_matches('/'))),
    })
}

#[derive(Clone)]
pub struct EarthquakeClient {
    http: ResilientClient,
    feed_url: String,
}

impl EarthquakeClient {
    pub fn new(http: ResilientClient, feed_url: impl Into<String>) -> Self {
        Self {
            http,
            feed_url: feed_url.into(),
        }
    }

    pub fn latest_url(&self) -> String {
        format!("{}/{LATEST_FILE}", self.feed_url.trim_end_matches('/'))
    }

    pub fn felt_url(&self) -> String {
        format!("{}/{FELT_FILE}", self.feed_url.trim_end_matches('/'))
    }

    /// The most recent significant earthquake.
    pub async fn latest(&self) -> Result<Earthquake, FetchError> {
        let feed: LatestFeed = self.http.get_json_as(&self.latest_url(), &[]).await?;
        normalise(feed.info.gempa, &self.feed_url)
    }

    /// Recent felt earthquakes, unmodified.
    pub async fn felt(&self) -> Result<serde_json::Value, FetchError> {
        self.http.get_json(&self.felt_url(), &[]).await
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

    fn latest_body() -> serde_json::Value {
        json!({
            "Infogempa": {
                "gempa": {
                    "Tanggal": "15 Jan 2024",
                    "Jam": "13:00:12 WIB",
                    "DateTime": "2024-01-15T06:00:12+00:00",
                    "Coordinates": "-7.45,106.21",
                    "Lintang": "7.45 LS",
                    "Bujur": "106.21 BT",
                    "Magnitude": "5.2",
                    "Kedalaman": "35 km",
                    "Wilayah": "Pusat gempa berada di laut 80 km BaratDaya Kab. Sukabumi",
                    "Potensi": "Tidak berpotensi tsunami",
                    "Dirasakan": "III Sukabumi, II Bogor",
                    "Shakemap": "20240115130012.mmi.jpg"
                }
            }
        })
    }

    #[test]
    fn parses_coordinates_and_depth() {
        assert_eq!(
            parse_coordinates("-7.45, 106.21").unwrap(),
            Coordinates {
                latitude: -7.45,
                longitude: 106.21
            }
        );
        assert_matches!(parse_coordinates("7.45 LS"), Err(FetchError::Decode(_)));
        assert_eq!(parse_depth_km("35 km").unwrap(), 35.0);
        assert_matches!(parse_depth_km("deep"), Err(FetchError::Decode(_)));
    }

    #[test]
    fn normalises_latest_bulletin() {
        let feed: LatestFeed = serde_json::from_value(latest_body()).unwrap();
        let quake = normalise(feed.info.gempa, "https://feed.test/TEWS/").unwrap();

        assert_eq!(quake.magnitude, 5.2);
        assert_eq!(quake.depth_km, 35.0);
        assert_eq!(quake.coordinates.latitude, -7.45);
        assert_eq!(quake.occurred_at.to_rfc3339(), "2024-01-15T06:00:12+00:00");
        assert_eq!(quake.potential.as_deref(), Some("Tidak berpotensi tsunami"));
        assert_eq!(
            quake.shakemap_url.as_deref(),
            Some("https://feed.test/TEWS/20240115130012.mmi.jpg")
        );
    }

    #[test]
    fn placeholder_felt_value_is_dropped() {
        let mut body = latest_body();
        body["Infogempa"]["gempa"]["Dirasakan"] = json!("-");
        body["Infogempa"]["gempa"]["Shakemap"] = json!("");
        let feed: LatestFeed = serde_json::from_value(body).unwrap();
        let quake = normalise(feed.info.gempa, DEFAULT_FEED_URL).unwrap();
        assert_eq!(quake.felt, None);
        assert_eq!(quake.shakemap_url, None);
    }

    #[test]
    fn bad_magnitude_is_a_decode_error() {
        let mut body = latest_body();
        body["Infogempa"]["gempa"]["Magnitude"] = json!("big");
        let feed: LatestFeed = serde_json::from_value(body).unwrap();
        assert_matches!(normalise(feed.info.gempa, DEFAULT_FEED_URL), Err(FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn fetches_both_feeds() {
        let router = Router::new()
            .route("/TEWS/autogempa.json", get(|| async { Json(latest_body()) }))
            .route(
                "/TEWS/gempadirasakan.json",
                get(|| async { Json(json!({"Infogempa": {"gempa": [{"Magnitude": "4.1"}]}})) }),
            );
        let base = spawn_server(router).await;
        let client = EarthquakeClient::new(test_client(), format!("{base}/TEWS"));

        let latest = client.latest().await.unwrap();
        assert_eq!(latest.magnitude, 5.2);

        let felt = client.felt().await.unwrap();
        assert_eq!(felt["Infogempa"]["gempa"][0]["Magnitude"], "4.1");
    }
}
