//! Pass-through proxy to the configured water level API.

use crate::fetch::{FetchError, ResilientClient};

#[derive(Clone)]
pub struct WaterLevelClient {
    http: ResilientClient,
    base_url: Option<String>,
}

impl WaterLevelClient {
    /// `base_url` is `None` when no water level API is configured.
    pub fn new(http: ResilientClient, base_url: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.filter(|u| !u.is_empty()),
        }
    }

    /// Full upstream URL for a raw query string, used as the cache key.
    pub fn request_url(&self, query: Option<&str>) -> Result<String, FetchError> {
        let base = self
            .base_url
            .as_deref()
            .ok_or(FetchError::NotConfigured("WATER_LEVEL_API_URL"))?;
        Ok(match query.filter(|q| !q.is_empty()) {
            Some(q) if base.contains('?') => format!("{base}&{q}"),
            Some(q) => format!("{base}?{q}"),
            None => base.to_string(),
        })
    }

    /// Fetch readings, forwarding the incoming query string verbatim.
    pub async fn fetch(&self, query: Option<&str>) -> Result<serde_json::Value, FetchError> {
        let url = self.request_url(query)?;
        self.http.get_json(&url, &[]).await
    }
}
