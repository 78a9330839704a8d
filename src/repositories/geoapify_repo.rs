use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use reqwest::{Client, StatusCode};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use crate::error::GeocodeError;
use crate::models::geocoding::{Coordinates, GeoapifyResponse, GeocodeResult, GeocodingParams};

pub const RETRY_BACKOFF: Duration = Duration::from_millis(200);

struct CachedLookup {
    stored_at: Instant,
    results: Vec<GeocodeResult>,
}

/// Address lookups against Geoapify, restricted to the configured service area.
pub struct GeoapifyRepo {
    client: Client,
    params: Arc<GeocodingParams>,
    cache: Mutex<HashMap<String, CachedLookup>>,
}

impl GeoapifyRepo {
    pub fn new(params: Arc<GeocodingParams>) -> Self {
        Self {
            client: Client::new(),
            params,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn geocode(
        &self,
        address: &str,
    ) -> Result<Vec<GeocodeResult>, GeocodeError> {
        self.lookup(address, None).await
    }

    /// Lookup biased towards `center`, limited to the default search radius around it.
    pub async fn geocode_near(
        &self,
        address: &str,
        center: Coordinates,
    ) -> Result<Vec<GeocodeResult>, GeocodeError> {
        self.lookup(address, Some(center)).await
    }

    /// Best match for `address`, or `NotFound` when nothing falls inside the service area.
    pub async fn resolve_address(
        &self,
        address: &str,
    ) -> Result<GeocodeResult, GeocodeError> {
        self.geocode(address)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NotFound(address.to_string()))
    }

    async fn lookup(
        &self,
        address: &str,
        center: Option<Coordinates>,
    ) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let key = cache_key(address, center);
        if let Some(results) = self.cached(&key).await {
            debug!("Geocoding cache hit for {:?}", key);
            return Ok(results);
        }

        let query = self.query(address, center);
        let bounding_box = self.params.bounding_box;
        let (inside, outside): (Vec<_>, Vec<_>) = self
            .fetch_with_retries(&query)
            .await?
            .into_iter()
            .partition(|result| bounding_box.contains(result.lat, result.lon));

        if !outside.is_empty() {
            info!("Dropped {} geocoding results outside the service area for {:?}", outside.len(), address);
        }

        self.cache.lock().await.insert(
            key,
            CachedLookup {
                stored_at: Instant::now(),
                results: inside.clone(),
            },
        );

        Ok(inside)
    }

    async fn cached(&self, key: &str) -> Option<Vec<GeocodeResult>> {
        let mut cache = self.cache.lock().await;
        let cache_duration = self.params.cache_duration;
        cache.retain(|_, entry| entry.stored_at.elapsed() < cache_duration);
        cache.get(key).map(|entry| entry.results.clone())
    }

    fn query(
        &self,
        address: &str,
        center: Option<Coordinates>,
    ) -> Vec<(&'static str, String)> {
        let mut filter = self.params.bounding_box.as_rect_filter();
        let mut query = vec![
            ("text", address.trim().to_string()),
            ("format", "json".to_string()),
        ];

        if let Some(center) = center {
            filter = format!(
                "circle:{},{},{}|{}",
                center.lon, center.lat, self.params.default_radius_m, filter
            );
            query.push(("bias", format!("proximity:{},{}", center.lon, center.lat)));
        }

        query.push(("filter", filter));
        query.push(("apiKey", self.params.api_key.clone()));
        query
    }

    async fn fetch_with_retries(
        &self,
        query: &[(&'static str, String)],
    ) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let attempts = self.params.max_retries + 1;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.fetch_once(query).await {
                Ok(results) => return Ok(results),
                Err(e) if is_retryable(&e) => {
                    warn!("Geocoding attempt {}/{} failed due to: {}", attempt, attempts, e);
                    last_error = e.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(RETRY_BACKOFF * attempt as u32).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(GeocodeError::RetriesExhausted {
            attempts,
            last: last_error,
        })
    }

    async fn fetch_once(
        &self,
        query: &[(&'static str, String)],
    ) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let url = format!("{}/search", self.params.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .query(query)
            .timeout(self.params.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status));
        }

        let body = response.text().await?;
        let parsed: GeoapifyResponse = serde_json::from_str(&body)?;
        Ok(parsed.results)
    }
}

fn is_retryable(error: &GeocodeError) -> bool {
    match error {
        GeocodeError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        GeocodeError::Status(status) => {
            status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
        }
        _ => false,
    }
}

fn cache_key(
    address: &str,
    center: Option<Coordinates>,
) -> String {
    let normalized = address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    match center {
        Some(center) => format!("{}@{},{}", normalized, center.lat, center.lon),
        None => normalized,
    }
}
