use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::config::Config;

/// Service area of the directory.
pub const ISRAEL_BOUNDING_BOX: BoundingBox = BoundingBox {
    north: 33.4,
    south: 29.4,
    east: 35.9,
    west: 34.2,
};

pub const CACHE_DURATION: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_RADIUS_METERS: u32 = 10_000;
pub const MAX_RETRIES: usize = 2;
pub const TIMEOUT: Duration = Duration::from_millis(10_000);

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    pub fn is_valid(&self) -> bool {
        self.south < self.north && self.west < self.east
    }

    /// Closed rectangle test, edges count as inside.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.south..=self.north).contains(&lat) && (self.west..=self.east).contains(&lon)
    }

    /// Geoapify `rect:` filter, ordered lon1,lat1,lon2,lat2.
    pub fn as_rect_filter(&self) -> String {
        format!("rect:{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}

/// Parameters shared by every geocoding lookup, fixed for the process lifetime.
#[derive(Clone, Debug)]
pub struct GeocodingParams {
    pub api_key: String,
    pub base_url: String,
    pub bounding_box: BoundingBox,
    pub cache_duration: Duration,
    pub default_radius_m: u32,
    pub max_retries: usize,
    pub timeout: Duration,
}

impl GeocodingParams {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            bounding_box: ISRAEL_BOUNDING_BOX,
            cache_duration: CACHE_DURATION,
            default_radius_m: DEFAULT_RADIUS_METERS,
            max_retries: MAX_RETRIES,
            timeout: TIMEOUT,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.geoapify_api_key, &config.geoapify_base_url)
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// One resolved address.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, alias = "formatted")]
    pub formatted_address: Option<String>,
    #[serde(default, alias = "place_id")]
    pub place_id: Option<String>,
    #[serde(default, alias = "result_type")]
    pub result_type: Option<String>,
}

/// Body of `GET /search?format=json`.
#[derive(Deserialize, Debug)]
pub struct GeoapifyResponse {
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}
