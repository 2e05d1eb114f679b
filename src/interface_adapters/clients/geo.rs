use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::error;

use crate::domain::ports::GeoProvider;

// City returned when reverse geocoding fails or yields nothing useful.
pub const DEFAULT_CITY: &str = "Zagreb";

const REVERSE_GEOCODE_URL: &str = "https://api-bdc.net/data/reverse-geocode-client";
const NEARBY_CITIES_HOST: &str = "wft-geo-db.p.rapidapi.com";

const NEARBY_RADIUS_KM: u32 = 100;
const NEARBY_LIMIT: u32 = 10;
const NEARBY_MIN_POPULATION: u32 = 1000;

#[derive(Debug, Deserialize)]
struct ReverseGeocodeResponse {
    city: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NearbyCitiesResponse {
    data: Vec<NearbyCity>,
}

#[derive(Debug, Deserialize)]
struct NearbyCity {
    city: Option<String>,
}

// Bounded TTL cache for nearby-cities lookups. The GeoDB API is rate limited,
// so repeated lookups for the same coordinates are served from memory.
pub(crate) struct CityCache {
    entries: Mutex<HashMap<(i64, i64), CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
}

struct CacheEntry {
    cities: Vec<String>,
    stored_at: Instant,
}

// Coordinates are keyed at micro-degree precision.
fn cache_key(latitude: f64, longitude: f64) -> (i64, i64) {
    (
        (latitude * 1_000_000.0) as i64,
        (longitude * 1_000_000.0) as i64,
    )
}

impl CityCache {
    pub(crate) fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_entries,
        }
    }

    pub(crate) async fn get(&self, latitude: f64, longitude: f64) -> Option<Vec<String>> {
        let entries = self.entries.lock().await;
        let entry = entries.get(&cache_key(latitude, longitude))?;

        if entry.stored_at.elapsed() >= self.ttl {
            return None;
        }

        Some(entry.cities.clone())
    }

    pub(crate) async fn insert(&self, latitude: f64, longitude: f64, cities: Vec<String>) {
        let mut entries = self.entries.lock().await;

        if entries.len() >= self.max_entries {
            entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        }
        if entries.len() >= self.max_entries {
            // Still full after dropping stale entries; evict the oldest.
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(key, _)| *key)
            {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            cache_key(latitude, longitude),
            CacheEntry {
                cities,
                stored_at: Instant::now(),
            },
        );
    }
}

// Reqwest client for the two external geolocation providers: BigDataCloud for
// reverse geocoding and GeoDB (RapidAPI) for nearby cities.
pub struct GeoClient {
    http: reqwest::Client,
    rapidapi_key: String,
    cache: CityCache,
}

impl GeoClient {
    pub fn new(
        rapidapi_key: impl Into<String>,
        timeout: Duration,
        cache_ttl: Duration,
        cache_max_entries: usize,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            rapidapi_key: rapidapi_key.into(),
            cache: CityCache::new(cache_ttl, cache_max_entries),
        })
    }

    async fn fetch_nearby_cities(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<String>, reqwest::Error> {
        let url = format!(
            "https://{NEARBY_CITIES_HOST}/v1/geo/locations/{latitude}%2B{longitude}/nearbyCities\
             ?radius={NEARBY_RADIUS_KM}&limit={NEARBY_LIMIT}&minPopulation={NEARBY_MIN_POPULATION}"
        );

        let response = self
            .http
            .get(url)
            .header("x-rapidapi-key", &self.rapidapi_key)
            .header("x-rapidapi-host", NEARBY_CITIES_HOST)
            .send()
            .await?
            .error_for_status()?
            .json::<NearbyCitiesResponse>()
            .await?;

        Ok(response
            .data
            .into_iter()
            .filter_map(|entry| entry.city)
            .collect())
    }
}

#[async_trait]
impl GeoProvider for GeoClient {
    async fn current_city(&self, latitude: f64, longitude: f64) -> String {
        let request = self.http.get(REVERSE_GEOCODE_URL).query(&[
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("localityLanguage", "en".to_string()),
        ]);

        let city = match request.send().await {
            Ok(response) => response
                .json::<ReverseGeocodeResponse>()
                .await
                .ok()
                .and_then(|body| body.city),
            Err(err) => {
                error!(error = %err, "failed to fetch geolocation");
                None
            }
        };

        match city {
            Some(city) if !city.is_empty() => city,
            _ => DEFAULT_CITY.to_string(),
        }
    }

    async fn nearby_cities(&self, latitude: f64, longitude: f64) -> Vec<String> {
        if let Some(cities) = self.cache.get(latitude, longitude).await {
            return cities;
        }

        let cities = match self.fetch_nearby_cities(latitude, longitude).await {
            Ok(cities) => cities,
            Err(err) => {
                error!(error = %err, "failed to fetch nearby cities");
                Vec::new()
            }
        };

        self.cache.insert(latitude, longitude, cities.clone()).await;
        cities
    }
}
