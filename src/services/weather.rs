use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::WeatherSnapshot;

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status}")]
    Api { status: u16 },
}

#[async_trait]
pub trait WeatherFetcher: Send + Sync {
    async fn fetch_current(&self) -> Result<WeatherSnapshot, WeatherError>;
}

/// Client for the Open-Meteo current-weather endpoint.
pub struct OpenMeteoClient {
    client: reqwest::Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
}

impl OpenMeteoClient {
    pub fn new(base_url: String, latitude: f64, longitude: f64) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            latitude,
            longitude,
        }
    }
}

#[async_trait]
impl WeatherFetcher for OpenMeteoClient {
    async fn fetch_current(&self) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!(
            "{}/v1/forecast?latitude={}&longitude={}&current_weather=true",
            self.base_url, self.latitude, self.longitude
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(WeatherError::Api {
                status: response.status().as_u16(),
            });
        }
        let forecast: ForecastResponse = response.json().await?;
        let current = forecast.current_weather;
        Ok(WeatherSnapshot {
            temperature: current.temperature,
            wind_speed: current.windspeed,
            description: describe_weather_code(current.weathercode).to_string(),
            is_day: current.is_day != 0,
            observed_at: current.time,
        })
    }
}

struct CachedSnapshot {
    snapshot: WeatherSnapshot,
    fetched_at: DateTime<Utc>,
}

/// Caching layer over a [`WeatherFetcher`].
///
/// A snapshot is reused while younger than the TTL. When a refresh fails the
/// previous snapshot keeps being served, however old it is; a failed refresh
/// never evicts the cache.
pub struct WeatherService {
    fetcher: Arc<dyn WeatherFetcher>,
    cache: RwLock<Option<CachedSnapshot>>,
    ttl: Duration,
}

impl WeatherService {
    pub fn new(fetcher: Arc<dyn WeatherFetcher>, ttl: Duration) -> Self {
        Self {
            fetcher,
            cache: RwLock::new(None),
            ttl,
        }
    }

    /// Current conditions, from cache when fresh. `None` only when no fetch
    /// has ever succeeded.
    pub async fn snapshot(&self, now: DateTime<Utc>) -> Option<WeatherSnapshot> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if now - cached.fetched_at < self.ttl {
                    return Some(cached.snapshot.clone());
                }
            }
        }

        match self.fetcher.fetch_current().await {
            Ok(snapshot) => {
                let mut cache = self.cache.write().await;
                *cache = Some(CachedSnapshot {
                    snapshot: snapshot.clone(),
                    fetched_at: now,
                });
                Some(snapshot)
            }
            Err(e) => {
                tracing::warn!("Weather refresh failed: {}", e);
                let cache = self.cache.read().await;
                cache.as_ref().map(|cached| cached.snapshot.clone())
            }
        }
    }
}

/// Maps WMO weather interpretation codes to display text.
pub fn describe_weather_code(code: u16) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mostly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snowfall",
        73 => "Moderate snowfall",
        75 => "Heavy snowfall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

#[derive(Deserialize)]
struct ForecastResponse {
    current_weather: CurrentWeather,
}

#[derive(Deserialize)]
struct CurrentWeather {
    temperature: f64,
    windspeed: f64,
    weathercode: u16,
    is_day: u8,
    time: String,
}
