use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::{
    City, FetchError, WeatherSnapshot,
    config::{Config, ErrorDetail},
    model::parse_local_time,
    query::build_query,
};

use super::WeatherSource;

/// Card text for a rejected request when the status is not shown.
pub const RETRIEVAL_FAILED: &str = "Failed to load weather data";

/// Open-Meteo forecast client.
#[derive(Debug, Clone)]
pub struct OpenMeteoSource {
    base_url: String,
    error_detail: ErrorDetail,
    http: Client,
}

impl OpenMeteoSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            error_detail: ErrorDetail::default(),
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: config.base_url.clone(),
            error_detail: config.error_detail,
            http,
        })
    }

    pub fn with_error_detail(mut self, detail: ErrorDetail) -> Self {
        self.error_detail = detail;
        self
    }

    pub fn request_url(&self, city: &City) -> String {
        format!("{}?{}", self.base_url, build_query(city))
    }

    fn retrieval_error(&self, status: StatusCode, body: &str) -> FetchError {
        let message = match self.error_detail {
            ErrorDetail::Generic => RETRIEVAL_FAILED.to_string(),
            ErrorDetail::Detailed => format!(
                "Weather request failed with status {}: {}",
                status,
                truncate_body(body)
            ),
        };
        FetchError::Retrieval { status: status.as_u16(), message }
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature_2m: f64,
    weather_code: u16,
    wind_speed_10m: f64,
    relative_humidity_2m: f64,
    sunshine_duration: f64,
    time: String,
    #[serde(default)]
    rain: Option<f64>,
    #[serde(default)]
    is_day: Option<u8>,
    #[serde(default)]
    interval: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    current: OmCurrent,
    #[serde(default)]
    current_units: HashMap<String, String>,
}

/// Decode a forecast body, rejecting anything that lacks a required field.
pub fn decode_snapshot(body: &str) -> Result<WeatherSnapshot, FetchError> {
    let parsed: OmResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

    let current = parsed.current;
    let local_time = parse_local_time(&current.time).ok_or_else(|| {
        FetchError::MalformedResponse(format!("unrecognised timestamp '{}'", current.time))
    })?;

    Ok(WeatherSnapshot {
        temperature_c: current.temperature_2m,
        weather_code: current.weather_code,
        wind_speed_kmh: current.wind_speed_10m,
        humidity_pct: current.relative_humidity_2m,
        sunshine_secs: current.sunshine_duration,
        local_time,
        is_day: current.is_day.map(|flag| flag != 0),
        rain_mm: current.rain,
        interval_secs: current.interval,
        units: parsed.current_units,
    })
}

#[async_trait]
impl WeatherSource for OpenMeteoSource {
    async fn fetch(&self, city: &City) -> Result<WeatherSnapshot, FetchError> {
        let url = self.request_url(city);
        debug!(city = %city.name, %url, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        debug!(city = %city.name, %status, "weather response received");

        if !status.is_success() {
            return Err(self.retrieval_error(status, &body));
        }

        decode_snapshot(&body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
