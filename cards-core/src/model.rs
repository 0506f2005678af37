use std::collections::HashMap;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// A place to show weather for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,

    /// IANA zone name, informational only; the provider resolves the zone itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl City {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self { name: name.into(), latitude, longitude, timezone: None }
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }
}

/// Cities shown when nothing else is configured.
pub fn default_cities() -> Vec<City> {
    vec![
        City::new("Munich", 48.137, 11.575).with_timezone("Europe/Berlin"),
        City::new("Kyiv", 50.450, 30.523).with_timezone("Europe/Kyiv"),
        City::new("Paris", 48.856, 2.353).with_timezone("Europe/Paris"),
    ]
}

/// Current conditions for one city, as reported at `local_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_c: f64,
    pub weather_code: u16,
    pub wind_speed_kmh: f64,
    pub humidity_pct: f64,
    pub sunshine_secs: f64,
    /// Wall-clock time at the city, already shifted by the provider.
    pub local_time: NaiveDateTime,
    pub is_day: Option<bool>,
    pub rain_mm: Option<f64>,
    pub interval_secs: Option<u32>,
    pub units: HashMap<String, String>,
}

impl WeatherSnapshot {
    pub fn local_hour(&self) -> u32 {
        self.local_time.hour()
    }
}

/// Parse the provider's local timestamp (`2024-05-01T14:15`, seconds optional).
pub fn parse_local_time(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}
