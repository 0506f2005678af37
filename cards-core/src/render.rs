//! Turning snapshots and failures into card markup.

use chrono::NaiveDateTime;

use crate::{
    City, WeatherSnapshot,
    classify::classify,
    config::{ClockStyle, Config, DEFAULT_ICON_BASE_URL},
};

pub const WIND_ICON: &str = "/media/cloud-wind-icon.svg";
pub const HUMIDITY_ICON: &str = "/media/drop-icon.svg";
pub const SUNSHINE_ICON: &str = "/media/sun-icon.svg";

/// Label shown on every error card.
pub const LOAD_FAILED_LABEL: &str = "Failed to load data";

/// Day or night styling of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Day,
    Night,
}

impl Theme {
    /// Hours 06:00 up to but excluding 20:00 are day.
    pub fn from_hour(hour: u32) -> Self {
        if (6..20).contains(&hour) { Theme::Day } else { Theme::Night }
    }

    pub fn as_class(&self) -> &'static str {
        match self {
            Theme::Day => "day",
            Theme::Night => "night",
        }
    }
}

/// One card, ready to be placed into the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayNode {
    pub classes: Vec<String>,
    pub inner_html: String,
}

impl DisplayNode {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn is_error(&self) -> bool {
        self.has_class("error")
    }

    pub fn to_html(&self) -> String {
        format!(r#"<div class="{}">{}</div>"#, self.classes.join(" "), self.inner_html)
    }
}

/// Nearest integer, ties towards positive infinity (-2.5 becomes -2).
fn round_half_up(value: f64) -> i64 {
    // `as i64` so -0.2 shows as 0, not -0
    (value + 0.5).floor() as i64
}

pub fn format_temperature(celsius: f64) -> String {
    format!("{}°C", round_half_up(celsius))
}

pub fn format_wind(kmh: f64) -> String {
    format!("{} km/h", round_half_up(kmh))
}

pub fn format_humidity(pct: f64) -> String {
    format!("{pct}%")
}

pub fn format_sunshine(secs: f64) -> String {
    // round in tenths first; `{:.1}` alone sends 0.25 to 0.2
    let tenths = (secs / 360.0 + 0.5).floor();
    format!("{:.1}h", tenths / 10.0)
}

pub fn format_local_time(time: &NaiveDateTime, clock: ClockStyle) -> String {
    match clock {
        ClockStyle::H24 => time.format("%H:%M").to_string(),
        ClockStyle::H12 => time.format("%I:%M %p").to_string(),
    }
}

/// Escape text for use in element content and quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Renders success and error cards.
#[derive(Debug, Clone)]
pub struct CardRenderer {
    icon_base_url: String,
    clock: ClockStyle,
}

impl Default for CardRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_ICON_BASE_URL, ClockStyle::default())
    }
}

impl CardRenderer {
    pub fn new(icon_base_url: impl Into<String>, clock: ClockStyle) -> Self {
        Self { icon_base_url: icon_base_url.into(), clock }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.icon_base_url.clone(), config.clock)
    }

    pub fn icon_url(&self, icon_id: &str) -> String {
        format!("{}/{}@2x.png", self.icon_base_url.trim_end_matches('/'), icon_id)
    }

    pub fn render_card(&self, city: &City, snapshot: &WeatherSnapshot) -> DisplayNode {
        let entry = classify(snapshot.weather_code);
        let name = escape_html(&city.name);
        let desc = escape_html(entry.description);
        let icon_url = escape_html(&self.icon_url(entry.icon_id));
        let time = format_local_time(&snapshot.local_time, self.clock);

        let html = format!(
            r#"
<div class="weather-card__header">
  <h2>{name}</h2>
  <div class="time">{time}</div>
</div>
<div class="weather-card__body">
  <h1>{temp}</h1>
  <span class="weather-desc">{desc}</span>
</div>
<div class="footer-left">
  <div class="footer-item"><img src="{WIND_ICON}" alt="Wind"> {wind}</div>
  <div class="footer-item"><img src="{HUMIDITY_ICON}" alt="Humidity"> {humidity}</div>
  <div class="footer-item"><img src="{SUNSHINE_ICON}" alt="Sunshine"> {sunshine}</div>
</div>
<img src="{icon_url}" alt="{desc}" class="weather-icon" />
"#,
            temp = format_temperature(snapshot.temperature_c),
            wind = format_wind(snapshot.wind_speed_kmh),
            humidity = format_humidity(snapshot.humidity_pct),
            sunshine = format_sunshine(snapshot.sunshine_secs),
        );

        let theme = Theme::from_hour(snapshot.local_hour());
        DisplayNode {
            classes: vec!["weather-card".to_string(), theme.as_class().to_string()],
            inner_html: html,
        }
    }

    pub fn render_error(&self, city: &City, message: &str) -> DisplayNode {
        let inner_html = format!(
            r#"
<div class="weather-card__header">
  <h2>{}</h2>
</div>
<div class="weather-card__body">
  <p>{LOAD_FAILED_LABEL}</p>
  <small>{}</small>
</div>
"#,
            escape_html(&city.name),
            escape_html(message),
        );

        DisplayNode {
            classes: vec!["weather-card".to_string(), "error".to_string()],
            inner_html,
        }
    }
}
