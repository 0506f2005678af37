//! WMO weather code lookup.

/// Description and icon for one weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherCodeEntry {
    pub description: &'static str,
    /// Icon id on the condition icon host, e.g. `"01d"`.
    pub icon_id: &'static str,
}

const fn entry(description: &'static str, icon_id: &'static str) -> WeatherCodeEntry {
    WeatherCodeEntry { description, icon_id }
}

pub const UNKNOWN: WeatherCodeEntry = entry("Unknown", "02d");

static TABLE: &[(u16, WeatherCodeEntry)] = &[
    (0, entry("Clear sky", "01d")),
    (1, entry("Mainly clear", "02d")),
    (2, entry("Partly cloudy", "03d")),
    (3, entry("Overcast", "04d")),
    (45, entry("Fog", "50d")),
    (48, entry("Depositing rime fog", "50d")),
    (51, entry("Light drizzle", "09d")),
    (61, entry("Slight rain", "10d")),
    (63, entry("Rain", "10d")),
    (71, entry("Snow fall", "13d")),
    (80, entry("Rain showers", "09d")),
    (95, entry("Thunderstorm", "11d")),
];

/// Look up a weather code. Codes outside the table map to [`UNKNOWN`].
pub fn classify(code: u16) -> WeatherCodeEntry {
    TABLE
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, entry)| *entry)
        .unwrap_or(UNKNOWN)
}

/// Every code with a dedicated entry.
pub fn known_codes() -> impl Iterator<Item = u16> {
    TABLE.iter().map(|(code, _)| *code)
}
