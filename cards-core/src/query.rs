use url::form_urlencoded;

use crate::model::City;

/// Current-weather variables requested from the provider.
pub const CURRENT_FIELDS: &str =
    "temperature_2m,weather_code,wind_speed_10m,relative_humidity_2m,sunshine_duration";

/// Build the provider query string for `city`.
///
/// Coordinates are passed through unchecked; the provider rejects bad ones.
pub fn build_query(city: &City) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("latitude", &city.latitude.to_string())
        .append_pair("longitude", &city.longitude.to_string())
        .append_pair("current", CURRENT_FIELDS)
        .append_pair("timezone", "auto")
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_coordinates_fields_and_timezone() {
        let city = City::new("Munich", 48.137, 11.575);
        assert_eq!(
            build_query(&city),
            "latitude=48.137&longitude=11.575\
             &current=temperature_2m%2Cweather_code%2Cwind_speed_10m%2Crelative_humidity_2m%2Csunshine_duration\
             &timezone=auto"
        );
    }

    #[test]
    fn out_of_range_coordinates_pass_through() {
        let city = City::new("Nowhere", 123.0, f64::NAN);
        let query = build_query(&city);
        assert!(query.starts_with("latitude=123&longitude=NaN&"));
    }
}
