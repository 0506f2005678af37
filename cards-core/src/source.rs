use std::fmt::Debug;

use async_trait::async_trait;

use crate::{City, FetchError, WeatherSnapshot};

pub mod openmeteo;

pub use openmeteo::OpenMeteoSource;

/// Anything that can produce current weather for a city.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch(&self, city: &City) -> Result<WeatherSnapshot, FetchError>;
}
